//! Random Adapter - 可设种子的随机源

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::application::ports::RandomSourcePort;

/// 基于 StdRng 的随机源
///
/// 相同种子得到相同的下标序列
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// 使用系统熵初始化
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// 配置了种子时可复现，否则使用系统熵
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSourcePort for SeededRandom {
    fn next_index(&self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.random_range(0..bound),
            // 锁中毒时继续使用内部状态
            Err(poisoned) => poisoned.into_inner().random_range(0..bound),
        }
    }
}
