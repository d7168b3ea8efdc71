//! Random Source Port - 可注入的随机源
//!
//! 画面比例选择依赖随机数，测试时注入固定种子

/// 随机源
pub trait RandomSourcePort: Send + Sync {
    /// 返回 `[0, bound)` 内的下标；`bound` 为 0 时返回 0
    fn next_index(&self, bound: usize) -> usize;
}
