//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod image;
pub mod random;
pub mod storage;

pub use image::*;
pub use random::SeededRandom;
pub use storage::*;
