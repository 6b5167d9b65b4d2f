pub mod greedy;
pub mod pool;
pub mod ranking;

pub use greedy::*;
pub use pool::*;
pub use ranking::*;
