pub mod pool;
pub mod stream;
