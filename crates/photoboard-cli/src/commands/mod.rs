pub mod board;
pub mod export;
pub mod sync_demo;
