pub mod scholarship;

pub use scholarship::*;
