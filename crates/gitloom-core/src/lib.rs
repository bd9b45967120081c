pub mod config;
pub mod dates;
pub mod denylist;
pub mod plan;

pub use plan::*;
