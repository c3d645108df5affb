pub mod base;
pub mod config;
pub mod error;
pub mod market_data;
pub mod report;
pub mod tracker;

pub use error::{Result, TrackerError};
