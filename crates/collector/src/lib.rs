pub mod config;
pub mod constituents;
pub mod engine;

pub use config::{CollectorConfig, RetryPolicy};
pub use constituents::{read_constituents, ConstituentsFormat};
pub use engine::Collector;
