//! Immutable scenario configuration shared by every model operation.

pub mod config;
pub mod error;
pub mod rewards;

pub use config::{ObjectSpec, ScenarioBuilder, ScenarioConfig};
pub use error::ConfigError;
pub use rewards::RewardTable;
