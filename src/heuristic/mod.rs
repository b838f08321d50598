//! Lookup-table heuristic: reduces a belief state, rescales it to the
//! table's grid and reads back an expected reward per action.

pub mod error;
pub mod estimator;
pub mod lut;
pub mod prior;

#[cfg(test)]
mod tests;

pub use error::LutError;
pub use estimator::{find_max_reward, CalculationMode, RewardEstimator};
pub use lut::Lut;
pub use prior::PreferredActionPrior;
