//! pomgrid - POMDP model of a grid-world pursuit scenario
//!
//! A self agent crosses a square grid toward a target while enemies chase
//! and fire at it, bystanders wander, and shelters protect whoever stands on
//! them. The crate provides the domain side of an online tree-search
//! planner: packed state and observation ids, the stochastic transition and
//! observation model, a lookup-table heuristic, particle beliefs, and the
//! mapping of frames from an external simulator.

pub mod belief;
pub mod bridge;
pub mod grid;
pub mod heuristic;
pub mod model;
pub mod objects;
pub mod scenario;
pub mod state;

pub use grid::{Coordinate, Grid, Location};
pub use model::{Action, PursuitModel};
pub use scenario::{ScenarioBuilder, ScenarioConfig};
pub use state::{DetailedState, ObsId, StateId};

/// Identifier type used for scenario instances.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
