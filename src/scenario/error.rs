use thiserror::Error;

use crate::grid::Location;

/// Configuration errors, raised while building a scenario or wiring a
/// lookup table to a model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Grid size must be at least 1")]
    EmptyGrid,

    #[error("Location width of {bits} bits is outside the supported range 1..=32")]
    InvalidLocationWidth { bits: u32 },

    #[error("Grid of size {size} needs location value {max_location}, which does not fit in {bits} bits")]
    LocationWidthOverflow {
        size: u32,
        max_location: Location,
        bits: u32,
    },

    #[error("{slots} objects of {bits} bits exceed the {capacity}-bit state width (max {max_slots} objects)")]
    StateWidthOverflow {
        slots: usize,
        bits: u32,
        capacity: u32,
        max_slots: usize,
    },

    #[error("Scenario has no self object")]
    MissingSelf,

    #[error("Target location {0} is outside the grid")]
    TargetOutOfGrid(Location),

    #[error("Shelter location {0} is outside the grid")]
    ShelterOutOfGrid(Location),

    #[error("Object {object} has no initial locations")]
    EmptyInitLocations { object: usize },

    #[error("Initial location {location} of object {object} is outside the grid")]
    InitLocationOutOfGrid { object: usize, location: Location },

    #[error("Decision period must be at least 1")]
    ZeroDecisionPeriod,

    #[error("Calculation mode {mode} works on {required} enemies, scenario has {found}")]
    EnemyCountMismatch {
        mode: &'static str,
        required: usize,
        found: usize,
    },

    #[error("Lookup table rows hold {found} rewards, calculation mode {mode} needs {expected}")]
    LutWidthMismatch {
        mode: &'static str,
        expected: usize,
        found: usize,
    },
}
