//! Observation policies: what the self object sees of another object.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Location};

/// How the self object perceives other objects.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObservationPolicy {
    /// Every living object is seen at its true location.
    Omniscient,
    /// Objects within Euclidean `range` are seen with probability `p_detect`;
    /// everything else is reported as not observed.
    Range { range: f64, p_detect: f64 },
}

impl ObservationPolicy {
    /// Possible observed locations of an object at `obj_loc`, with their
    /// probabilities. The probabilities sum to 1.
    ///
    /// Dead objects are always reported dead.
    pub fn observable_locations(
        &self,
        self_loc: Location,
        obj_loc: Location,
        grid: &Grid,
    ) -> Vec<(Location, f64)> {
        if grid.is_dead(obj_loc) {
            return vec![(grid.dead(), 1.0)];
        }
        if !grid.is_cell(obj_loc) {
            return vec![(grid.non_observed(), 1.0)];
        }
        match *self {
            ObservationPolicy::Omniscient => vec![(obj_loc, 1.0)],
            ObservationPolicy::Range { range, p_detect } => {
                let visible =
                    grid.is_cell(self_loc) && grid.real_distance(self_loc, obj_loc) <= range;
                if !visible || p_detect <= 0.0 {
                    vec![(grid.non_observed(), 1.0)]
                } else if p_detect >= 1.0 {
                    vec![(obj_loc, 1.0)]
                } else {
                    vec![(obj_loc, p_detect), (grid.non_observed(), 1.0 - p_detect)]
                }
            }
        }
    }

    /// Probability that an object at `obj_loc` is reported at `observed`.
    pub fn probability(
        &self,
        self_loc: Location,
        obj_loc: Location,
        observed: Location,
        grid: &Grid,
    ) -> f64 {
        self.observable_locations(self_loc, obj_loc, grid)
            .into_iter()
            .find(|&(loc, _)| loc == observed)
            .map(|(_, p)| p)
            .unwrap_or(0.0)
    }
}

impl fmt::Display for ObservationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationPolicy::Omniscient => write!(f, "omniscient"),
            ObservationPolicy::Range { range, p_detect } => {
                write!(f, "range (range={}, p_detect={})", range, p_detect)
            }
        }
    }
}
