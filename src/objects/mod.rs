//! Object models placed on the grid.
//!
//! Each kind of object carries only the capabilities it needs: the self
//! object moves, attacks and observes; enemies move and attack; non-involved
//! objects only move; shelters are static cells that protect whoever stands
//! on them.

pub mod attack;
pub mod movement;
pub mod observation;

pub use attack::AttackPolicy;
pub use movement::MovePolicy;
pub use observation::ObservationPolicy;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::Location;

/// Objects with a movement policy.
pub trait Movable {
    fn movement(&self) -> &MovePolicy;
}

/// Objects that can fire at a cell.
pub trait Attacking {
    fn attack(&self) -> &AttackPolicy;
}

/// Objects that perceive the others.
pub trait Observing {
    fn observation(&self) -> &ObservationPolicy;
}

/// The agent whose decisions are being planned.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelfObject {
    pub movement: MovePolicy,
    pub attack: AttackPolicy,
    pub observation: ObservationPolicy,
}

impl Default for SelfObject {
    fn default() -> Self {
        Self {
            movement: MovePolicy::Pursue { p_success: 0.9 },
            attack: AttackPolicy::Direct {
                range: 2.0,
                p_hit: 0.7,
            },
            observation: ObservationPolicy::Range {
                range: 3.0,
                p_detect: 0.9,
            },
        }
    }
}

/// A hostile object that chases and fires at the self object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnemyObject {
    pub movement: MovePolicy,
    pub attack: AttackPolicy,
}

impl Default for EnemyObject {
    fn default() -> Self {
        Self {
            movement: MovePolicy::Pursue { p_success: 0.5 },
            attack: AttackPolicy::Direct {
                range: 1.5,
                p_hit: 0.5,
            },
        }
    }
}

/// A bystander; killing one loses the game.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NonInvolvedObject {
    pub movement: MovePolicy,
}

impl Default for NonInvolvedObject {
    fn default() -> Self {
        Self {
            movement: MovePolicy::RandomWalk { p_stay: 0.5 },
        }
    }
}

/// A protected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shelter {
    pub location: Location,
}

impl Movable for SelfObject {
    fn movement(&self) -> &MovePolicy {
        &self.movement
    }
}

impl Attacking for SelfObject {
    fn attack(&self) -> &AttackPolicy {
        &self.attack
    }
}

impl Observing for SelfObject {
    fn observation(&self) -> &ObservationPolicy {
        &self.observation
    }
}

impl Movable for EnemyObject {
    fn movement(&self) -> &MovePolicy {
        &self.movement
    }
}

impl Attacking for EnemyObject {
    fn attack(&self) -> &AttackPolicy {
        &self.attack
    }
}

impl Movable for NonInvolvedObject {
    fn movement(&self) -> &MovePolicy {
        &self.movement
    }
}

/// Role of an object index in the scenario's object ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    SelfAgent,
    Enemy,
    NonInvolved,
    Shelter,
    Target,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::SelfAgent => write!(f, "self"),
            ObjectKind::Enemy => write!(f, "enemy"),
            ObjectKind::NonInvolved => write!(f, "non-involved"),
            ObjectKind::Shelter => write!(f, "shelter"),
            ObjectKind::Target => write!(f, "target"),
        }
    }
}

/// Cumulative-probability selection over `(location, probability)` pairs.
///
/// Subtracts each probability from `draw` in order and stops at the first
/// non-positive remainder; falls back to the last candidate when rounding
/// leaves mass over. Zero-probability candidates are never selected.
///
/// Returns the chosen index and the residual draw rescaled to `[0, 1]`
/// within the chosen candidate, so one draw can drive a chain of
/// independent selections. `None` when there are no candidates.
pub fn select_cumulative(candidates: &[(Location, f64)], draw: f64) -> Option<(usize, f64)> {
    let mut remaining = draw;
    let mut last = None;
    for (i, &(_, p)) in candidates.iter().enumerate() {
        if p <= 0.0 {
            continue;
        }
        last = Some(i);
        let before = remaining;
        remaining -= p;
        if remaining <= 0.0 {
            return Some((i, (before / p).clamp(0.0, 1.0)));
        }
    }
    last.map(|i| (i, 1.0))
}
