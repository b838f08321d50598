//! Reward constants of the pursuit game.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rewards paid out by the transition model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardTable {
    /// Self reached the target.
    pub win: f64,
    /// Self was killed.
    pub loss: f64,
    /// Added when an attack kills the aimed enemy.
    pub kill_enemy: f64,
    /// Replaces the step reward when self kills a non-involved object.
    pub kill_non_involved: f64,
    /// Added for an enemy action against a dead or unseen enemy.
    pub illegal_move: f64,
    /// Base reward of every non-terminal step.
    pub step: f64,
    /// Added whenever self fires.
    pub fire: f64,
}

impl RewardTable {
    /// The worst reward an action can be credited with.
    pub fn min(&self) -> f64 {
        self.loss.min(self.illegal_move)
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        let loss = -100.0;
        Self {
            win: 50.0,
            loss,
            kill_enemy: 0.0,
            kill_non_involved: loss,
            illegal_move: 0.0,
            step: 0.0,
            fire: 0.0,
        }
    }
}
