//! Attack policies: range checks and probabilistic strike resolution.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::select_cumulative;
use crate::grid::{Grid, Location};

/// How an object fires at a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttackPolicy {
    /// Hits the aimed cell with probability `p_hit`; a miss hits nothing.
    Direct { range: f64, p_hit: f64 },
    /// Hits the aimed cell with probability `p_hit`; a miss lands on a
    /// uniformly chosen on-grid neighbour of the aimed cell.
    Scatter { range: f64, p_hit: f64 },
}

impl AttackPolicy {
    pub fn range(&self) -> f64 {
        match *self {
            AttackPolicy::Direct { range, .. } | AttackPolicy::Scatter { range, .. } => range,
        }
    }

    pub fn p_hit(&self) -> f64 {
        match *self {
            AttackPolicy::Direct { p_hit, .. } | AttackPolicy::Scatter { p_hit, .. } => p_hit,
        }
    }

    /// True when both cells are on the grid and within Euclidean range.
    pub fn in_range(&self, attacker: Location, target: Location, grid: &Grid) -> bool {
        grid.is_cell(attacker)
            && grid.is_cell(target)
            && grid.real_distance(attacker, target) <= self.range()
    }

    /// Cells a shot aimed at `target` can land on. `grid.dead()` stands for a
    /// shot that lands nowhere.
    pub fn strike_distribution(&self, target: Location, grid: &Grid) -> Vec<(Location, f64)> {
        let p_hit = self.p_hit().clamp(0.0, 1.0);
        let mut strikes = vec![(target, p_hit)];
        match self {
            AttackPolicy::Direct { .. } => strikes.push((grid.dead(), 1.0 - p_hit)),
            AttackPolicy::Scatter { .. } => {
                let spill: Vec<Location> = grid.neighbors(target).collect();
                if spill.is_empty() {
                    strikes.push((grid.dead(), 1.0 - p_hit));
                } else {
                    let share = (1.0 - p_hit) / spill.len() as f64;
                    strikes.extend(spill.into_iter().map(|c| (c, share)));
                }
            }
        }
        strikes.retain(|&(_, p)| p > 0.0);
        strikes
    }

    /// Fires at `target`, consuming one random draw.
    ///
    /// Every living object other than `attacker` on the struck cell is set to
    /// the dead sentinel, unless the struck cell is a shelter. Returns the
    /// struck cell, if the shot landed on the grid.
    pub fn resolve(
        &self,
        locations: &mut [Location],
        attacker: usize,
        target: Location,
        shelters: &[Location],
        grid: &Grid,
        draw: f64,
    ) -> Option<Location> {
        let strikes = self.strike_distribution(target, grid);
        let (idx, _) = select_cumulative(&strikes, draw)?;
        let struck = strikes[idx].0;
        if !grid.is_cell(struck) {
            return None;
        }
        if !shelters.contains(&struck) {
            for (i, loc) in locations.iter_mut().enumerate() {
                if i != attacker && *loc == struck {
                    *loc = grid.dead();
                }
            }
        }
        Some(struck)
    }
}

impl fmt::Display for AttackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackPolicy::Direct { range, p_hit } => {
                write!(f, "direct (range={}, p_hit={})", range, p_hit)
            }
            AttackPolicy::Scatter { range, p_hit } => {
                write!(f, "scatter (range={}, p_hit={})", range, p_hit)
            }
        }
    }
}
