//! Movement policies: the distribution over next cells for a moving object.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Location};

/// How an object moves between decision steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MovePolicy {
    /// Never moves.
    Stationary,
    /// Stays with probability `p_stay`, otherwise steps to a uniformly chosen
    /// free neighbour.
    RandomWalk { p_stay: f64 },
    /// Steps to the free neighbour closest to the goal with probability
    /// `p_success`; the remaining mass is split uniformly between staying and
    /// every other free neighbour.
    Pursue { p_success: f64 },
}

impl MovePolicy {
    /// Candidate next locations with their probabilities, sorted by location.
    ///
    /// # Arguments
    ///
    /// * `loc` - Current location of the object
    /// * `grid` - Grid the object lives on
    /// * `blocked` - Cells the object may not enter (staying is always allowed)
    /// * `goal` - Cell a pursuing object heads for; ignored by other policies
    ///
    /// Dead or unobserved objects stay where they are with probability 1.
    pub fn possible_moves(
        &self,
        loc: Location,
        grid: &Grid,
        blocked: &[Location],
        goal: Location,
    ) -> Vec<(Location, f64)> {
        if !grid.is_cell(loc) {
            return vec![(loc, 1.0)];
        }
        let free: Vec<Location> = grid
            .neighbors(loc)
            .filter(|n| !blocked.contains(n))
            .collect();

        let mut moves = match *self {
            MovePolicy::Stationary => return vec![(loc, 1.0)],
            MovePolicy::RandomWalk { p_stay } => {
                if free.is_empty() {
                    return vec![(loc, 1.0)];
                }
                let share = (1.0 - p_stay) / free.len() as f64;
                let mut moves = vec![(loc, p_stay)];
                moves.extend(free.iter().map(|&n| (n, share)));
                moves
            }
            MovePolicy::Pursue { p_success } => {
                if !grid.is_cell(goal) || goal == loc {
                    return vec![(loc, 1.0)];
                }
                let Some(best) = closest_to(grid, loc, &free, goal) else {
                    return vec![(loc, 1.0)];
                };
                let others: Vec<Location> = std::iter::once(loc)
                    .chain(free.iter().copied().filter(|&n| n != best))
                    .collect();
                let share = (1.0 - p_success) / others.len() as f64;
                let mut moves = vec![(best, p_success)];
                moves.extend(others.into_iter().map(|n| (n, share)));
                moves
            }
        };

        moves.retain(|&(_, p)| p > 0.0);
        moves.sort_by_key(|&(l, _)| l);
        moves
    }
}

/// The candidate strictly closer to `goal` than `loc`, first one wins on ties.
fn closest_to(
    grid: &Grid,
    loc: Location,
    candidates: &[Location],
    goal: Location,
) -> Option<Location> {
    let mut best = None;
    let mut best_dist = grid.squared_distance(loc, goal);
    for &c in candidates {
        let d = grid.squared_distance(c, goal);
        if d < best_dist {
            best_dist = d;
            best = Some(c);
        }
    }
    best
}

impl fmt::Display for MovePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovePolicy::Stationary => write!(f, "stationary"),
            MovePolicy::RandomWalk { p_stay } => write!(f, "random walk (p_stay={})", p_stay),
            MovePolicy::Pursue { p_success } => write!(f, "pursue (p_success={})", p_success),
        }
    }
}
