//! Expected rewards per action from a belief state and a lookup table.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::lut::Lut;
use crate::grid::Grid;
use crate::model::PursuitModel;
use crate::scenario::ConfigError;
use crate::state::DetailedState;

/// How a belief state is reduced before the table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CalculationMode {
    /// Look up the whole state.
    Full,
    /// Drop the non-involved objects.
    WithoutNonInvolved,
    /// Keep self and the nearest living enemy.
    EnemyOnly,
    /// Look up each of two enemies alone and combine the results.
    TwoEnemyCombination,
    /// No table: every action is valued at the loss reward.
    Disabled,
}

impl CalculationMode {
    pub fn name(&self) -> &'static str {
        match self {
            CalculationMode::Full => "full",
            CalculationMode::WithoutNonInvolved => "without-non-involved",
            CalculationMode::EnemyOnly => "enemy-only",
            CalculationMode::TwoEnemyCombination => "two-enemy-combination",
            CalculationMode::Disabled => "disabled",
        }
    }
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First action with the highest reward.
///
/// Ties go to the earliest index; NaN entries never win. `None` for an
/// empty slice.
pub fn find_max_reward(rewards: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (a, &r) in rewards.iter().enumerate() {
        match best {
            Some((_, max)) if r <= max || r.is_nan() => {}
            None if r.is_nan() => {}
            _ => best = Some((a, r)),
        }
    }
    best
}

/// Heuristic reward vectors for the search solver's preferred actions.
#[derive(Debug, Clone)]
pub struct RewardEstimator {
    mode: CalculationMode,
    lut: Option<Lut>,
}

impl RewardEstimator {
    /// Wires `lut` to `model` under `mode`.
    ///
    /// The table rows must hold one reward per action of the reduced state:
    /// the full action set for [`CalculationMode::Full`] and
    /// [`CalculationMode::WithoutNonInvolved`], the single-enemy action set
    /// otherwise.
    pub fn new(mode: CalculationMode, lut: Lut, model: &PursuitModel) -> Result<Self, ConfigError> {
        let enemies = model.config().num_enemies();
        let expected = match mode {
            CalculationMode::Disabled => return Ok(Self::disabled()),
            CalculationMode::Full | CalculationMode::WithoutNonInvolved => model.num_actions(),
            CalculationMode::EnemyOnly => {
                if enemies == 0 {
                    return Err(ConfigError::EnemyCountMismatch {
                        mode: mode.name(),
                        required: 1,
                        found: 0,
                    });
                }
                model.actions().with_enemies(1).len()
            }
            CalculationMode::TwoEnemyCombination => {
                if enemies != 2 {
                    return Err(ConfigError::EnemyCountMismatch {
                        mode: mode.name(),
                        required: 2,
                        found: enemies,
                    });
                }
                model.actions().with_enemies(1).len()
            }
        };
        let codec = model.codec();
        let lut_grid = lut.grid();
        if u64::from(lut_grid.max_location()) > codec.max_location() {
            return Err(ConfigError::LocationWidthOverflow {
                size: lut_grid.size(),
                max_location: lut_grid.max_location(),
                bits: codec.bits(),
            });
        }
        if lut.num_actions() != expected {
            return Err(ConfigError::LutWidthMismatch {
                mode: mode.name(),
                expected,
                found: lut.num_actions(),
            });
        }
        tracing::debug!(%mode, lut_grid = lut.grid().size(), "reward estimator ready");
        Ok(Self {
            mode,
            lut: Some(lut),
        })
    }

    pub fn disabled() -> Self {
        Self {
            mode: CalculationMode::Disabled,
            lut: None,
        }
    }

    pub fn mode(&self) -> CalculationMode {
        self.mode
    }

    /// Expected reward of every action of `model` in `belief`.
    pub fn estimate(&self, model: &PursuitModel, belief: &DetailedState) -> Vec<f64> {
        let Some(lut) = &self.lut else {
            return miss_rewards(model, belief);
        };
        let num_enemies = model.config().num_enemies();
        let rewards = match self.mode {
            CalculationMode::Disabled => None,
            CalculationMode::Full => lookup(lut, model, belief).map(<[f64]>::to_vec),
            CalculationMode::WithoutNonInvolved => {
                let mut reduced = belief.clone();
                reduced.erase_non_involved(num_enemies);
                lookup(lut, model, &reduced).map(<[f64]>::to_vec)
            }
            CalculationMode::EnemyOnly => nearest_living_enemy(model, belief).and_then(|e| {
                let single = lookup(lut, model, &single_enemy(belief, e))?;
                Some(spread_single_enemy(model, e, single))
            }),
            CalculationMode::TwoEnemyCombination => {
                let first = lookup(lut, model, &single_enemy(belief, 0));
                let second = lookup(lut, model, &single_enemy(belief, 1));
                match (first, second) {
                    (Some(r1), Some(r2)) => Some(Self::combine_two_enemies(model, belief, r1, r2)),
                    _ => None,
                }
            }
        };
        rewards.unwrap_or_else(|| {
            tracing::debug!(mode = %self.mode, "lookup table miss");
            miss_rewards(model, belief)
        })
    }

    /// Maps `state` from the model grid onto the table grid.
    ///
    /// When scaling lands self on the target although self is not really
    /// there, every living object is shifted one cell toward the origin
    /// (along y when self's x exceeds its y, along x otherwise) and objects
    /// pushed off the grid are dropped as dead.
    pub fn scale_state(model: &PursuitModel, state: &DetailedState, to: &Grid) -> DetailedState {
        let from = model.grid();
        let target = model.config().target();
        let mut scaled: DetailedState = state
            .locations()
            .iter()
            .map(|&loc| to.rescale_from(loc, from))
            .collect::<Vec<_>>()
            .into();

        if scaled[0] == to.rescale_from(target, from) && state[0] != target {
            let real_self = from.coordinate(state[0]);
            let (dx, dy) = if real_self.x > real_self.y { (0, -1) } else { (-1, 0) };
            for loc in scaled.locations_mut() {
                if !to.is_cell(*loc) {
                    continue;
                }
                let shifted = to.coordinate(*loc).offset(dx, dy);
                *loc = if shifted.is_on_grid(to.size()) {
                    shifted.index(to.size())
                } else {
                    to.dead()
                };
            }
        }
        scaled
    }

    /// Combines the single-enemy reward vectors of two enemies into one
    /// vector over the full action set.
    ///
    /// Actions aimed at a dead enemy get the minimal reward and actions
    /// aimed at a living one take that enemy's value. Basic actions average
    /// the living enemies' values, or both when neither lives.
    pub fn combine_two_enemies(
        model: &PursuitModel,
        belief: &DetailedState,
        rewards1: &[f64],
        rewards2: &[f64],
    ) -> Vec<f64> {
        let space = model.actions();
        let grid = model.grid();
        let min = model.config().rewards().min();
        let singles = [rewards1, rewards2];
        let alive = [!grid.is_dead(belief[1]), !grid.is_dead(belief[2])];
        let living = alive.iter().filter(|&&a| a).count();
        let value = |e: usize, id: usize| singles[e].get(id).copied().unwrap_or(min);

        space
            .iter()
            .enumerate()
            .map(|(id, action)| match action.enemy() {
                Some(e) if e < 2 && alive[e] => {
                    let sub = space.enemy_sub_action(action).unwrap_or(0);
                    value(e, space.num_basic() + sub)
                }
                Some(_) => min,
                None if living == 0 => (value(0, id) + value(1, id)) / 2.0,
                None => {
                    let sum: f64 = (0..2).filter(|&e| alive[e]).map(|e| value(e, id)).sum();
                    sum / living as f64
                }
            })
            .collect()
    }
}

fn lookup<'l>(lut: &'l Lut, model: &PursuitModel, reduced: &DetailedState) -> Option<&'l [f64]> {
    let scaled = RewardEstimator::scale_state(model, reduced, lut.grid());
    lut.get(scaled.state_id(model.codec()))
}

/// Loss for every action, or the illegal-move value for actions illegal in
/// `belief` when that is the worse of the two.
fn miss_rewards(model: &PursuitModel, belief: &DetailedState) -> Vec<f64> {
    let rewards = model.config().rewards();
    model
        .actions()
        .iter()
        .map(|action| {
            if rewards.illegal_move < rewards.loss && !model.legal_action(belief, action) {
                rewards.illegal_move
            } else {
                rewards.loss
            }
        })
        .collect()
}

fn single_enemy(belief: &DetailedState, e: usize) -> DetailedState {
    DetailedState::from_locations(vec![belief.self_location(), belief[e + 1]])
}

/// Living on-grid enemy closest to self, first one on ties.
fn nearest_living_enemy(model: &PursuitModel, belief: &DetailedState) -> Option<usize> {
    let grid = model.grid();
    (0..model.config().num_enemies())
        .filter(|&e| grid.is_cell(belief[e + 1]))
        .min_by_key(|&e| grid.squared_distance(belief.self_location(), belief[e + 1]))
}

/// Expands a single-enemy vector onto the full action set, aimed at enemy
/// `e`; actions on other enemies get the loss reward.
fn spread_single_enemy(model: &PursuitModel, e: usize, single: &[f64]) -> Vec<f64> {
    let space = model.actions();
    let loss = model.config().rewards().loss;
    space
        .iter()
        .enumerate()
        .map(|(id, action)| match action.enemy() {
            Some(target) if target == e => {
                let sub = space.enemy_sub_action(action).unwrap_or(0);
                single.get(space.num_basic() + sub).copied().unwrap_or(loss)
            }
            Some(_) => loss,
            None => single.get(id).copied().unwrap_or(loss),
        })
        .collect()
}
