//! Preferred-action prior used to bias tree search.

use rand::seq::SliceRandom;
use rand::Rng;

use super::estimator::{find_max_reward, CalculationMode, RewardEstimator};
use crate::model::{Action, History, PursuitModel};

/// Picks the action the search should try first, with its expected reward.
#[derive(Debug, Clone)]
pub struct PreferredActionPrior {
    estimator: RewardEstimator,
}

impl PreferredActionPrior {
    pub fn new(estimator: RewardEstimator) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &RewardEstimator {
        &self.estimator
    }

    /// Best action of the table for the belief derived from `history`.
    ///
    /// Without a table, or before anything was observed, a uniformly random
    /// action legal under the last observation is returned, valued at the
    /// loss reward.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        model: &PursuitModel,
        history: &History,
        rng: &mut R,
    ) -> (Action, f64) {
        if self.estimator.mode() != CalculationMode::Disabled {
            if let Some(belief) = model.belief_from_history(history) {
                let rewards = self.estimator.estimate(model, &belief);
                let best = find_max_reward(&rewards)
                    .and_then(|(id, reward)| Some((model.actions().decode(id)?, reward)));
                if let Some(best) = best {
                    return best;
                }
            }
        }
        random_legal(model, history, rng)
    }
}

fn random_legal<R: Rng + ?Sized>(
    model: &PursuitModel,
    history: &History,
    rng: &mut R,
) -> (Action, f64) {
    let last = history
        .last_observation()
        .unwrap_or_else(|| model.non_observed_state());
    let legal = model.legal_actions(&model.decode_obs(last));
    let action = legal.choose(rng).copied().unwrap_or(Action::MoveToTarget);
    (action, model.config().rewards().loss)
}
