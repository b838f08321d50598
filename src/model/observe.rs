//! Observation sampling and likelihoods.
//!
//! Objects are observed independently given self's true location, so the
//! likelihood of a joint observation is the product of per-object terms.

use super::PursuitModel;
use crate::objects::{select_cumulative, Observing};
use crate::state::{DetailedState, ObsId, StateId};

impl PursuitModel {
    /// Probability of observing `obs` in `state`.
    ///
    /// Zero unless self's observed location matches its true location;
    /// otherwise the product of [`PursuitModel::obs_prob_one_obj`] over every
    /// other object.
    pub fn obs_prob(&self, obs: ObsId, state: StateId) -> f64 {
        if self.observed_location(obs, 0) != self.object_location(state, 0) {
            return 0.0;
        }
        let mut prob = 1.0;
        for obj in 1..self.num_moving_objects() {
            prob *= self.obs_prob_one_obj(obs, state, obj);
            if prob == 0.0 {
                break;
            }
        }
        prob
    }

    /// Probability that object `obj` is reported as in `obs` given `state`.
    pub fn obs_prob_one_obj(&self, obs: ObsId, state: StateId, obj: usize) -> f64 {
        let self_loc = self.object_location(state, 0);
        let observed = self.observed_location(obs, obj);
        if obj == 0 {
            return if observed == self_loc { 1.0 } else { 0.0 };
        }
        self.config().self_object().observation().probability(
            self_loc,
            self.object_location(state, obj),
            observed,
            self.grid(),
        )
    }

    /// Samples an observation of `s` from a single draw.
    ///
    /// Each object consumes the residual left by the previous selection, which
    /// walks the joint distribution in the same order as enumerating every
    /// combination.
    pub(crate) fn sample_observation(&self, s: &DetailedState, draw: f64) -> ObsId {
        let grid = self.grid();
        let policy = self.config().self_object().observation();
        let mut observed = DetailedState::new(s.len());
        observed[0] = s.self_location();
        let mut remaining = draw;
        for obj in 1..s.len() {
            let candidates = policy.observable_locations(s.self_location(), s[obj], grid);
            observed[obj] = match select_cumulative(&candidates, remaining) {
                Some((idx, residual)) => {
                    remaining = residual;
                    candidates[idx].0
                }
                None => grid.non_observed(),
            };
        }
        observed.obs_id(self.codec())
    }
}
