//! POMDP model of the pursuit scenario.
//!
//! [`PursuitModel`] is the surface the tree-search solver drives: it
//! generates actions, simulates transitions, scores observations and seeds
//! the initial belief. The model is read-only after construction, so one
//! instance can be shared by any number of search threads.

pub mod action;
pub mod history;
pub mod observe;
pub mod period;
pub mod transition;


pub use action::{Action, ActionSpace};
pub use history::History;
pub use period::DecisionPeriod;
pub use transition::{StepDraws, StepOutcome};

use rand::Rng;

use crate::belief::{for_each_combination, ParticlePool, PoolError, Pooled};
use crate::grid::{Grid, Location};
use crate::scenario::ScenarioConfig;
use crate::state::{DetailedState, LocationCodec, ObsId, StateId};

/// The transition, observation and reward model of one scenario.
#[derive(Debug, Clone)]
pub struct PursuitModel {
    config: ScenarioConfig,
    actions: ActionSpace,
    non_observed: ObsId,
}

impl PursuitModel {
    pub fn new(config: ScenarioConfig) -> Self {
        let actions = ActionSpace::for_scenario(&config);
        let slots = vec![config.grid().non_observed(); config.num_moving_objects()];
        let non_observed = ObsId(config.codec().encode(&slots));
        tracing::debug!(
            scenario = %config.id(),
            actions = actions.len(),
            "pursuit model ready"
        );
        Self {
            config,
            actions,
            non_observed,
        }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        self.config.grid()
    }

    pub fn codec(&self) -> &LocationCodec {
        self.config.codec()
    }

    pub fn actions(&self) -> &ActionSpace {
        &self.actions
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    pub fn num_moving_objects(&self) -> usize {
        self.config.num_moving_objects()
    }

    /// Observation in which no object is observed.
    pub fn non_observed_state(&self) -> ObsId {
        self.non_observed
    }

    pub fn decode_state(&self, id: StateId) -> DetailedState {
        DetailedState::from_state(id, &self.config)
    }

    pub fn decode_obs(&self, id: ObsId) -> DetailedState {
        DetailedState::from_obs(id, &self.config)
    }

    /// Single slot of a packed state.
    pub fn object_location(&self, state: StateId, obj: usize) -> Location {
        self.codec().slot(state.0, obj)
    }

    /// Single slot of a packed observation.
    pub fn observed_location(&self, obs: ObsId, obj: usize) -> Location {
        self.codec().slot(obs.0, obj)
    }

    /// Whether `action` makes sense given an observed (or believed) state.
    ///
    /// Enemy actions need the enemy to be alive, seen on the grid, and not on
    /// self's own cell.
    pub fn legal_action(&self, observed: &DetailedState, action: Action) -> bool {
        match action {
            Action::MoveToTarget => true,
            Action::MoveToShelter => !self.config.shelters().is_empty(),
            Action::Attack(e) | Action::MoveFromEnemy(e) => {
                if self.actions.encode(action).is_none() {
                    return false;
                }
                let loc = observed[e + 1];
                self.grid().is_cell(loc) && loc != observed.self_location()
            }
        }
    }

    /// Legal actions in id order. Never empty: moving to the target is
    /// always legal.
    pub fn legal_actions(&self, observed: &DetailedState) -> Vec<Action> {
        self.actions
            .iter()
            .filter(|&a| self.legal_action(observed, a))
            .collect()
    }

    /// Draws a start state from the per-object initial locations.
    pub fn create_start_state<R: Rng + ?Sized>(&self, rng: &mut R) -> StateId {
        let locations: Vec<Location> = (0..self.num_moving_objects())
            .map(|obj| {
                let candidates = self.config.init_locations(obj);
                candidates[rng.gen_range(0..candidates.len())]
            })
            .collect();
        StateId(self.codec().encode(&locations))
    }

    /// Uniform belief over every combination of initial locations, with
    /// self fixed at its location in `start`.
    pub fn initial_belief<'p>(
        &self,
        start: StateId,
        pool: &'p ParticlePool,
    ) -> Result<Vec<Pooled<'p>>, PoolError> {
        let mut choices = vec![vec![(self.object_location(start, 0), 1.0)]];
        for obj in 1..self.num_moving_objects() {
            choices.push(
                self.config
                    .init_locations(obj)
                    .iter()
                    .map(|&loc| (loc, 1.0))
                    .collect(),
            );
        }
        let num_states: usize = choices.iter().map(Vec::len).product();
        let weight = 1.0 / num_states as f64;

        let mut particles = Vec::with_capacity(num_states);
        for_each_combination::<PoolError, _>(&choices, |locations, _| {
            particles.push(pool.allocate(StateId(self.codec().encode(locations)), weight)?);
            Ok(())
        })?;
        Ok(particles)
    }

    /// Point estimate of the state from a history: self at its last observed
    /// location, every other object at the last location it was seen at, or
    /// dead when it was never seen.
    pub fn belief_from_history(&self, history: &History) -> Option<DetailedState> {
        let last = history.last_observation()?;
        let grid = self.grid();
        let mut belief = DetailedState::new(self.num_moving_objects());
        belief[0] = self.observed_location(last, 0);
        for obj in 1..self.num_moving_objects() {
            let seen = (0..history.len())
                .rev()
                .map(|i| self.observed_location(history.observation(i), obj))
                .find(|&loc| !grid.is_non_observed(loc));
            belief[obj] = seen.unwrap_or(grid.dead());
        }
        Some(belief)
    }

    /// Reward and terminal flag of a state reported by an external simulator.
    pub fn external_reward(&self, state: StateId) -> (f64, bool) {
        let s = self.decode_state(state);
        let rewards = self.config.rewards();
        let grid = self.grid();
        if s.self_location() == self.config.target() {
            (rewards.win, true)
        } else if grid.is_dead(s.self_location())
            || s.any_non_involved_dead(self.config.num_enemies(), grid)
        {
            (rewards.loss, true)
        } else {
            (rewards.step, false)
        }
    }

    /// A uniformly random action valued at the worst reward.
    pub fn min_reward_action<R: Rng + ?Sized>(&self, rng: &mut R) -> (Action, f64) {
        let id = rng.gen_range(0..self.num_actions());
        let action = self.actions.decode(id).unwrap_or(Action::MoveToTarget);
        (action, self.config.rewards().min())
    }

    pub fn render_state(&self, state: StateId) -> String {
        self.decode_state(state).render(&self.config)
    }

    pub fn render_obs(&self, obs: ObsId) -> String {
        self.decode_obs(obs).render(&self.config)
    }
}
