//! The step function: attacks, action dispatch, movement and rewards.

use rand::Rng;

use super::action::Action;
use super::PursuitModel;
use crate::grid::Location;
use crate::objects::{select_cumulative, Attacking, Movable};
use crate::scenario::ScenarioConfig;
use crate::state::{DetailedState, ObsId, StateId};

/// Random numbers consumed by one [`PursuitModel::step_with`] call, each in
/// `[0, 1)`.
///
/// Separating the draws from the step makes a transition a pure function of
/// its inputs, which the solver uses to replay scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDraws {
    /// Drives the self object's move or shot.
    pub self_action: f64,
    /// Drives the whole observation sample.
    pub observation: f64,
    /// One per enemy and non-involved object, in slot order.
    pub moves: Vec<f64>,
    /// One per enemy.
    pub attacks: Vec<f64>,
}

impl StepDraws {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, config: &ScenarioConfig) -> Self {
        Self {
            self_action: rng.gen(),
            observation: rng.gen(),
            moves: (1..config.num_moving_objects()).map(|_| rng.gen()).collect(),
            attacks: (0..config.num_enemies()).map(|_| rng.gen()).collect(),
        }
    }

    /// Every draw set to `value`.
    pub fn constant(value: f64, config: &ScenarioConfig) -> Self {
        Self {
            self_action: value,
            observation: value,
            moves: vec![value; config.num_moving_objects() - 1],
            attacks: vec![value; config.num_enemies()],
        }
    }
}

/// Result of one simulated step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: StateId,
    pub observation: ObsId,
    pub reward: f64,
    pub terminal: bool,
}

impl PursuitModel {
    /// Simulates one step, drawing the randomness from `rng`.
    ///
    /// # Arguments
    ///
    /// * `state` - Packed true state
    /// * `action` - Decision of the self object
    /// * `last_obs` - Observation the decision was taken on; enemy actions
    ///   aim at the enemy's observed location
    /// * `rng` - Random number generator
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: StateId,
        action: Action,
        last_obs: ObsId,
        rng: &mut R,
    ) -> StepOutcome {
        let draws = StepDraws::sample(rng, self.config());
        self.step_with(state, action, last_obs, &draws)
    }

    /// Simulates one step with explicit random draws.
    ///
    /// # Panics
    ///
    /// Panics if `draws` holds fewer move or attack draws than the scenario
    /// has objects.
    pub fn step_with(
        &self,
        state: StateId,
        action: Action,
        last_obs: ObsId,
        draws: &StepDraws,
    ) -> StepOutcome {
        let config = self.config();
        let grid = config.grid();
        let rewards = config.rewards();
        let num_enemies = config.num_enemies();
        assert!(
            draws.moves.len() + 1 >= self.num_moving_objects()
                && draws.attacks.len() >= num_enemies,
            "step draws do not cover every object"
        );

        let mut s = self.decode_state(state);
        let mut reward = rewards.step;

        for e in 0..num_enemies {
            if self.enemy_attack(&mut s, e, draws.attacks[e]) {
                tracing::trace!(enemy = e, "self killed");
                return self.terminal(&s, rewards.loss);
            }
        }
        if s.self_location() == config.target() {
            return self.terminal(&s, rewards.win);
        }

        match action {
            Action::MoveToTarget => self.move_self_to(&mut s, config.target(), draws.self_action),
            Action::MoveToShelter => match config.nearest_shelter(s.self_location()) {
                Some(shelter) if shelter != s.self_location() => {
                    self.move_self_to(&mut s, shelter, draws.self_action)
                }
                Some(_) => {}
                None => reward += rewards.illegal_move,
            },
            Action::Attack(e) | Action::MoveFromEnemy(e) => {
                match self.aim_at(&s, e, last_obs) {
                    None => {
                        tracing::trace!(%action, "illegal enemy action");
                        reward += rewards.illegal_move;
                    }
                    Some(aim) if matches!(action, Action::Attack(_)) => {
                        reward += self.self_attack(&mut s, aim, draws.self_action);
                        if s.any_non_involved_dead(num_enemies, grid) {
                            return self.terminal(&s, rewards.kill_non_involved);
                        }
                        if grid.is_dead(s[e + 1]) {
                            reward += rewards.kill_enemy;
                        }
                    }
                    Some(aim) => self.move_self_from(&mut s, aim, draws.self_action),
                }
            }
        }

        self.move_objects(&mut s, &draws.moves);
        let observation = self.sample_observation(&s, draws.observation);
        StepOutcome {
            state: s.state_id(self.codec()),
            observation,
            reward,
            terminal: false,
        }
    }

    /// Observed location of enemy `e`, or `None` when an action on it is
    /// illegal: the enemy is dead, unseen, or reported on self's cell.
    fn aim_at(&self, s: &DetailedState, e: usize, last_obs: ObsId) -> Option<Location> {
        if e >= self.config().num_enemies() || self.grid().is_dead(s[e + 1]) {
            return None;
        }
        let observed_self = self.observed_location(last_obs, 0);
        let observed_enemy = self.observed_location(last_obs, e + 1);
        if !self.grid().is_cell(observed_enemy) || observed_enemy == observed_self {
            return None;
        }
        Some(observed_enemy)
    }

    /// Lets enemy `e` fire at self if it is alive and in range. Only self can
    /// be hurt by enemy fire. Returns whether self died.
    fn enemy_attack(&self, s: &mut DetailedState, e: usize, draw: f64) -> bool {
        let config = self.config();
        let grid = config.grid();
        let attacker = e + 1;
        let policy = config.enemies()[e].attack();
        if !policy.in_range(s[attacker], s.self_location(), grid) {
            return false;
        }
        let mut scratch = s.locations().to_vec();
        policy.resolve(
            &mut scratch,
            attacker,
            s.self_location(),
            config.shelters(),
            grid,
            draw,
        );
        if grid.is_dead(scratch[0]) {
            s[0] = grid.dead();
            true
        } else {
            false
        }
    }

    /// Fires at `aim` when in range, otherwise closes in. Returns the fire
    /// reward when a shot was taken.
    fn self_attack(&self, s: &mut DetailedState, aim: Location, draw: f64) -> f64 {
        let config = self.config();
        let policy = config.self_object().attack();
        if policy.in_range(s.self_location(), aim, config.grid()) {
            policy.resolve(s.locations_mut(), 0, aim, config.shelters(), config.grid(), draw);
            config.rewards().fire
        } else {
            self.move_self_to(s, aim, draw);
            0.0
        }
    }

    /// Moves self one step toward `goal`; cells of other living objects are
    /// blocked.
    fn move_self_to(&self, s: &mut DetailedState, goal: Location, draw: f64) {
        let grid = self.grid();
        let blocked: Vec<Location> = s.locations()[1..]
            .iter()
            .copied()
            .filter(|&l| grid.is_cell(l))
            .collect();
        let moves = self
            .config()
            .self_object()
            .movement()
            .possible_moves(s.self_location(), grid, &blocked, goal);
        if let Some((idx, _)) = select_cumulative(&moves, draw) {
            s[0] = moves[idx].0;
        }
    }

    /// Moves self toward the free neighbour farthest from `threat`. Stays put
    /// when no neighbour gains distance.
    fn move_self_from(&self, s: &mut DetailedState, threat: Location, draw: f64) {
        let grid = self.grid();
        let here = s.self_location();
        let mut farthest = here;
        let mut max_dist = grid.squared_distance(here, threat);
        for n in grid.neighbors(here) {
            if s.locations()[1..].contains(&n) {
                continue;
            }
            let d = grid.squared_distance(n, threat);
            if d > max_dist {
                max_dist = d;
                farthest = n;
            }
        }
        if farthest != here {
            self.move_self_to(s, farthest, draw);
        }
    }

    /// Moves enemies then non-involved objects, in slot order, each heading
    /// for self. Objects standing on a shelter block it.
    fn move_objects(&self, s: &mut DetailedState, draws: &[f64]) {
        let config = self.config();
        let grid = config.grid();
        for idx in 1..self.num_moving_objects() {
            let blocked: Vec<Location> = (0..self.num_moving_objects())
                .filter(|&other| other != idx && s.is_protected(other, config.shelters()))
                .map(|other| s[other])
                .collect();
            let policy = if idx <= config.num_enemies() {
                config.enemies()[idx - 1].movement()
            } else {
                config.non_involved()[idx - 1 - config.num_enemies()].movement()
            };
            let moves = policy.possible_moves(s[idx], grid, &blocked, s.self_location());
            if let Some((choice, _)) = select_cumulative(&moves, draws[idx - 1]) {
                s[idx] = moves[choice].0;
            }
        }
    }

    /// Terminal outcome: self's slot is reported, everything else unseen.
    fn terminal(&self, s: &DetailedState, reward: f64) -> StepOutcome {
        let observation = ObsId(self.codec().with_slot(
            self.non_observed_state().0,
            0,
            s.self_location(),
        ));
        StepOutcome {
            state: s.state_id(self.codec()),
            observation,
            reward,
            terminal: true,
        }
    }
}
