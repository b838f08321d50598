//! Belief resampling from the last observations of each object.
//!
//! Every object is resampled on its own. An object seen in the latest
//! observation is pinned there. An object last seen earlier is simulated
//! forward from that sighting; one never seen is drawn from the prior belief
//! and simulated through the whole history. Trajectories the observations
//! rule out are rejected. The per-object samples are finally combined into a
//! cross product of weighted particles.

use std::ops::Deref;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, warn};

use super::error::PoolError;
use super::for_each_combination;
use super::pool::{Particle, ParticlePool, Pooled};
use crate::grid::Location;
use crate::model::{History, PursuitModel};
use crate::state::StateId;

/// Attempts allowed per requested sample before giving up on an object.
pub const RETRY_FACTOR: usize = 200;

/// How resampling went for a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectQuota {
    pub object: usize,
    /// History index of the latest observation that reported the object.
    pub last_seen: Option<usize>,
    pub target: usize,
    pub gathered: usize,
    pub attempts: usize,
}

impl ObjectQuota {
    pub fn is_starved(&self) -> bool {
        self.gathered < self.target
    }
}

/// Per-object outcome of a [`resample`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResampleReport {
    pub objects: Vec<ObjectQuota>,
}

impl ResampleReport {
    pub fn is_starved(&self) -> bool {
        self.objects.iter().any(ObjectQuota::is_starved)
    }

    /// Total number of samples that could not be gathered.
    pub fn shortfall(&self) -> usize {
        self.objects
            .iter()
            .map(|q| q.target.saturating_sub(q.gathered))
            .sum()
    }
}

/// Particles produced by [`resample`], with the starvation report.
#[derive(Debug)]
pub struct Resampled<'p> {
    pub particles: Vec<Pooled<'p>>,
    pub report: ResampleReport,
}

/// Builds a new belief of roughly `num` particles consistent with `history`.
///
/// # Arguments
///
/// * `model` - Model used to simulate trajectories
/// * `pool` - Pool the new particles are checked out of
/// * `num` - Requested number of particles; each of the `n` non-self objects
///   aims for `num^(1/n)` samples
/// * `belief` - Prior belief, used for objects never observed
/// * `history` - Executed actions and received observations
/// * `rng` - Random number generator
///
/// # Returns
///
/// The weighted particles, whose weights sum to 1, and a report of objects
/// whose sample quota ran out of attempts. Starvation is not an error: the
/// particles gathered so far are used, and an object with no surviving
/// sample falls back to its last sighting (dead when never seen).
pub fn resample<'p, B, R>(
    model: &PursuitModel,
    pool: &'p ParticlePool,
    num: usize,
    belief: &[B],
    history: &History,
    rng: &mut R,
) -> Result<Resampled<'p>, PoolError>
where
    B: Deref<Target = Particle>,
    R: Rng + ?Sized,
{
    let Some(last) = history.last_observation() else {
        let particles = belief
            .iter()
            .map(|p| pool.copy(p))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Resampled {
            particles,
            report: ResampleReport::default(),
        });
    };

    let moving = model.num_moving_objects();
    let per_object = if moving > 1 {
        ((num as f64).powf(1.0 / (moving - 1) as f64) + 1e-9).floor() as usize
    } else {
        1
    }
    .max(1);

    let mut choices = vec![vec![(model.observed_location(last, 0), 1.0)]];
    let mut report = ResampleReport::default();
    for obj in 1..moving {
        let (locations, quota) = sample_object(model, obj, per_object, belief, history, rng);
        if quota.is_starved() {
            warn!(
                object = obj,
                target = quota.target,
                gathered = quota.gathered,
                attempts = quota.attempts,
                "resampling quota not met"
            );
        }
        choices.push(locations);
        report.objects.push(quota);
    }

    let mut particles = Vec::new();
    for_each_combination::<PoolError, _>(&choices, |locations, weight| {
        particles.push(pool.allocate(StateId(model.codec().encode(locations)), weight)?);
        Ok(())
    })?;
    debug!(
        requested = num,
        produced = particles.len(),
        shortfall = report.shortfall(),
        "belief resampled"
    );
    Ok(Resampled { particles, report })
}

/// Weighted candidate locations of object `obj`, normalized to sum to 1.
fn sample_object<B, R>(
    model: &PursuitModel,
    obj: usize,
    target: usize,
    belief: &[B],
    history: &History,
    rng: &mut R,
) -> (Vec<(Location, f64)>, ObjectQuota)
where
    B: Deref<Target = Particle>,
    R: Rng + ?Sized,
{
    let grid = model.grid();
    let last_index = history.len() - 1;
    let last_seen = (0..history.len())
        .rev()
        .find(|&i| !grid.is_non_observed(model.observed_location(history.observation(i), obj)));

    if let Some(t) = last_seen.filter(|&t| t == last_index) {
        let loc = model.observed_location(history.observation(t), obj);
        let quota = ObjectQuota {
            object: obj,
            last_seen,
            target: 1,
            gathered: 1,
            attempts: 0,
        };
        return (vec![(loc, 1.0)], quota);
    }

    let prior = WeightedIndex::<f64>::new(belief.iter().map(|p| p.weight)).ok();
    let max_attempts = RETRY_FACTOR * target;
    let mut samples: Vec<(Location, f64)> = Vec::new();
    let mut gathered = 0;
    let mut attempts = 0;
    while gathered < target && attempts < max_attempts {
        attempts += 1;
        let (start, first) = match (last_seen, &prior) {
            (Some(t), _) => (StateId(history.observation(t).0), t + 1),
            (None, Some(dist)) => (belief[dist.sample(rng)].state, 0),
            (None, None) => break,
        };
        let Some((loc, likelihood)) = simulate(model, obj, start, first, history, rng) else {
            continue;
        };
        gathered += 1;
        match samples.iter_mut().find(|(l, _)| *l == loc) {
            Some(entry) => entry.1 += likelihood,
            None => samples.push((loc, likelihood)),
        }
    }

    if samples.is_empty() {
        let fallback = last_seen
            .map(|t| model.observed_location(history.observation(t), obj))
            .unwrap_or(grid.dead());
        samples.push((fallback, 1.0));
    }
    let total: f64 = samples.iter().map(|(_, w)| w).sum();
    for entry in &mut samples {
        entry.1 /= total;
    }

    let quota = ObjectQuota {
        object: obj,
        last_seen,
        target,
        gathered,
        attempts,
    };
    (samples, quota)
}

/// Simulates history steps `first..` from `start`, tracking object `obj`.
///
/// After each step every other slot is re-anchored to what was actually
/// observed. Returns the final location of `obj` together with the product
/// of the per-step observation likelihoods, or `None` as soon as an
/// observation rules the tracked location out.
fn simulate<R: Rng + ?Sized>(
    model: &PursuitModel,
    obj: usize,
    start: StateId,
    first: usize,
    history: &History,
    rng: &mut R,
) -> Option<(Location, f64)> {
    let mut state = start;
    let mut prev_obs = if first == 0 {
        model.non_observed_state()
    } else {
        history.observation(first - 1)
    };
    let mut likelihood = 1.0;
    for i in first..history.len() {
        let outcome = model.step(state, history.action(i), prev_obs, rng);
        let observed = history.observation(i);
        let loc = model.object_location(outcome.state, obj);
        state = StateId(model.codec().with_slot(observed.0, obj, loc));
        let prob = model.obs_prob_one_obj(observed, state, obj);
        if prob <= 0.0 {
            return None;
        }
        likelihood *= prob;
        prev_obs = observed;
    }
    Some((model.object_location(state, obj), likelihood))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;
    use crate::objects::{
        AttackPolicy, EnemyObject, MovePolicy, NonInvolvedObject, ObservationPolicy, SelfObject,
    };
    use crate::scenario::ScenarioBuilder;
    use crate::state::ObsId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model(p_detect: f64) -> PursuitModel {
        let me = SelfObject {
            movement: MovePolicy::Pursue { p_success: 1.0 },
            attack: AttackPolicy::Direct {
                range: 1.0,
                p_hit: 1.0,
            },
            observation: ObservationPolicy::Range {
                range: 2.0,
                p_detect,
            },
        };
        let enemy = EnemyObject {
            movement: MovePolicy::Stationary,
            attack: AttackPolicy::Direct {
                range: 1.0,
                p_hit: 0.0,
            },
        };
        let bystander = NonInvolvedObject {
            movement: MovePolicy::Stationary,
        };
        let config = ScenarioBuilder::new(5, 24)
            .self_object(me, vec![0])
            .enemy(enemy, vec![7, 13])
            .non_involved(bystander, vec![20, 23])
            .build()
            .unwrap();
        PursuitModel::new(config)
    }

    fn obs(m: &PursuitModel, locs: &[Location]) -> ObsId {
        ObsId(m.codec().encode(locs))
    }

    #[test]
    fn everything_seen_last_gives_one_particle() {
        let m = model(1.0);
        let pool = ParticlePool::with_capacity(64);
        let prior = m.initial_belief(StateId(m.codec().encode(&[0, 7, 20])), &pool).unwrap();
        let mut history = History::new();
        history.push(Action::MoveToTarget, obs(&m, &[6, 7, 20]));

        let out = resample(&m, &pool, 50, &prior, &history, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(out.particles.len(), 1);
        assert!((out.particles[0].weight - 1.0).abs() < 1e-12);
        assert_eq!(m.decode_state(out.particles[0].state).locations(), &[6, 7, 20]);
        assert!(!out.report.is_starved());
    }

    #[test]
    fn stationary_object_seen_earlier_stays_put() {
        let m = model(1.0);
        let pool = ParticlePool::with_capacity(64);
        let prior = m.initial_belief(StateId(m.codec().encode(&[0, 7, 20])), &pool).unwrap();
        let unseen = m.grid().non_observed();
        let mut history = History::new();
        history.push(Action::MoveToTarget, obs(&m, &[6, 7, 20]));
        // self back at 0: the enemy at 7 is out of range
        history.push(Action::MoveToTarget, obs(&m, &[0, unseen, 20]));

        let out = resample(&m, &pool, 16, &prior, &history, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(out.particles.len(), 1);
        assert_eq!(m.object_location(out.particles[0].state, 1), 7);
        assert_eq!(m.object_location(out.particles[0].state, 0), 0);
        assert_eq!(out.report.objects[0].last_seen, Some(0));
        assert_eq!(out.report.objects[0].gathered, 4);
    }

    #[test]
    fn never_seen_object_drawn_from_prior() {
        let m = model(1.0);
        let pool = ParticlePool::with_capacity(64);
        let prior = m.initial_belief(StateId(m.codec().encode(&[0, 7, 20])), &pool).unwrap();
        let unseen = m.grid().non_observed();
        let mut history = History::new();
        history.push(Action::MoveToTarget, obs(&m, &[0, 7, unseen]));

        let mut rng = StdRng::seed_from_u64(3);
        let out = resample(&m, &pool, 100, &prior, &history, &mut rng).unwrap();
        let total: f64 = out.particles.iter().map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for p in &out.particles {
            assert!([20, 23].contains(&m.object_location(p.state, 2)));
        }
        assert_eq!(out.report.objects[1].last_seen, None);
        assert_eq!(out.report.objects[1].target, 10);
    }

    #[test]
    fn contradicting_history_starves_and_falls_back() {
        let m = model(1.0);
        let pool = ParticlePool::with_capacity(64);
        let prior = m.initial_belief(StateId(m.codec().encode(&[0, 7, 20])), &pool).unwrap();
        let unseen = m.grid().non_observed();
        let mut history = History::new();
        history.push(Action::MoveToTarget, obs(&m, &[6, 7, 20]));
        // the stationary enemy is in sure-detection range yet reported unseen
        history.push(Action::MoveToTarget, obs(&m, &[6, unseen, 20]));

        let out = resample(&m, &pool, 9, &prior, &history, &mut StdRng::seed_from_u64(4)).unwrap();
        let quota = out.report.objects[0];
        assert!(quota.is_starved());
        assert_eq!(quota.gathered, 0);
        assert_eq!(quota.attempts, RETRY_FACTOR * quota.target);
        assert_eq!(out.report.shortfall(), quota.target);
        assert_eq!(out.particles.len(), 1);
        assert_eq!(m.object_location(out.particles[0].state, 1), 7);
    }

    #[test]
    fn samples_weighted_by_observation_likelihood() {
        let me = SelfObject {
            movement: MovePolicy::Stationary,
            attack: AttackPolicy::Direct {
                range: 1.0,
                p_hit: 1.0,
            },
            observation: ObservationPolicy::Range {
                range: 1.5,
                p_detect: 0.5,
            },
        };
        let enemy = EnemyObject {
            movement: MovePolicy::Stationary,
            attack: AttackPolicy::Direct {
                range: 1.0,
                p_hit: 0.0,
            },
        };
        let config = ScenarioBuilder::new(5, 24)
            .self_object(me, vec![6])
            .enemy(enemy, vec![7, 23])
            .build()
            .unwrap();
        let m = PursuitModel::new(config);
        let pool = ParticlePool::with_capacity(64);
        let prior = m.initial_belief(StateId(m.codec().encode(&[6, 7])), &pool).unwrap();
        let mut history = History::new();
        history.push(Action::MoveToTarget, obs(&m, &[6, m.grid().non_observed()]));

        let mut rng = StdRng::seed_from_u64(6);
        let out = resample(&m, &pool, 4000, &prior, &history, &mut rng).unwrap();
        let weight_at = |loc: Location| -> f64 {
            out.particles
                .iter()
                .filter(|p| m.object_location(p.state, 1) == loc)
                .map(|p| p.weight)
                .sum()
        };
        // next to self the enemy goes unseen half the time, far away always
        assert!((weight_at(7) - 1.0 / 3.0).abs() < 0.03);
        assert!((weight_at(23) - 2.0 / 3.0).abs() < 0.03);
    }

    #[test]
    fn empty_history_copies_prior() {
        let m = model(1.0);
        let pool = ParticlePool::with_capacity(64);
        let prior = m.initial_belief(StateId(m.codec().encode(&[0, 7, 20])), &pool).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let out = resample(&m, &pool, 10, &prior, &History::new(), &mut rng).unwrap();
        assert_eq!(out.particles.len(), prior.len());
        assert_eq!(pool.num_allocated(), 2 * prior.len());
    }
}
