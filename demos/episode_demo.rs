// Demonstration: play episodes of the pursuit scenario with the
// preferred-action prior standing in for a tree search.
//
// Run from the repo root:
//   RUST_LOG=info cargo run --example episode_demo -- --episodes 5 --seed 7
//   cargo run --example episode_demo -- --lut table.txt --mode without-non-involved

use std::env;
use std::fs::File;
use std::io::BufReader;

use pomgrid::belief::{resample, ParticlePool};
use pomgrid::heuristic::{CalculationMode, Lut, LutError, PreferredActionPrior, RewardEstimator};
use pomgrid::model::{DecisionPeriod, History, PursuitModel};
use pomgrid::objects::{EnemyObject, NonInvolvedObject, SelfObject};
use pomgrid::ScenarioBuilder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MAX_STEPS: usize = 60;
const NUM_PARTICLES: usize = 100;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let config = match ScenarioBuilder::new(5, 24)
        .self_object(SelfObject::default(), vec![0, 1, 5])
        .enemy(EnemyObject::default(), vec![12, 13, 17])
        .non_involved(NonInvolvedObject::default(), vec![4, 20])
        .shelter(8)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid scenario: {}", e);
            std::process::exit(2);
        }
    };
    println!("{}", config.describe());
    let model = PursuitModel::new(config);

    let estimator = match arg_value(&args, "--lut") {
        Some(path) => load_estimator(&model, path, arg_value(&args, "--mode")),
        None => RewardEstimator::disabled(),
    };
    let prior = PreferredActionPrior::new(estimator);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut total = 0.0;
    let mut wins = 0;
    for episode in 0..episodes {
        let (reward, won) = play(&model, &prior, &mut rng);
        info!(episode, reward, won, "episode finished");
        total += reward;
        wins += usize::from(won);
    }
    println!(
        "episodes: {}  wins: {}  mean reward: {:.2}",
        episodes,
        wins,
        total / episodes.max(1) as f64
    );
}

/// Plays one episode; returns the total reward and whether the target was
/// reached.
fn play(model: &PursuitModel, prior: &PreferredActionPrior, rng: &mut StdRng) -> (f64, bool) {
    let pool = ParticlePool::with_capacity(4 * NUM_PARTICLES);
    let mut state = model.create_start_state(rng);
    let mut belief = match model.initial_belief(state, &pool) {
        Ok(belief) => belief,
        Err(e) => {
            warn!(error = %e, "initial belief does not fit the pool");
            Vec::new()
        }
    };
    let mut history = History::new();
    let mut period = DecisionPeriod::new(model.config().period_of_decision());
    let mut last_obs = model.non_observed_state();
    let mut total = 0.0;

    for _ in 0..MAX_STEPS {
        let (decided, expected) = prior.choose(model, &history, rng);
        let action = period.apply(decided);
        let outcome = model.step(state, action, last_obs, rng);
        total += outcome.reward;
        info!(%action, expected, reward = outcome.reward, "step");

        if outcome.terminal {
            let won = model.object_location(outcome.state, 0) == model.config().target();
            println!("{}", model.render_state(outcome.state));
            return (total, won);
        }

        history.push(action, outcome.observation);
        state = outcome.state;
        last_obs = outcome.observation;

        belief = match resample(model, &pool, NUM_PARTICLES, &belief, &history, rng) {
            Ok(resampled) => {
                if resampled.report.is_starved() {
                    warn!(shortfall = resampled.report.shortfall(), "belief starved");
                }
                resampled.particles
            }
            Err(e) => {
                warn!(error = %e, "belief resampling failed");
                Vec::new()
            }
        };
    }
    (total, false)
}

fn load_estimator(model: &PursuitModel, path: &str, mode: Option<&str>) -> RewardEstimator {
    let mode = match mode.unwrap_or("full") {
        "full" => CalculationMode::Full,
        "without-non-involved" => CalculationMode::WithoutNonInvolved,
        "enemy-only" => CalculationMode::EnemyOnly,
        "two-enemy-combination" => CalculationMode::TwoEnemyCombination,
        "disabled" => return RewardEstimator::disabled(),
        other => {
            eprintln!("Unknown --mode '{}'.", other);
            std::process::exit(2);
        }
    };
    let lut = File::open(path)
        .map_err(LutError::from)
        .and_then(|file| Lut::read_from(BufReader::new(file)));
    let lut = match lut {
        Ok(lut) => lut,
        Err(e) => {
            eprintln!("Cannot load {}: {}", path, e);
            std::process::exit(2);
        }
    };
    match RewardEstimator::new(mode, lut, model) {
        Ok(estimator) => estimator,
        Err(e) => {
            eprintln!("Lookup table does not fit the scenario: {}", e);
            std::process::exit(2);
        }
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
