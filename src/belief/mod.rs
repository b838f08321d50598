//! Belief management: the particle pool and history-driven resampling.

pub mod error;
pub mod pool;
pub mod resample;

pub use error::PoolError;
pub use pool::{Particle, ParticlePool, Pooled};
pub use resample::{resample, ObjectQuota, ResampleReport, Resampled};

use crate::grid::Location;

/// Visits every combination that picks one `(location, weight)` entry per
/// slot, passing the chosen locations and the product of their weights.
///
/// The last slot varies fastest. Nothing is visited when any slot has no
/// choices.
pub(crate) fn for_each_combination<E, F>(
    choices: &[Vec<(Location, f64)>],
    mut visit: F,
) -> Result<(), E>
where
    F: FnMut(&[Location], f64) -> Result<(), E>,
{
    if choices.iter().any(Vec::is_empty) {
        return Ok(());
    }
    let mut picks = vec![0usize; choices.len()];
    let mut locations = vec![0; choices.len()];
    loop {
        let mut weight = 1.0;
        for (slot, options) in choices.iter().enumerate() {
            let (loc, w) = options[picks[slot]];
            locations[slot] = loc;
            weight *= w;
        }
        visit(&locations, weight)?;

        let mut slot = choices.len();
        loop {
            if slot == 0 {
                return Ok(());
            }
            slot -= 1;
            picks[slot] += 1;
            if picks[slot] < choices[slot].len() {
                break;
            }
            picks[slot] = 0;
        }
    }
}
