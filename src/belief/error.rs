use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Particle pool exhausted: all {capacity} slots are in use")]
    Exhausted { capacity: usize },
}
