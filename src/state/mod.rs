//! Packed state and observation representation.

pub mod codec;
pub mod detailed;

pub use codec::{LocationCodec, ObsId, StateId, DEFAULT_LOCATION_BITS, STATE_WIDTH_BITS};
pub use detailed::DetailedState;
