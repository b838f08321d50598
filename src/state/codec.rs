//! Fixed-width bit packing of object locations into a single integer.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::Location;
use crate::scenario::ConfigError;

/// Width of the packed state and observation integers.
pub const STATE_WIDTH_BITS: u32 = u64::BITS;

/// Default number of bits per location slot (grids up to 15x15).
pub const DEFAULT_LOCATION_BITS: u32 = 8;

/// Packed full state: one location slot per moving object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateId(pub u64);

/// Packed observation, using the same layout as [`StateId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObsId(pub u64);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for ObsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

impl From<StateId> for ObsId {
    fn from(id: StateId) -> Self {
        ObsId(id.0)
    }
}

impl From<ObsId> for StateId {
    fn from(id: ObsId) -> Self {
        StateId(id.0)
    }
}

/// Packs `bits`-wide location slots into a `u64`, slot 0 in the lowest bits.
///
/// A codec holds at most [`LocationCodec::max_slots`] slots; configurations
/// with more objects are rejected by [`LocationCodec::check_capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationCodec {
    bits: u32,
    mask: u64,
}

impl LocationCodec {
    pub fn new(bits: u32) -> Result<Self, ConfigError> {
        if bits == 0 || bits > 32 {
            return Err(ConfigError::InvalidLocationWidth { bits });
        }
        Ok(Self {
            bits,
            mask: (1u64 << bits) - 1,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Largest location value a slot can hold.
    pub fn max_location(&self) -> u64 {
        self.mask
    }

    /// Number of slots that fit in [`STATE_WIDTH_BITS`].
    pub fn max_slots(&self) -> usize {
        (STATE_WIDTH_BITS / self.bits) as usize
    }

    pub fn check_capacity(&self, slots: usize) -> Result<(), ConfigError> {
        if slots > self.max_slots() {
            return Err(ConfigError::StateWidthOverflow {
                slots,
                bits: self.bits,
                capacity: STATE_WIDTH_BITS,
                max_slots: self.max_slots(),
            });
        }
        Ok(())
    }

    /// Packs locations, last slot shifted in first.
    pub fn encode(&self, locations: &[Location]) -> u64 {
        debug_assert!(locations.len() <= self.max_slots());
        let mut id = 0u64;
        for &loc in locations.iter().rev() {
            debug_assert!(u64::from(loc) <= self.mask);
            id <<= self.bits;
            id |= u64::from(loc) & self.mask;
        }
        id
    }

    /// Unpacks `slots` locations.
    pub fn decode(&self, mut id: u64, slots: usize) -> Vec<Location> {
        let mut locations = Vec::with_capacity(slots);
        for _ in 0..slots {
            locations.push((id & self.mask) as Location);
            id >>= self.bits;
        }
        locations
    }

    /// Extracts a single slot without decoding the rest.
    pub fn slot(&self, id: u64, idx: usize) -> Location {
        debug_assert!(idx < self.max_slots());
        ((id >> (idx as u32 * self.bits)) & self.mask) as Location
    }

    /// Returns `id` with slot `idx` replaced by `loc`.
    pub fn with_slot(&self, id: u64, idx: usize, loc: Location) -> u64 {
        let shift = idx as u32 * self.bits;
        (id & !(self.mask << shift)) | ((u64::from(loc) & self.mask) << shift)
    }
}

impl Default for LocationCodec {
    fn default() -> Self {
        Self {
            bits: DEFAULT_LOCATION_BITS,
            mask: (1u64 << DEFAULT_LOCATION_BITS) - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_inverse() {
        let codec = LocationCodec::default();
        let locs = vec![3, 17, 0, 101, 255];
        let id = codec.encode(&locs);
        assert_eq!(codec.decode(id, locs.len()), locs);
    }

    #[test]
    fn full_width_is_invertible() {
        let codec = LocationCodec::new(8).unwrap();
        let locs: Vec<Location> = (0..8).map(|i| 255 - i * 7).collect();
        let id = codec.encode(&locs);
        assert_eq!(codec.decode(id, 8), locs);
    }

    #[test]
    fn slot_extracts_single_location() {
        let codec = LocationCodec::new(6).unwrap();
        let locs = vec![1, 2, 63, 4];
        let id = codec.encode(&locs);
        for (i, &loc) in locs.iter().enumerate() {
            assert_eq!(codec.slot(id, i), loc);
        }
    }

    #[test]
    fn slot_zero_is_lowest_bits() {
        let codec = LocationCodec::new(8).unwrap();
        assert_eq!(codec.encode(&[5, 1]), 5 | (1 << 8));
    }

    #[test]
    fn with_slot_replaces_only_that_slot() {
        let codec = LocationCodec::default();
        let id = codec.encode(&[1, 2, 3]);
        let id = codec.with_slot(id, 1, 9);
        assert_eq!(codec.decode(id, 3), vec![1, 9, 3]);
    }

    #[test]
    fn capacity_rejects_overflow() {
        let codec = LocationCodec::new(8).unwrap();
        assert_eq!(codec.max_slots(), 8);
        assert!(codec.check_capacity(8).is_ok());
        assert!(matches!(
            codec.check_capacity(9),
            Err(ConfigError::StateWidthOverflow { max_slots: 8, .. })
        ));
    }

    #[test]
    fn invalid_width_rejected() {
        assert!(LocationCodec::new(0).is_err());
        assert!(LocationCodec::new(33).is_err());
    }
}
