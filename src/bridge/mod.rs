//! Ingestion of state frames reported by an external simulator.
//!
//! A frame is a flat list of 32-bit words: the simulator's grid size
//! followed by `(identity, location)` pairs. The simulator may run at a
//! different resolution; every location is rescaled onto the scenario grid
//! and packed into a state and an observation. Transport is left to the
//! caller.

pub mod error;

pub use error::BridgeError;

use std::fmt;

use crate::grid::{Grid, Location};
use crate::scenario::{ConfigError, ScenarioConfig};
use crate::state::{ObsId, StateId};

/// Identity code attached to every object of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ObjectIdentity {
    SelfAgent = 0,
    /// An enemy the self object does not currently see.
    Enemy = 1,
    /// A non-involved object the self object does not currently see.
    NonInvolved = 2,
    Shelter = 3,
    Target = 4,
    ObservedEnemy = 5,
    ObservedNonInvolved = 6,
}

impl ObjectIdentity {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for ObjectIdentity {
    type Error = BridgeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => ObjectIdentity::SelfAgent,
            1 => ObjectIdentity::Enemy,
            2 => ObjectIdentity::NonInvolved,
            3 => ObjectIdentity::Shelter,
            4 => ObjectIdentity::Target,
            5 => ObjectIdentity::ObservedEnemy,
            6 => ObjectIdentity::ObservedNonInvolved,
            other => return Err(BridgeError::UnknownIdentity(other)),
        })
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ObjectIdentity::SelfAgent => "self",
            ObjectIdentity::Enemy => "enemy",
            ObjectIdentity::NonInvolved => "non-involved",
            ObjectIdentity::Shelter => "shelter",
            ObjectIdentity::Target => "target",
            ObjectIdentity::ObservedEnemy => "observed enemy",
            ObjectIdentity::ObservedNonInvolved => "observed non-involved",
        };
        f.write_str(label)
    }
}

/// A decoded simulator frame, still in simulator coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorFrame {
    pub grid_size: u32,
    pub objects: Vec<(ObjectIdentity, Location)>,
}

impl SimulatorFrame {
    /// Decodes the word layout `[grid_size, id_0, loc_0, id_1, loc_1, …]`.
    pub fn from_words(words: &[i32]) -> Result<Self, BridgeError> {
        let (&size, pairs) = words.split_first().ok_or(BridgeError::EmptyFrame)?;
        let grid_size = u32::try_from(size)
            .ok()
            .filter(|&s| s > 0)
            .ok_or(BridgeError::InvalidGridSize(size))?;
        if pairs.len() % 2 != 0 {
            return Err(BridgeError::TruncatedPair(words.len()));
        }
        let grid = Grid::new(grid_size);

        let objects = pairs
            .chunks_exact(2)
            .map(|pair| {
                let identity = ObjectIdentity::try_from(pair[0])?;
                let location = Location::try_from(pair[1])
                    .ok()
                    .filter(|&l| grid.is_cell(l))
                    .ok_or(BridgeError::LocationOutOfGrid {
                        location: pair[1],
                        grid_size,
                    })?;
                Ok((identity, location))
            })
            .collect::<Result<Vec<_>, BridgeError>>()?;

        Ok(Self { grid_size, objects })
    }

    /// Inverse of [`SimulatorFrame::from_words`]. Fails when the grid size or
    /// a location does not fit in a word.
    pub fn to_words(&self) -> Result<Vec<i32>, BridgeError> {
        let word = |value: u32| i32::try_from(value).map_err(|_| BridgeError::WordOverflow(value));
        let mut words = Vec::with_capacity(1 + 2 * self.objects.len());
        words.push(word(self.grid_size)?);
        for &(identity, location) in &self.objects {
            words.push(identity.code());
            words.push(word(location)?);
        }
        Ok(words)
    }

    /// The `nth` object whose identity is one of `kinds`, in frame order.
    fn nth_of(&self, kinds: &[ObjectIdentity], nth: usize) -> Option<(ObjectIdentity, Location)> {
        self.objects
            .iter()
            .filter(|(identity, _)| kinds.contains(identity))
            .nth(nth)
            .copied()
    }
}

/// A frame mapped onto a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFrame {
    pub state: StateId,
    pub observation: ObsId,
    pub target: Location,
    pub shelters: Vec<Location>,
}

impl IngestedFrame {
    /// Copy of `config` using the target and shelters reported by the frame.
    pub fn apply_layout(&self, config: &ScenarioConfig) -> Result<ScenarioConfig, ConfigError> {
        config.with_layout(self.target, self.shelters.clone())
    }
}

/// Maps a simulator frame onto `config`.
///
/// The nth enemy and nth non-involved object of the frame fill the nth slot
/// of their kind; objects the frame does not report are dead. Unobserved
/// enemies and non-involved objects appear in the observation as the
/// non-observed sentinel.
pub fn ingest(
    frame: &SimulatorFrame,
    config: &ScenarioConfig,
) -> Result<IngestedFrame, BridgeError> {
    let foreign = Grid::new(frame.grid_size);
    let grid = config.grid();
    let rescale = |loc: Location| grid.rescale_from(loc, &foreign);

    let (_, self_loc) = frame
        .nth_of(&[ObjectIdentity::SelfAgent], 0)
        .ok_or(BridgeError::MissingSelf)?;
    let (_, target) = frame
        .nth_of(&[ObjectIdentity::Target], 0)
        .ok_or(BridgeError::MissingTarget)?;

    let mut state = vec![rescale(self_loc)];
    let mut observation = vec![rescale(self_loc)];
    let kinds = [
        (
            config.num_enemies(),
            [ObjectIdentity::Enemy, ObjectIdentity::ObservedEnemy],
        ),
        (
            config.num_non_involved(),
            [ObjectIdentity::NonInvolved, ObjectIdentity::ObservedNonInvolved],
        ),
    ];
    for (count, identities) in kinds {
        for nth in 0..count {
            match frame.nth_of(&identities, nth) {
                Some((identity, loc)) => {
                    let loc = rescale(loc);
                    state.push(loc);
                    observation.push(if identity == identities[1] {
                        loc
                    } else {
                        grid.non_observed()
                    });
                }
                None => {
                    state.push(grid.dead());
                    observation.push(grid.dead());
                }
            }
        }
    }

    let shelters = frame
        .objects
        .iter()
        .filter(|(identity, _)| *identity == ObjectIdentity::Shelter)
        .map(|&(_, loc)| rescale(loc))
        .collect();

    tracing::debug!(
        scenario = %config.id(),
        foreign_grid = frame.grid_size,
        objects = frame.objects.len(),
        "simulator frame ingested"
    );

    let codec = config.codec();
    Ok(IngestedFrame {
        state: StateId(codec.encode(&state)),
        observation: ObsId(codec.encode(&observation)),
        target: rescale(target),
        shelters,
    })
}
