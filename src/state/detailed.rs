//! Unpacked view of a packed state or observation.

use std::ops::{Index, IndexMut};

use super::codec::{LocationCodec, ObsId, StateId};
use crate::grid::{Grid, Location};
use crate::scenario::ScenarioConfig;

/// Ordered object locations: self first, then enemies, then non-involved.
///
/// Shelters and the target are static and live in [`ScenarioConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DetailedState {
    locations: Vec<Location>,
}

impl DetailedState {
    /// A state of `slots` objects, all at location 0.
    pub fn new(slots: usize) -> Self {
        Self {
            locations: vec![0; slots],
        }
    }

    pub fn from_locations(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Unpacks a full state of the scenario's moving objects.
    pub fn from_state(id: StateId, config: &ScenarioConfig) -> Self {
        Self::decode(id.0, config.codec(), config.num_moving_objects())
    }

    /// Unpacks an observation of the scenario's moving objects.
    pub fn from_obs(id: ObsId, config: &ScenarioConfig) -> Self {
        Self::decode(id.0, config.codec(), config.num_moving_objects())
    }

    pub fn decode(id: u64, codec: &LocationCodec, slots: usize) -> Self {
        Self {
            locations: codec.decode(id, slots),
        }
    }

    pub fn encode(&self, codec: &LocationCodec) -> u64 {
        codec.encode(&self.locations)
    }

    pub fn state_id(&self, codec: &LocationCodec) -> StateId {
        StateId(self.encode(codec))
    }

    pub fn obs_id(&self, codec: &LocationCodec) -> ObsId {
        ObsId(self.encode(codec))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn locations_mut(&mut self) -> &mut [Location] {
        &mut self.locations
    }

    pub fn into_locations(self) -> Vec<Location> {
        self.locations
    }

    /// Location of the self object.
    pub fn self_location(&self) -> Location {
        self.locations[0]
    }

    pub fn erase_object(&mut self, idx: usize) {
        self.locations.remove(idx);
    }

    /// Drops every non-involved slot, keeping self and enemies.
    pub fn erase_non_involved(&mut self, num_enemies: usize) {
        self.locations.truncate(1 + num_enemies);
    }

    /// True when object `idx` stands on a shelter.
    pub fn is_protected(&self, idx: usize, shelters: &[Location]) -> bool {
        shelters.contains(&self.locations[idx])
    }

    /// True when every enemy slot holds the dead sentinel.
    pub fn no_living_enemies(&self, num_enemies: usize, grid: &Grid) -> bool {
        self.locations[1..=num_enemies]
            .iter()
            .all(|&loc| grid.is_dead(loc))
    }

    /// True when any non-involved object is dead.
    pub fn any_non_involved_dead(&self, num_enemies: usize, grid: &Grid) -> bool {
        self.locations[1 + num_enemies..]
            .iter()
            .any(|&loc| grid.is_dead(loc))
    }

    /// Character drawn for `loc` in [`DetailedState::render`].
    fn identity_at(&self, loc: Location, config: &ScenarioConfig) -> char {
        if self.locations[0] == loc {
            return 'M';
        }
        let enemies = config.num_enemies();
        for (e, &enemy) in self.locations[1..=enemies].iter().enumerate() {
            if enemy == loc {
                return char::from_digit(((e + 1) % 10) as u32, 10).unwrap_or('E');
            }
        }
        if self.locations[1 + enemies..].contains(&loc) {
            return 'N';
        }
        if config.shelters().contains(&loc) {
            return 'S';
        }
        if config.target() == loc {
            return 'T';
        }
        '_'
    }

    /// Location tuple followed by an ASCII picture of the grid.
    pub fn render(&self, config: &ScenarioConfig) -> String {
        let tuple: Vec<String> = self.locations.iter().map(|l| l.to_string()).collect();
        let mut out = format!("({})\n", tuple.join(", "));
        let size = config.grid().size();
        for y in 0..size {
            for x in 0..size {
                out.push(self.identity_at(x + y * size, config));
            }
            out.push('\n');
        }
        out
    }
}

impl Index<usize> for DetailedState {
    type Output = Location;

    fn index(&self, idx: usize) -> &Location {
        &self.locations[idx]
    }
}

impl IndexMut<usize> for DetailedState {
    fn index_mut(&mut self, idx: usize) -> &mut Location {
        &mut self.locations[idx]
    }
}

impl From<Vec<Location>> for DetailedState {
    fn from(locations: Vec<Location>) -> Self {
        Self::from_locations(locations)
    }
}
