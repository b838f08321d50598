//! Scenario configuration: grid, objects, layout and rewards.
//!
//! A [`ScenarioConfig`] is built once through [`ScenarioBuilder`], validated,
//! and then shared read-only by every codec, transition and lookup operation.

use std::fmt::Write as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::rewards::RewardTable;
use crate::grid::{Grid, Location};
use crate::objects::{EnemyObject, NonInvolvedObject, ObjectKind, SelfObject};
use crate::state::{LocationCodec, DEFAULT_LOCATION_BITS};
use crate::{generate_id, Id};

/// An object together with the cells it may start on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectSpec<T> {
    pub object: T,
    pub init_locations: Vec<Location>,
}

#[cfg(feature = "serde")]
fn default_location_bits() -> u32 {
    DEFAULT_LOCATION_BITS
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_period() -> u32 {
    1
}

/// Unvalidated scenario description.
///
/// # Examples
///
/// ```
/// use pomgrid::objects::{EnemyObject, SelfObject};
/// use pomgrid::scenario::ScenarioBuilder;
///
/// let config = ScenarioBuilder::new(5, 24)
///     .self_object(SelfObject::default(), vec![0])
///     .enemy(EnemyObject::default(), vec![12, 13])
///     .shelter(6)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.num_moving_objects(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScenarioBuilder {
    pub grid_size: u32,
    pub target: Location,
    #[cfg_attr(feature = "serde", serde(default = "default_location_bits"))]
    pub location_bits: u32,
    pub self_object: Option<ObjectSpec<SelfObject>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enemies: Vec<ObjectSpec<EnemyObject>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub non_involved: Vec<ObjectSpec<NonInvolvedObject>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shelters: Vec<Location>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rewards: RewardTable,
    /// Whether every enemy gets a "move from enemy" action.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub move_from_enemy: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_period"))]
    pub period_of_decision: u32,
}

impl ScenarioBuilder {
    pub fn new(grid_size: u32, target: Location) -> Self {
        Self {
            grid_size,
            target,
            location_bits: DEFAULT_LOCATION_BITS,
            self_object: None,
            enemies: Vec::new(),
            non_involved: Vec::new(),
            shelters: Vec::new(),
            rewards: RewardTable::default(),
            move_from_enemy: true,
            period_of_decision: 1,
        }
    }

    pub fn self_object(mut self, object: SelfObject, init_locations: Vec<Location>) -> Self {
        self.self_object = Some(ObjectSpec {
            object,
            init_locations,
        });
        self
    }

    pub fn enemy(mut self, object: EnemyObject, init_locations: Vec<Location>) -> Self {
        self.enemies.push(ObjectSpec {
            object,
            init_locations,
        });
        self
    }

    pub fn non_involved(
        mut self,
        object: NonInvolvedObject,
        init_locations: Vec<Location>,
    ) -> Self {
        self.non_involved.push(ObjectSpec {
            object,
            init_locations,
        });
        self
    }

    pub fn shelter(mut self, location: Location) -> Self {
        self.shelters.push(location);
        self
    }

    pub fn location_bits(mut self, bits: u32) -> Self {
        self.location_bits = bits;
        self
    }

    pub fn rewards(mut self, rewards: RewardTable) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn move_from_enemy(mut self, enabled: bool) -> Self {
        self.move_from_enemy = enabled;
        self
    }

    pub fn period_of_decision(mut self, period: u32) -> Self {
        self.period_of_decision = period;
        self
    }

    /// Validates the description and freezes it into a [`ScenarioConfig`].
    pub fn build(self) -> Result<ScenarioConfig, ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let grid = Grid::new(self.grid_size);
        let codec = LocationCodec::new(self.location_bits)?;
        if u64::from(grid.max_location()) > codec.max_location() {
            return Err(ConfigError::LocationWidthOverflow {
                size: self.grid_size,
                max_location: grid.max_location(),
                bits: self.location_bits,
            });
        }

        let me = self.self_object.ok_or(ConfigError::MissingSelf)?;
        codec.check_capacity(1 + self.enemies.len() + self.non_involved.len())?;

        if !grid.is_cell(self.target) {
            return Err(ConfigError::TargetOutOfGrid(self.target));
        }
        if let Some(&bad) = self.shelters.iter().find(|&&s| !grid.is_cell(s)) {
            return Err(ConfigError::ShelterOutOfGrid(bad));
        }
        if self.period_of_decision == 0 {
            return Err(ConfigError::ZeroDecisionPeriod);
        }

        let mut init_locations =
            Vec::with_capacity(1 + self.enemies.len() + self.non_involved.len());
        init_locations.push(me.init_locations);
        let enemies: Vec<EnemyObject> = self
            .enemies
            .into_iter()
            .map(|spec| {
                init_locations.push(spec.init_locations);
                spec.object
            })
            .collect();
        let non_involved: Vec<NonInvolvedObject> = self
            .non_involved
            .into_iter()
            .map(|spec| {
                init_locations.push(spec.init_locations);
                spec.object
            })
            .collect();

        for (object, locations) in init_locations.iter().enumerate() {
            if locations.is_empty() {
                return Err(ConfigError::EmptyInitLocations { object });
            }
            if let Some(&location) = locations.iter().find(|&&l| !grid.is_cell(l)) {
                return Err(ConfigError::InitLocationOutOfGrid { object, location });
            }
        }

        let config = ScenarioConfig {
            id: generate_id(),
            grid,
            target: self.target,
            shelters: self.shelters,
            self_object: me.object,
            enemies,
            non_involved,
            init_locations,
            codec,
            rewards: self.rewards,
            move_from_enemy: self.move_from_enemy,
            period_of_decision: self.period_of_decision,
        };

        tracing::info!(
            scenario = %config.id,
            grid = config.grid.size(),
            enemies = config.num_enemies(),
            non_involved = config.num_non_involved(),
            shelters = config.shelters.len(),
            "scenario configured"
        );

        Ok(config)
    }
}

/// Validated, immutable scenario.
///
/// Object slots are ordered self, enemies, non-involved. Shelters and the
/// target are static and are not part of the packed state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    id: Id,
    grid: Grid,
    target: Location,
    shelters: Vec<Location>,
    self_object: SelfObject,
    enemies: Vec<EnemyObject>,
    non_involved: Vec<NonInvolvedObject>,
    init_locations: Vec<Vec<Location>>,
    codec: LocationCodec,
    rewards: RewardTable,
    move_from_enemy: bool,
    period_of_decision: u32,
}

impl ScenarioConfig {
    /// Instance identifier, attached to log records.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn target(&self) -> Location {
        self.target
    }

    pub fn shelters(&self) -> &[Location] {
        &self.shelters
    }

    pub fn self_object(&self) -> &SelfObject {
        &self.self_object
    }

    pub fn enemies(&self) -> &[EnemyObject] {
        &self.enemies
    }

    pub fn non_involved(&self) -> &[NonInvolvedObject] {
        &self.non_involved
    }

    /// Initial location candidates of moving object `idx`.
    pub fn init_locations(&self, idx: usize) -> &[Location] {
        &self.init_locations[idx]
    }

    pub fn codec(&self) -> &LocationCodec {
        &self.codec
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    pub fn move_from_enemy(&self) -> bool {
        self.move_from_enemy
    }

    pub fn period_of_decision(&self) -> u32 {
        self.period_of_decision
    }

    pub fn num_enemies(&self) -> usize {
        self.enemies.len()
    }

    pub fn num_non_involved(&self) -> usize {
        self.non_involved.len()
    }

    /// Self, enemies and non-involved: the slots of a packed state.
    pub fn num_moving_objects(&self) -> usize {
        1 + self.enemies.len() + self.non_involved.len()
    }

    /// Moving objects plus shelters.
    pub fn num_all_objects(&self) -> usize {
        self.num_moving_objects() + self.shelters.len()
    }

    /// Classifies an index of the extended ordering self, enemies,
    /// non-involved, shelters, target.
    pub fn who_am_i(&self, idx: usize) -> ObjectKind {
        let enemies_end = 1 + self.enemies.len();
        let non_involved_end = enemies_end + self.non_involved.len();
        let shelters_end = non_involved_end + self.shelters.len();
        if idx == 0 {
            ObjectKind::SelfAgent
        } else if idx < enemies_end {
            ObjectKind::Enemy
        } else if idx < non_involved_end {
            ObjectKind::NonInvolved
        } else if idx < shelters_end {
            ObjectKind::Shelter
        } else {
            ObjectKind::Target
        }
    }

    /// Nearest shelter to `loc` by squared distance, first one wins on ties.
    pub fn nearest_shelter(&self, loc: Location) -> Option<Location> {
        let mut nearest = None;
        let mut min_dist = i32::MAX;
        for &shelter in &self.shelters {
            let dist = self.grid.squared_distance(loc, shelter);
            if dist < min_dist {
                min_dist = dist;
                nearest = Some(shelter);
            }
        }
        nearest
    }

    /// Copy of this scenario with a new target and shelter layout.
    pub fn with_layout(
        &self,
        target: Location,
        shelters: Vec<Location>,
    ) -> Result<Self, ConfigError> {
        if !self.grid.is_cell(target) {
            return Err(ConfigError::TargetOutOfGrid(target));
        }
        if let Some(&bad) = shelters.iter().find(|&&s| !self.grid.is_cell(s)) {
            return Err(ConfigError::ShelterOutOfGrid(bad));
        }
        Ok(Self {
            target,
            shelters,
            ..self.clone()
        })
    }

    /// Human-readable report of the model parameters.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let list = |locs: &[Location]| {
            locs.iter()
                .map(|l| l.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let _ = writeln!(out, "Model details:");
        let _ = writeln!(
            out,
            "grid size: {}  target idx: {}",
            self.grid.size(),
            self.target
        );
        let _ = writeln!(out, "\nSELF:");
        let _ = writeln!(out, "possible initial locations: ({})", list(&self.init_locations[0]));
        let _ = writeln!(out, "movement: {}", self.self_object.movement);
        let _ = writeln!(out, "attack: {}", self.self_object.attack);
        let _ = writeln!(out, "observation: {}", self.self_object.observation);

        let _ = writeln!(out, "\nENEMIES:");
        for (i, enemy) in self.enemies.iter().enumerate() {
            let _ = writeln!(out, "enemy #{}", i + 1);
            let _ = writeln!(
                out,
                "possible initial locations: ({})",
                list(&self.init_locations[i + 1])
            );
            let _ = writeln!(out, "movement: {}", enemy.movement);
            let _ = writeln!(out, "attack: {}", enemy.attack);
        }

        let _ = writeln!(out, "\nNON-INVOLVED:");
        for (i, bystander) in self.non_involved.iter().enumerate() {
            let slot = 1 + self.enemies.len() + i;
            let _ = writeln!(out, "non-involved #{}", i + 1);
            let _ = writeln!(
                out,
                "possible initial locations: ({})",
                list(&self.init_locations[slot])
            );
            let _ = writeln!(out, "movement: {}", bystander.movement);
        }

        let _ = writeln!(out, "\nSHELTERS: ({})", list(&self.shelters));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{EnemyObject, NonInvolvedObject, SelfObject};

    fn builder() -> ScenarioBuilder {
        ScenarioBuilder::new(5, 24)
            .self_object(SelfObject::default(), vec![0])
            .enemy(EnemyObject::default(), vec![12])
            .non_involved(NonInvolvedObject::default(), vec![4, 20])
            .shelter(6)
    }

    #[test]
    fn builds_valid_scenario() {
        let cfg = builder().build().unwrap();
        assert_eq!(cfg.num_moving_objects(), 3);
        assert_eq!(cfg.num_all_objects(), 4);
        assert_eq!(cfg.init_locations(2), &[4, 20]);
        assert!(!cfg.id().is_empty());
    }

    #[test]
    fn missing_self_rejected() {
        let err = ScenarioBuilder::new(5, 24).build().unwrap_err();
        assert_eq!(err, ConfigError::MissingSelf);
    }

    #[test]
    fn too_many_objects_rejected() {
        let mut b = builder();
        for _ in 0..6 {
            b = b.enemy(EnemyObject::default(), vec![1]);
        }
        assert!(matches!(
            b.build(),
            Err(ConfigError::StateWidthOverflow { slots: 9, .. })
        ));
    }

    #[test]
    fn grid_too_fine_for_location_width() {
        let err = ScenarioBuilder::new(16, 0)
            .self_object(SelfObject::default(), vec![0])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::LocationWidthOverflow { size: 16, .. }));
    }

    #[test]
    fn wider_slots_allow_finer_grids() {
        let cfg = ScenarioBuilder::new(16, 0)
            .location_bits(10)
            .self_object(SelfObject::default(), vec![0])
            .build()
            .unwrap();
        assert_eq!(cfg.codec().max_slots(), 6);
    }

    #[test]
    fn malformed_init_locations_rejected() {
        let err = builder()
            .enemy(EnemyObject::default(), vec![])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyInitLocations { object: 2 });

        let err = builder()
            .enemy(EnemyObject::default(), vec![25])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InitLocationOutOfGrid {
                object: 2,
                location: 25
            }
        );
    }

    #[test]
    fn who_am_i_classifies_extended_ordering() {
        let cfg = builder().build().unwrap();
        assert_eq!(cfg.who_am_i(0), ObjectKind::SelfAgent);
        assert_eq!(cfg.who_am_i(1), ObjectKind::Enemy);
        assert_eq!(cfg.who_am_i(2), ObjectKind::NonInvolved);
        assert_eq!(cfg.who_am_i(3), ObjectKind::Shelter);
        assert_eq!(cfg.who_am_i(4), ObjectKind::Target);
    }

    #[test]
    fn nearest_shelter_keeps_the_minimum() {
        let cfg = builder().shelter(18).shelter(1).build().unwrap();
        // shelters 6, 18, 1; from 0 the closest is 1 (distance 1)
        assert_eq!(cfg.nearest_shelter(0), Some(1));
        assert_eq!(cfg.nearest_shelter(24), Some(18));
    }

    #[test]
    fn with_layout_revalidates() {
        let cfg = builder().build().unwrap();
        let moved = cfg.with_layout(20, vec![3]).unwrap();
        assert_eq!(moved.target(), 20);
        assert_eq!(moved.shelters(), &[3]);
        assert_eq!(moved.id(), cfg.id());
        assert!(cfg.with_layout(30, vec![]).is_err());
    }

    #[test]
    fn describe_lists_objects() {
        let text = builder().build().unwrap().describe();
        assert!(text.contains("grid size: 5  target idx: 24"));
        assert!(text.contains("enemy #1"));
        assert!(text.contains("non-involved #1"));
        assert!(text.contains("SHELTERS: (6)"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn builder_deserializes_with_defaults() {
        let json = r#"{
            "grid_size": 5,
            "target": 24,
            "self_object": {
                "object": {
                    "movement": { "Pursue": { "p_success": 0.9 } },
                    "attack": { "Direct": { "range": 2.0, "p_hit": 0.7 } },
                    "observation": "Omniscient"
                },
                "init_locations": [0]
            },
            "enemies": [
                {
                    "object": {
                        "movement": { "RandomWalk": { "p_stay": 0.5 } },
                        "attack": { "Direct": { "range": 1.5, "p_hit": 0.5 } }
                    },
                    "init_locations": [12]
                }
            ]
        }"#;
        let builder: ScenarioBuilder = serde_json::from_str(json).unwrap();
        assert_eq!(builder.location_bits, DEFAULT_LOCATION_BITS);
        assert!(builder.move_from_enemy);
        let cfg = builder.build().unwrap();
        assert_eq!(cfg.num_enemies(), 1);
        assert_eq!(cfg.rewards(), &RewardTable::default());
    }
}
