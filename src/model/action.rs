//! Action space: typed actions and their stable integer ids.
//!
//! Ids follow the layout used by lookup tables and the external solver:
//! basic actions first (`MoveToTarget`, then `MoveToShelter` when the
//! scenario has shelters), followed by one block per enemy holding
//! `Attack` and, when enabled, `MoveFromEnemy`.

use std::fmt;

use crate::scenario::ScenarioConfig;

/// A decision of the self object. Enemy indices are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveToTarget,
    MoveToShelter,
    Attack(usize),
    MoveFromEnemy(usize),
}

impl Action {
    /// Enemy this action is aimed at, if any.
    pub fn enemy(&self) -> Option<usize> {
        match *self {
            Action::Attack(e) | Action::MoveFromEnemy(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MoveToTarget => write!(f, "Move To Target"),
            Action::MoveToShelter => write!(f, "Move To Shelter"),
            Action::Attack(e) => write!(f, "Attack Enemy #{}", e + 1),
            Action::MoveFromEnemy(e) => write!(f, "Move From Enemy #{}", e + 1),
        }
    }
}

/// Bijection between [`Action`] values and integer ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    has_shelter: bool,
    enemies: usize,
    move_from_enemy: bool,
}

impl ActionSpace {
    pub fn new(has_shelter: bool, enemies: usize, move_from_enemy: bool) -> Self {
        Self {
            has_shelter,
            enemies,
            move_from_enemy,
        }
    }

    pub fn for_scenario(config: &ScenarioConfig) -> Self {
        Self::new(
            !config.shelters().is_empty(),
            config.num_enemies(),
            config.move_from_enemy(),
        )
    }

    /// Same layout restricted to `enemies` enemies.
    pub fn with_enemies(&self, enemies: usize) -> Self {
        Self { enemies, ..*self }
    }

    pub fn num_basic(&self) -> usize {
        1 + usize::from(self.has_shelter)
    }

    /// Actions per enemy block.
    pub fn num_enemy_actions(&self) -> usize {
        1 + usize::from(self.move_from_enemy)
    }

    pub fn num_enemies(&self) -> usize {
        self.enemies
    }

    pub fn len(&self) -> usize {
        self.num_basic() + self.enemies * self.num_enemy_actions()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn decode(&self, id: usize) -> Option<Action> {
        if id >= self.len() {
            return None;
        }
        match id {
            0 => Some(Action::MoveToTarget),
            1 if self.has_shelter => Some(Action::MoveToShelter),
            _ => {
                let rel = id - self.num_basic();
                let enemy = rel / self.num_enemy_actions();
                match rel % self.num_enemy_actions() {
                    0 => Some(Action::Attack(enemy)),
                    _ => Some(Action::MoveFromEnemy(enemy)),
                }
            }
        }
    }

    pub fn encode(&self, action: Action) -> Option<usize> {
        let id = match action {
            Action::MoveToTarget => 0,
            Action::MoveToShelter if self.has_shelter => 1,
            Action::MoveToShelter => return None,
            Action::Attack(e) if e < self.enemies => {
                self.num_basic() + e * self.num_enemy_actions()
            }
            Action::MoveFromEnemy(e) if e < self.enemies && self.move_from_enemy => {
                self.num_basic() + e * self.num_enemy_actions() + 1
            }
            _ => return None,
        };
        Some(id)
    }

    /// Position of an enemy action inside its enemy block.
    pub fn enemy_sub_action(&self, action: Action) -> Option<usize> {
        match action {
            Action::Attack(_) => Some(0),
            Action::MoveFromEnemy(_) if self.move_from_enemy => Some(1),
            _ => None,
        }
    }

    /// All actions in id order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        (0..self.len()).filter_map(move |id| self.decode(id))
    }
}
