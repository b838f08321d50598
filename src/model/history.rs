//! Action/observation history supplied by the search solver.

use super::action::Action;
use crate::state::ObsId;

/// Ordered record of executed actions and the observations that followed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    actions: Vec<Action>,
    observations: Vec<ObsId>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action, observation: ObsId) {
        self.actions.push(action);
        self.observations.push(observation);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn action(&self, i: usize) -> Action {
        self.actions[i]
    }

    pub fn observation(&self, i: usize) -> ObsId {
        self.observations[i]
    }

    pub fn last_observation(&self) -> Option<ObsId> {
        self.observations.last().copied()
    }

    /// Drops everything after the first `len` entries.
    pub fn truncate(&mut self, len: usize) {
        self.actions.truncate(len);
        self.observations.truncate(len);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, ObsId)> + '_ {
        self.actions
            .iter()
            .copied()
            .zip(self.observations.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut h = History::new();
        assert!(h.last_observation().is_none());
        h.push(Action::MoveToTarget, ObsId(3));
        h.push(Action::Attack(0), ObsId(7));
        assert_eq!(h.len(), 2);
        assert_eq!(h.action(1), Action::Attack(0));
        assert_eq!(h.last_observation(), Some(ObsId(7)));
        h.truncate(1);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![(Action::MoveToTarget, ObsId(3))]);
    }
}
