//! Decision period: hold each decided action for a fixed number of steps.

use super::action::Action;

/// Re-issues the last decided action between decision points.
///
/// With a period of `k`, the action passed on steps `0, k, 2k, …` is
/// adopted and every other step repeats it.
#[derive(Debug, Clone)]
pub struct DecisionPeriod {
    period: u32,
    counter: u64,
    held: Option<Action>,
}

impl DecisionPeriod {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            counter: 0,
            held: None,
        }
    }

    /// Returns the action to actually execute this step.
    pub fn apply(&mut self, decided: Action) -> Action {
        let action = match self.held {
            Some(held) if self.counter % u64::from(self.period) != 0 => held,
            _ => decided,
        };
        self.held = Some(action);
        self.counter += 1;
        action
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.held = None;
    }
}
