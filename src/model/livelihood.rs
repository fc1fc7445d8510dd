//! Bounded energy reserve of the foraging agent.
//!
//! Two states: ALIVE and DEPLETED. The tracker latches DEPLETED the moment
//! any mutation leaves the value at or below zero; there is no resurrection.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LivelihoodTracker {
    value: f64,
    max: f64,
    depleted: bool,
}

impl LivelihoodTracker {
    pub fn new(initial: f64, max: f64) -> Self {
        let mut tracker = Self {
            value: 0.0,
            max,
            depleted: false,
        };
        tracker.apply(initial.min(max));
        tracker
    }

    /// Clamps into `[0, max]` and latches depletion at zero.
    fn apply(&mut self, delta: f64) {
        if self.depleted {
            return;
        }
        self.value = (self.value + delta).clamp(0.0, self.max);
        if self.value <= 0.0 {
            self.value = 0.0;
            self.depleted = true;
        }
    }

    /// Per-step decay; `amount` is typically negative.
    pub fn decay(&mut self, amount: f64) {
        self.apply(amount);
    }

    /// Food reward; `amount` is positive.
    pub fn increment(&mut self, amount: f64) {
        self.apply(amount);
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted
    }
}
