//! Ledger of consumed food items and their scheduled respawns.
//!
//! Respawn matching is exact: `collect_due(t)` drains only items whose
//! trigger equals `t`. An item whose trigger time was skipped over (an
//! external step-count jump) is never respawned. That is deliberate and
//! under test, not a defect.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Delay between consumption and reappearance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RespawnOffset {
    Fixed(u64),
    /// Drawn uniformly from the inclusive range `[lower, upper]`.
    Uniform { lower: u64, upper: u64 },
}

/// Where a due item reappears.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RespawnPlacement {
    /// At the remembered origin of the consumed item.
    #[default]
    Origin,
    /// At an engine-chosen random free position.
    RandomFree,
}

/// A consumed food record awaiting respawn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodItem {
    /// Integer-rounded full-resolution position at consumption time.
    pub origin: (i32, i32),
    pub respawn_at: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FoodLedger {
    pending: Vec<FoodItem>,
    offset: RespawnOffset,
}

impl FoodLedger {
    pub fn new(offset: RespawnOffset) -> Self {
        Self {
            pending: Vec::new(),
            offset,
        }
    }

    /// Records a consumption at `now`, scheduling the respawn per policy.
    /// Random offsets draw from the run's seeded source for reproducibility.
    pub fn record_consumption(
        &mut self,
        position: (f64, f64),
        now: u64,
        rng: &mut ChaCha8Rng,
    ) -> FoodItem {
        let offset = match self.offset {
            RespawnOffset::Fixed(offset) => offset,
            RespawnOffset::Uniform { lower, upper } => rng.gen_range(lower..=upper),
        };
        let item = FoodItem {
            origin: (position.0.round() as i32, position.1.round() as i32),
            respawn_at: now + offset,
        };
        self.pending.push(item);
        item
    }

    /// Drains and returns the items whose respawn time equals `now` exactly.
    pub fn collect_due(&mut self, now: u64) -> Vec<FoodItem> {
        let mut due = Vec::new();
        self.pending.retain(|item| {
            if item.respawn_at == now {
                due.push(*item);
                false
            } else {
                true
            }
        });
        due
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
