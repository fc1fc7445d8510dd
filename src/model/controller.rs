//! Per-step orchestration of the foraging lifecycle.
//!
//! The controller is the single `StepObserver` the run driver registers
//! with the lattice engine. Each invocation runs, in strict order:
//! livelihood decay, consumption scan, starvation check, chemical-field
//! advance, respawn check. All engine faults inside a step (missing
//! entities, failed spawns) degrade to no-ops; a step never aborts the run.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::model::chemical::ChemicalField;
use crate::model::config::{ConsumptionScan, ForagingConfig};
use crate::model::engine::{
    positions_of_kind, CellKind, EntityId, LatticeEngine, Placement, StepObserver,
};
use crate::model::food::{FoodLedger, RespawnPlacement};
use crate::model::livelihood::LivelihoodTracker;
use crate::model::summary::{nearest_food_distance, RunState};

/// Everything one run owns: the explicit replacement for ambient shared
/// state. Passed by reference into every step.
pub struct ForagingRunContext {
    pub config: ForagingConfig,
    pub livelihood: LivelihoodTracker,
    pub ledger: FoodLedger,
    pub field: ChemicalField,
    pub run_state: RunState,
    pub rng: ChaCha8Rng,
}

impl ForagingRunContext {
    pub fn new(config: ForagingConfig, start: (f64, f64)) -> Self {
        let livelihood = LivelihoodTracker::new(
            config.foraging.livelihood.initial,
            config.foraging.livelihood.max,
        );
        let ledger = FoodLedger::new(config.foraging.respawn.offset);
        let field = ChemicalField::from_config(&config);
        let rng = ChaCha8Rng::seed_from_u64(config.conf.seed);
        Self {
            config,
            livelihood,
            ledger,
            field,
            run_state: RunState::new(start),
            rng,
        }
    }

    fn extents(&self) -> (f64, f64) {
        (
            f64::from(self.config.field_size[0]),
            f64::from(self.config.field_size[1]),
        )
    }
}

/// The after-step hook implementation.
pub struct ForagingStepController {
    pub ctx: ForagingRunContext,
}

impl ForagingStepController {
    pub fn new(ctx: ForagingRunContext) -> Self {
        Self { ctx }
    }

    fn consumption_scan<E: LatticeEngine>(&mut self, engine: &mut E) {
        match self.ctx.config.foraging.scan {
            ConsumptionScan::MainInitiated => self.scan_from_main(engine),
            ConsumptionScan::FoodInitiated => self.scan_from_food(engine),
        }
    }

    /// Canonical scan: each main agent consumes every food entity found in
    /// its neighborhood.
    fn scan_from_main<E: LatticeEngine>(&mut self, engine: &mut E) {
        for id in engine.entities() {
            if engine.kind(id) != Some(CellKind::Main) {
                continue;
            }
            for neighbor in engine.neighbors(id) {
                // A neighbor consumed earlier in this scan reads back as
                // missing; skip it.
                if engine.kind(neighbor) != Some(CellKind::Food) {
                    continue;
                }
                let Some(position) = engine.position(neighbor) else {
                    continue;
                };
                self.consume(engine, neighbor, position);
            }
        }
    }

    /// Legacy scan: each food entity checks for an adjacent main agent.
    /// Functionally symmetric with a single main agent.
    fn scan_from_food<E: LatticeEngine>(&mut self, engine: &mut E) {
        for id in engine.entities() {
            if engine.kind(id) != Some(CellKind::Food) {
                continue;
            }
            let adjacent_to_main = engine
                .neighbors(id)
                .into_iter()
                .any(|n| engine.kind(n) == Some(CellKind::Main));
            if !adjacent_to_main {
                continue;
            }
            let Some(position) = engine.position(id) else {
                continue;
            };
            self.consume(engine, id, position);
        }
    }

    fn consume<E: LatticeEngine>(&mut self, engine: &mut E, food: EntityId, position: (f64, f64)) {
        let ctx = &mut self.ctx;
        let item = ctx
            .ledger
            .record_consumption(position, ctx.run_state.step, &mut ctx.rng);
        ctx.livelihood
            .increment(ctx.config.foraging.livelihood.food_reward);
        engine.kill(food);
        tracing::debug!(
            step = ctx.run_state.step,
            origin = ?item.origin,
            respawn_at = item.respawn_at,
            livelihood = ctx.livelihood.value(),
            "food consumed"
        );
    }

    fn starvation_check<E: LatticeEngine>(&mut self, engine: &mut E) {
        if !self.ctx.livelihood.is_depleted() {
            return;
        }
        let torus = self.ctx.config.torus();
        let extents = self.ctx.extents();
        for id in engine.entities() {
            if engine.kind(id) != Some(CellKind::Main) {
                continue;
            }
            let Some(position) = engine.position(id) else {
                continue;
            };
            let foods = positions_of_kind(engine, CellKind::Food);
            let nearest = nearest_food_distance(&foods, position, torus, extents);
            engine.kill(id);
            self.ctx.run_state.terminate(position, nearest);
            tracing::info!(
                step = self.ctx.run_state.step,
                end = ?position,
                nearest_food = nearest,
                "agent starved, run terminating"
            );
        }
    }

    fn respawn_due<E: LatticeEngine>(&mut self, engine: &mut E) {
        if !self.ctx.config.foraging.respawn.enabled {
            return;
        }
        let placement = self.ctx.config.foraging.respawn.placement;
        for item in self.ctx.ledger.collect_due(self.ctx.run_state.step) {
            let target = match placement {
                RespawnPlacement::Origin => {
                    Placement::At(f64::from(item.origin.0), f64::from(item.origin.1))
                }
                RespawnPlacement::RandomFree => Placement::RandomFree,
            };
            // A failed spawn (no free position) drops the item silently.
            if engine
                .spawn(CellKind::Food, target, &mut self.ctx.rng)
                .is_some()
            {
                tracing::debug!(
                    step = self.ctx.run_state.step,
                    origin = ?item.origin,
                    "food respawned"
                );
            }
        }
    }
}

impl<E: LatticeEngine> StepObserver<E> for ForagingStepController {
    fn on_after_step(&mut self, engine: &mut E) {
        self.ctx.run_state.step += 1;

        // 1. Constant per-step livelihood decay.
        let decay = self.ctx.config.foraging.livelihood.step_decay;
        self.ctx.livelihood.decay(-decay);

        // 2. Consumption scan.
        self.consumption_scan(engine);

        // 3. Starvation check.
        self.starvation_check(engine);

        // 4. Chemical field: secrete, diffuse, decay.
        let foods = positions_of_kind(engine, CellKind::Food);
        self.ctx.field.advance(&foods);

        // 5. Respawn items whose trigger equals the current step.
        self.respawn_due(engine);
    }
}
