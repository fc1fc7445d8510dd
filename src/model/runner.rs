//! Run driver: run-start, run-loop, finalize.
//!
//! The loop alternates one engine step with one controller step until the
//! controller signals termination or the step budget is exhausted. The
//! termination flag is observed between steps, never mid-step.

use rand_chacha::ChaCha8Rng;

use crate::model::config::{ConfigError, ForagingConfig};
use crate::model::controller::{ForagingRunContext, ForagingStepController};
use crate::model::engine::{positions_of_kind, CellKind, LatticeEngine, StepObserver};
use crate::model::summary::{nearest_food_distance, RunState, RunSummary, NO_FOOD_DISTANCE};

pub struct ForagingRun<E: LatticeEngine> {
    engine: E,
    controller: ForagingStepController,
}

impl<E: LatticeEngine> ForagingRun<E> {
    /// Validates the configuration, builds and burns in the engine, and
    /// captures the agent start position. The builder receives the run's
    /// seeded source, so entity seeding shares the stream with everything
    /// else in the run.
    pub fn start<F>(config: ForagingConfig, build_engine: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&ForagingConfig, &mut ChaCha8Rng) -> E,
    {
        config.validate()?;
        let mut ctx = ForagingRunContext::new(config, (0.0, 0.0));
        let mut engine = build_engine(&ctx.config, &mut ctx.rng);

        for _ in 0..ctx.config.simsettings.burnin {
            engine.step(&ctx.field, &mut ctx.rng);
        }

        let start = positions_of_kind(&engine, CellKind::Main)
            .first()
            .copied()
            .unwrap_or((0.0, 0.0));
        ctx.run_state = RunState::new(start);
        tracing::info!(
            ?start,
            seed = ctx.config.conf.seed,
            budget = ctx.config.simsettings.runtime,
            "foraging run started"
        );

        Ok(Self {
            engine,
            controller: ForagingStepController::new(ctx),
        })
    }

    pub fn state(&self) -> &RunState {
        &self.controller.ctx.run_state
    }

    pub fn context(&self) -> &ForagingRunContext {
        &self.controller.ctx
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Advances one simulated step: engine phase, then the after-step hook.
    pub fn step(&mut self) {
        self.engine
            .step(&self.controller.ctx.field, &mut self.controller.ctx.rng);
        self.controller.on_after_step(&mut self.engine);
    }

    /// Runs until termination or budget exhaustion.
    pub fn run_loop(&mut self) {
        let budget = self.controller.ctx.config.simsettings.runtime;
        while !self.controller.ctx.run_state.terminated
            && self.controller.ctx.run_state.step < budget
        {
            self.step();
        }
    }

    /// Produces the final summary. When the budget ran out before
    /// starvation, the end position and nearest-food distance are computed
    /// here with the same nearest-food query the starvation path uses.
    pub fn finalize(mut self) -> RunSummary {
        let ctx = &mut self.controller.ctx;
        if !ctx.run_state.terminated {
            let end = positions_of_kind(&self.engine, CellKind::Main)
                .first()
                .copied()
                .unwrap_or(ctx.run_state.start);
            let foods = positions_of_kind(&self.engine, CellKind::Food);
            let extents = (
                f64::from(ctx.config.field_size[0]),
                f64::from(ctx.config.field_size[1]),
            );
            let nearest = nearest_food_distance(&foods, end, ctx.config.torus(), extents);
            ctx.run_state.terminate(end, nearest);
        }

        let summary = RunSummary {
            steps: ctx.run_state.step,
            livelihood: ctx.livelihood.value(),
            nearest_food_distance: ctx
                .run_state
                .nearest_food_distance
                .unwrap_or(NO_FOOD_DISTANCE),
            start: ctx.run_state.start,
            end: ctx.run_state.end.unwrap_or(ctx.run_state.start),
        };
        tracing::info!(
            steps = summary.steps,
            livelihood = summary.livelihood,
            nearest_food = summary.nearest_food_distance,
            "foraging run finished"
        );
        summary
    }
}
