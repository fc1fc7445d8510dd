use rand::Rng;
use rand_chacha::ChaCha8Rng;

use forager_lib::model::chemical::ChemicalField;
use forager_lib::model::config::ForagingConfig;
use forager_lib::model::engine::{CellKind, EntityId, LatticeEngine, Placement};
use forager_lib::model::runner::ForagingRun;
use forager_lib::model::summary::distance;

/// Two entities closer than this are in contact, matching the reference
/// substrate's adjacency rule.
pub const CONTACT_RADIUS: f64 = 2.0;

#[derive(Debug, Clone)]
struct Cell {
    id: EntityId,
    kind: CellKind,
    position: (f64, f64),
}

/// Deterministic test engine: entities stay where the test puts them,
/// except for scripted moves keyed on the engine's own step counter.
pub struct ScriptedEngine {
    cells: Vec<Cell>,
    next_id: EntityId,
    step_count: u64,
    torus: bool,
    extents: (f64, f64),
    moves: Vec<(u64, EntityId, (f64, f64))>,
}

impl ScriptedEngine {
    pub fn new(config: &ForagingConfig) -> Self {
        Self {
            cells: Vec::new(),
            next_id: 1,
            step_count: 0,
            torus: config.torus(),
            extents: (
                f64::from(config.field_size[0]),
                f64::from(config.field_size[1]),
            ),
            moves: Vec::new(),
        }
    }

    pub fn add(&mut self, kind: CellKind, position: (f64, f64)) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.cells.push(Cell { id, kind, position });
        id
    }

    /// Schedules `id` to jump to `position` during engine step `step`.
    pub fn schedule_move(&mut self, step: u64, id: EntityId, position: (f64, f64)) {
        self.moves.push((step, id, position));
    }

    pub fn population(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }
}

impl LatticeEngine for ScriptedEngine {
    fn entities(&self) -> Vec<EntityId> {
        self.cells.iter().map(|c| c.id).collect()
    }

    fn kind(&self, id: EntityId) -> Option<CellKind> {
        self.cells.iter().find(|c| c.id == id).map(|c| c.kind)
    }

    fn neighbors(&self, id: EntityId) -> Vec<EntityId> {
        let Some(cell) = self.cells.iter().find(|c| c.id == id) else {
            return Vec::new();
        };
        self.cells
            .iter()
            .filter(|c| c.id != id)
            .filter(|c| {
                distance(c.position, cell.position, self.torus, self.extents) <= CONTACT_RADIUS
            })
            .map(|c| c.id)
            .collect()
    }

    fn position(&self, id: EntityId) -> Option<(f64, f64)> {
        self.cells.iter().find(|c| c.id == id).map(|c| c.position)
    }

    fn kill(&mut self, id: EntityId) {
        self.cells.retain(|c| c.id != id);
    }

    fn spawn(
        &mut self,
        kind: CellKind,
        placement: Placement,
        rng: &mut ChaCha8Rng,
    ) -> Option<EntityId> {
        let position = match placement {
            Placement::At(x, y) => (x, y),
            Placement::RandomFree => (
                rng.gen_range(0.0..self.extents.0),
                rng.gen_range(0.0..self.extents.1),
            ),
        };
        Some(self.add(kind, position))
    }

    fn step(&mut self, _field: &ChemicalField, _rng: &mut ChaCha8Rng) {
        self.step_count += 1;
        let step = self.step_count;
        let due: Vec<_> = self
            .moves
            .iter()
            .filter(|(s, ..)| *s == step)
            .cloned()
            .collect();
        for (_, id, position) in due {
            if let Some(cell) = self.cells.iter_mut().find(|c| c.id == id) {
                cell.position = position;
            }
        }
    }
}

/// Builder for scripted foraging runs, mirroring the scenario setup used
/// throughout the integration suite.
pub struct RunBuilder {
    config: ForagingConfig,
    foods: Vec<(f64, f64)>,
    agents: Vec<(f64, f64)>,
    moves: Vec<(u64, usize, (f64, f64))>,
}

impl RunBuilder {
    pub fn new() -> Self {
        let mut config = ForagingConfig::default();
        // Scenarios place entities explicitly.
        config.simsettings.nr_cells = [0, 1];
        Self {
            config,
            foods: Vec::new(),
            agents: Vec::new(),
            moves: Vec::new(),
        }
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut ForagingConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_agent(mut self, x: f64, y: f64) -> Self {
        self.agents.push((x, y));
        self
    }

    pub fn with_food(mut self, x: f64, y: f64) -> Self {
        self.foods.push((x, y));
        self
    }

    /// Moves the `index`-th food to `position` during engine step `step`.
    pub fn with_food_move(mut self, step: u64, index: usize, position: (f64, f64)) -> Self {
        self.moves.push((step, index, position));
        self
    }

    pub fn build(self) -> ForagingRun<ScriptedEngine> {
        let foods = self.foods;
        let agents = self.agents;
        let moves = self.moves;
        ForagingRun::start(self.config, move |cfg, _rng| {
            let mut engine = ScriptedEngine::new(cfg);
            let mut food_ids = Vec::new();
            for position in foods {
                food_ids.push(engine.add(CellKind::Food, position));
            }
            for position in agents {
                engine.add(CellKind::Main, position);
            }
            for (step, index, position) in moves {
                engine.schedule_move(step, food_ids[index], position);
            }
            engine
        })
        .expect("scenario config must validate")
    }
}
