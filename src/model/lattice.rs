//! Minimal reference substrate implementing [`LatticeEngine`].
//!
//! This is deliberately not a cellular-Potts engine: entities are point
//! centroids, movement is a gradient-biased random walk, and adjacency is a
//! contact-radius test. It gives the run driver, the binary and the
//! integration tests a live engine with the same interface the full
//! pixel-copy substrate would expose.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::model::chemical::ChemicalField;
use crate::model::config::ForagingConfig;
use crate::model::engine::{CellKind, EntityId, LatticeEngine, Placement};
use crate::model::summary::distance;

/// Two entities closer than this are in contact.
const CONTACT_RADIUS: f64 = 2.0;

/// Candidate moves per step: the Moore neighborhood plus staying put.
const MOVES: [(f64, f64); 9] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
    (-1.0, -1.0),
];

#[derive(Debug, Clone)]
struct Cell {
    id: EntityId,
    kind: CellKind,
    x: f64,
    y: f64,
}

pub struct WalkerLattice {
    width: f64,
    height: f64,
    torus: bool,
    /// Chemotaxis weight for the main kind, from the per-kind table.
    lambda_ch: f64,
    temperature: f64,
    cells: Vec<Cell>,
    next_id: EntityId,
}

impl WalkerLattice {
    pub fn new(config: &ForagingConfig) -> Self {
        let lambda_ch = config
            .conf
            .lambda_ch
            .get(CellKind::Main.index())
            .copied()
            .unwrap_or(0.0);
        Self {
            width: f64::from(config.field_size[0]),
            height: f64::from(config.field_size[1]),
            torus: config.torus(),
            lambda_ch,
            temperature: config.conf.temperature,
            cells: Vec::new(),
            next_id: 1,
        }
    }

    /// Seeds the configured number of food and main entities at random
    /// positions, food first (matching the kind ordering of the config).
    pub fn seed(&mut self, config: &ForagingConfig, rng: &mut ChaCha8Rng) {
        for _ in 0..config.simsettings.nr_cells[0] {
            self.spawn_random(CellKind::Food, rng);
        }
        for _ in 0..config.simsettings.nr_cells[1] {
            self.spawn_random(CellKind::Main, rng);
        }
    }

    fn spawn_random(&mut self, kind: CellKind, rng: &mut ChaCha8Rng) -> Option<EntityId> {
        // Rejection-sample a free position; give up after a bounded number
        // of attempts on a crowded lattice.
        for _ in 0..64 {
            let x = rng.gen_range(0.0..self.width);
            let y = rng.gen_range(0.0..self.height);
            if self.free_at(x, y) {
                return Some(self.insert(kind, x, y));
            }
        }
        None
    }

    fn free_at(&self, x: f64, y: f64) -> bool {
        self.cells.iter().all(|c| {
            distance((c.x, c.y), (x, y), self.torus, (self.width, self.height)) > CONTACT_RADIUS
        })
    }

    fn insert(&mut self, kind: CellKind, x: f64, y: f64) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.cells.push(Cell { id, kind, x, y });
        id
    }

    fn wrap(&self, x: f64, y: f64) -> (f64, f64) {
        if self.torus {
            (x.rem_euclid(self.width), y.rem_euclid(self.height))
        } else {
            (
                x.clamp(0.0, self.width - 1.0),
                y.clamp(0.0, self.height - 1.0),
            )
        }
    }

    fn cell(&self, id: EntityId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    pub fn population(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }
}

impl LatticeEngine for WalkerLattice {
    fn entities(&self) -> Vec<EntityId> {
        self.cells.iter().map(|c| c.id).collect()
    }

    fn kind(&self, id: EntityId) -> Option<CellKind> {
        self.cell(id).map(|c| c.kind)
    }

    fn neighbors(&self, id: EntityId) -> Vec<EntityId> {
        let Some(cell) = self.cell(id) else {
            return Vec::new();
        };
        let from = (cell.x, cell.y);
        self.cells
            .iter()
            .filter(|c| c.id != id)
            .filter(|c| {
                distance((c.x, c.y), from, self.torus, (self.width, self.height))
                    <= CONTACT_RADIUS
            })
            .map(|c| c.id)
            .collect()
    }

    fn position(&self, id: EntityId) -> Option<(f64, f64)> {
        self.cell(id).map(|c| (c.x, c.y))
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
        match placement {
            Placement::At(x, y) => {
                let (x, y) = self.wrap(x, y);
                Some(self.insert(kind, x, y))
            }
            Placement::RandomFree => self.spawn_random(kind, rng),
        }
    }

    /// One movement phase: every main agent samples a move from the Moore
    /// neighborhood, weighted by the chemical field under the candidate
    /// position (Boltzmann weighting, softened by the temperature).
    fn step(&mut self, field: &ChemicalField, rng: &mut ChaCha8Rng) {
        let movers: Vec<EntityId> = self
            .cells
            .iter()
            .filter(|c| c.kind == CellKind::Main)
            .map(|c| c.id)
            .collect();

        for id in movers {
            let Some(cell) = self.cell(id) else { continue };
            let (x, y) = (cell.x, cell.y);
            let here = field.value_at_world(x, y);

            let weights: Vec<f64> = MOVES
                .iter()
                .map(|&(dx, dy)| {
                    let (nx, ny) = self.wrap(x + dx, y + dy);
                    let gain = field.value_at_world(nx, ny) - here;
                    // Clamp the exponent so an extreme field never overflows.
                    (self.lambda_ch * gain / self.temperature).clamp(-50.0, 50.0).exp()
                })
                .collect();
            let total: f64 = weights.iter().sum();

            let mut pick = rng.gen_range(0.0..total);
            let mut chosen = 0;
            for (i, w) in weights.iter().enumerate() {
                if pick < *w {
                    chosen = i;
                    break;
                }
                pick -= w;
            }

            let (dx, dy) = MOVES[chosen];
            let (nx, ny) = self.wrap(x + dx, y + dy);
            if let Some(cell) = self.cells.iter_mut().find(|c| c.id == id) {
                cell.x = nx;
                cell.y = ny;
            }
        }
    }
}
