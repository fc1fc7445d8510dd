//! Interface to the external lattice/agent substrate.
//!
//! The foraging core never touches pixels or copy attempts; it drives the
//! substrate through this narrow query/command surface and is invoked back
//! once per simulated step through [`StepObserver`].

use rand_chacha::ChaCha8Rng;

use crate::model::chemical::ChemicalField;

pub type EntityId = u32;

/// Non-background entity categories. The numeric index matches the
/// per-kind constraint arrays in the configuration (0 is background).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Food,
    Main,
}

impl CellKind {
    pub fn index(self) -> usize {
        match self {
            CellKind::Food => 1,
            CellKind::Main => 2,
        }
    }
}

/// Where a newly spawned entity lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    At(f64, f64),
    RandomFree,
}

/// Query/command surface the core needs from the lattice engine.
///
/// Lookups return `Option` because entity removal ordering within a step
/// can logically race with the consumption scan; a `None` is benign and
/// the caller skips it.
pub trait LatticeEngine {
    /// Identifiers of all live entities.
    fn entities(&self) -> Vec<EntityId>;

    fn kind(&self, id: EntityId) -> Option<CellKind>;

    /// Entities adjacent (in contact) with `id`.
    fn neighbors(&self, id: EntityId) -> Vec<EntityId>;

    /// Torus-corrected centroid at full lattice resolution.
    fn position(&self, id: EntityId) -> Option<(f64, f64)>;

    /// Removes an entity. Removing an unknown id is a no-op.
    fn kill(&mut self, id: EntityId);

    /// Creates an entity, returning its id, or `None` if no free position
    /// could be found. Random placements draw from the shared seeded source.
    fn spawn(
        &mut self,
        kind: CellKind,
        placement: Placement,
        rng: &mut ChaCha8Rng,
    ) -> Option<EntityId>;

    /// Runs one substrate step (the stochastic movement phase), sensing the
    /// chemical field and drawing from the shared seeded source.
    fn step(&mut self, field: &ChemicalField, rng: &mut ChaCha8Rng);
}

/// After-step hook registered by the foraging core. The run driver invokes
/// it exactly once per simulated step, after the engine's own step.
pub trait StepObserver<E: LatticeEngine> {
    fn on_after_step(&mut self, engine: &mut E);
}

/// Positions of all live entities of one kind. Shared helper for the
/// consumption scan, the field advance and the nearest-food query.
pub fn positions_of_kind<E: LatticeEngine>(engine: &E, kind: CellKind) -> Vec<(f64, f64)> {
    engine
        .entities()
        .into_iter()
        .filter(|&id| engine.kind(id) == Some(kind))
        .filter_map(|id| engine.position(id))
        .collect()
}
