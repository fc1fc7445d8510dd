//! Chemotactic foraging simulation core.
//!
//! An agent forages on a 2D lattice for discrete food sources, guided by a
//! diffusing chemical attractant secreted at food positions. This crate
//! owns the foraging lifecycle (livelihood, consumption, respawn, chemical
//! field); the lattice substrate is reached through the
//! [`model::engine::LatticeEngine`] trait.

pub mod model;

pub use model::config::ForagingConfig;
pub use model::runner::ForagingRun;
pub use model::summary::RunSummary;
