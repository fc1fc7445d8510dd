pub mod chemical;
pub mod config;
pub mod controller;
pub mod engine;
pub mod food;
pub mod lattice;
pub mod livelihood;
pub mod runner;
pub mod summary;
