pub mod config;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod graph;
pub mod legisgraph;
pub mod resolution;
pub mod sources;
pub mod types;
