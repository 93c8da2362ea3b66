//! guidetree core: domain logic shared by the persistence and API layers.
//!
//! This crate has no internal dependencies so the same logic can back the
//! API server, the repository tests, and any future CLI tooling.

pub mod authoring;
pub mod error;
pub mod graph;
pub mod token;
pub mod types;
pub mod view;
