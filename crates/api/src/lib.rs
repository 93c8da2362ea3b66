//! guidetree API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes, the
//! navigation/authoring engine, and the chat surface) so integration tests
//! and the binary entrypoint can both access them.

pub mod chat;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
