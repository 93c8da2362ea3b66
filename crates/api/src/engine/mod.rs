//! The tree engine: navigation (`start`/`advance`) and the surface-
//! independent editing protocol.

pub mod authoring;
pub mod navigator;
