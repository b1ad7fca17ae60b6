//! Terminal dialog for picking files and coordinate fields.

pub mod app;
pub mod components;
