//! Infrastructure adapters for files, config, logging and layer output.

pub mod config;
pub mod header;
pub mod layer;
pub mod logging;
pub mod notify;
pub mod project;
