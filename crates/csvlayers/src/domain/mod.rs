//! Core domain types: the checkable picker tree and the output hierarchy.

pub mod errors;
pub mod model;
pub mod ports;
pub mod tree;
