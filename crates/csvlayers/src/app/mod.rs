//! Application layer driving the picker tree and hierarchy rebuild.

pub mod fields;
pub mod paths;
pub mod reconstruct;
pub mod scan;
pub mod selection;
pub mod tree;
pub mod workflow;
