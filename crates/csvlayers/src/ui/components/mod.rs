//! Collection of reusable TUI components.

pub mod field_selector;
pub mod file_tree;
pub mod path_prompt;
pub mod summary;
