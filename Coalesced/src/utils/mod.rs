//! Utility functions

pub mod path;

pub use path::{entry_output_path, normalize_entry_path, relative_entry_path};
