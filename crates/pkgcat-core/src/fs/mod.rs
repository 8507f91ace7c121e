//! Filesystem primitives shared across features.

pub mod tree;

pub use tree::{copy_tree, replace_dir};
