//! Blob access and file-tree shaping.

pub mod blob;
pub mod hierarchy;
