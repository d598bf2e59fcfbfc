//! Hybrid retrieval against the managed search backend.

pub mod hybrid;

pub use hybrid::HybridSearchClient;
