//! Scheme side-file persistence: discovery, codec, deterministic paths.

pub mod repo;
pub mod xml;

pub use repo::SchemeRepo;
