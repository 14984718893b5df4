//! xcgraph - a structural editor for IDE project-description documents
//!
//! This crate provides the core library functionality for xcgraph:
//! the project graph model, its JSON persistence, scheme side files,
//! and the high-level operations the CLI exposes.

pub mod core;
pub mod ops;
pub mod scheme;
pub mod store;
pub mod util;

pub use core::{
    config::ConfigurationList, error::GraphError, group::Group, project::ProjectGraph,
    scheme::Scheme, target::Target,
};

pub use ops::Report;
pub use util::Config;
