//! Core data model: the in-memory project graph and its entity kinds.

pub mod config;
pub mod error;
pub mod group;
pub mod package;
pub mod phase;
pub mod project;
pub mod scheme;
pub mod target;

pub use config::{BuildConfiguration, ConfigurationList};
pub use error::GraphError;
pub use group::{FileReference, Group, GroupChild, SyncedFolder};
pub use package::{PackageReference, ProductDependency, VersionRule};
pub use phase::{BuildFile, BuildPhase};
pub use project::{ObjectId, ProjectGraph};
pub use scheme::{Scheme, SchemeAction};
pub use target::{ProductType, Target, TargetDependency};
