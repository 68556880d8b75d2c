//! # bc-models
//!
//! Typed entity models for the build platform's REST API.
//!
//! Each model implements the core traits from `bc-core` (Entity, Identifiable)
//! so the generic resource wrapper and paginator can work with it.

pub use bc_core::traits::{Entity, Id, Identifiable, Timestamped};

pub mod status;
pub mod product;
pub mod product_version;
pub mod project;
pub mod build_configuration;
pub mod group_configuration;
pub mod build_record;
pub mod group_build;
pub mod artifact;

// Re-exports for convenience
pub use status::BuildStatus;
pub use product::{NewProduct, Product};
pub use product_version::{NewProductVersion, ProductVersion};
pub use project::{NewProject, Project};
pub use build_configuration::{BuildConfiguration, NewBuildConfiguration};
pub use group_configuration::GroupConfiguration;
pub use build_record::BuildRecord;
pub use group_build::GroupBuild;
pub use artifact::{Artifact, ArtifactQuality};
