//! Artifact model
//!
//! Endpoint: /artifacts

use bc_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};

/// Curation state of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactQuality {
    #[default]
    New,
    Verified,
    Tested,
    Deprecated,
    Blacklisted,
    Temporary,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl ArtifactQuality {
    /// Blacklisted and deleted artifacts must not be consumed by new builds
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Blacklisted | Self::Deleted | Self::Unknown)
    }
}

/// A file produced or consumed by a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: Id,

    /// Repository coordinates, e.g. `org.acme:core:jar:1.0`
    pub identifier: String,

    #[serde(default)]
    pub md5: Option<String>,

    #[serde(default)]
    pub sha256: Option<String>,

    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub build_record_id: Option<Id>,

    #[serde(default)]
    pub artifact_quality: ArtifactQuality,
}

impl Identifiable for Artifact {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for Artifact {
    const RESOURCE_PATH: &'static str = "artifacts";
    const TYPE_NAME: &'static str = "Artifact";
}
