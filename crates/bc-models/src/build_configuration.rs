//! Build configuration model
//!
//! Endpoint: /build-configurations

use std::borrow::Cow;
use std::sync::LazyLock;

use bc_core::traits::{Entity, Id, Identifiable, Timestamped};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Letters, digits, dots, dashes and underscores; no leading dash
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.][A-Za-z0-9_.\-]*$").expect("valid name pattern"));

/// How to build one project revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    pub id: Id,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub build_script: String,

    #[serde(default)]
    pub scm_revision: Option<String>,

    pub project_id: Id,

    #[serde(default)]
    pub environment_id: Option<Id>,

    #[serde(default)]
    pub product_version_id: Option<Id>,

    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub modification_time: Option<DateTime<Utc>>,

    /// Archived configurations are hidden from lists and cannot be built
    #[serde(default)]
    pub archived: bool,
}

impl Identifiable for BuildConfiguration {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for BuildConfiguration {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.modification_time
    }
}

impl Entity for BuildConfiguration {
    const RESOURCE_PATH: &'static str = "build-configurations";
    const TYPE_NAME: &'static str = "BuildConfiguration";
}

impl BuildConfiguration {
    pub fn is_buildable(&self) -> bool {
        !self.archived
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if NAME_PATTERN.is_match(name) && !name.ends_with(".git") {
        Ok(())
    } else {
        let mut error = ValidationError::new("name_format");
        error.message = Some(Cow::Borrowed(
            "may only contain letters, digits, '.', '-' and '_' and must not end in .git",
        ));
        Err(error)
    }
}

/// Form input for creating a build configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBuildConfiguration {
    #[validate(
        length(min = 1, max = 255, message = "can't be blank or longer than 255 characters"),
        custom = "validate_name"
    )]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "can't be blank"))]
    pub build_script: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_revision: Option<String>,

    pub project_id: Id,

    pub environment_id: Id,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_version_id: Option<Id>,
}

impl NewBuildConfiguration {
    pub fn new(
        name: impl Into<String>,
        project_id: Id,
        environment_id: Id,
        build_script: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            build_script: build_script.into(),
            scm_revision: None,
            project_id,
            environment_id,
            product_version_id: None,
        }
    }
}
