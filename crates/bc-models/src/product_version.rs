//! Product version model
//!
//! Endpoint: /product-versions

use std::borrow::Cow;
use std::sync::LazyLock;

use bc_core::traits::{Entity, Id, Identifiable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// `<major>.<minor>`
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("valid version pattern"));

/// A version of a product; build configurations are grouped under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVersion {
    pub id: Id,

    /// `<major>.<minor>`, e.g. `7.4`
    pub version: String,

    pub product_id: Id,

    #[serde(default)]
    pub current_milestone_id: Option<Id>,

    #[serde(default)]
    pub build_configuration_ids: Vec<Id>,
}

impl Identifiable for ProductVersion {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for ProductVersion {
    const RESOURCE_PATH: &'static str = "product-versions";
    const TYPE_NAME: &'static str = "ProductVersion";
}

fn validate_version(version: &str) -> Result<(), ValidationError> {
    if VERSION_PATTERN.is_match(version) {
        Ok(())
    } else {
        let mut error = ValidationError::new("version_format");
        error.message = Some(Cow::Borrowed("must look like <major>.<minor>, e.g. 1.0"));
        Err(error)
    }
}

/// Form input for creating a product version
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProductVersion {
    #[validate(custom = "validate_version")]
    pub version: String,

    pub product_id: Id,
}

impl NewProductVersion {
    pub fn new(product_id: Id, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            product_id,
        }
    }
}
