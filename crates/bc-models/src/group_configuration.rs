//! Group configuration model
//!
//! Endpoint: /group-configurations

use bc_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};

/// A named set of build configurations built together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfiguration {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub product_version_id: Option<Id>,
    #[serde(default)]
    pub build_configuration_ids: Vec<Id>,
}

impl Identifiable for GroupConfiguration {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for GroupConfiguration {
    const RESOURCE_PATH: &'static str = "group-configurations";
    const TYPE_NAME: &'static str = "GroupConfiguration";
}
