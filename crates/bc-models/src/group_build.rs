//! Group build model
//!
//! Endpoint: /group-builds

use bc_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::BuildStatus;

/// One execution of a group configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBuild {
    pub id: Id,

    #[serde(default)]
    pub status: BuildStatus,

    #[serde(default)]
    pub group_configuration_id: Option<Id>,

    #[serde(default)]
    pub group_configuration_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl Identifiable for GroupBuild {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for GroupBuild {
    const RESOURCE_PATH: &'static str = "group-builds";
    const TYPE_NAME: &'static str = "GroupBuild";
}

impl GroupBuild {
    pub fn new(id: Id, status: BuildStatus) -> Self {
        Self {
            id,
            status,
            group_configuration_id: None,
            group_configuration_name: None,
            username: None,
            start_time: None,
            end_time: None,
        }
    }
}
