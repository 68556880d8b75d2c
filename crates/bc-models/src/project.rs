//! Project model
//!
//! Endpoint: /projects

use bc_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An upstream project whose sources are built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub issue_tracker_url: Option<String>,
}

impl Identifiable for Project {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for Project {
    const RESOURCE_PATH: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

/// Form input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[validate(length(min = 1, max = 255, message = "can't be blank or longer than 255 characters"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(url(message = "must be a valid URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,

    #[validate(url(message = "must be a valid URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_tracker_url: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            project_url: None,
            issue_tracker_url: None,
        }
    }

    pub fn project_url(mut self, url: impl Into<String>) -> Self {
        self.project_url = Some(url.into());
        self
    }
}
