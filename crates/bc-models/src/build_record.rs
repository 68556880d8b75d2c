//! Build record model
//!
//! Endpoint: /builds

use bc_core::traits::{Entity, Id, Identifiable, Timestamped};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::BuildStatus;

/// One execution of a build configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub id: Id,

    #[serde(default)]
    pub status: BuildStatus,

    #[serde(default)]
    pub build_configuration_id: Option<Id>,

    #[serde(default)]
    pub build_configuration_name: Option<String>,

    /// Who submitted the build
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub submit_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub group_build_id: Option<Id>,
}

impl Identifiable for BuildRecord {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for BuildRecord {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.submit_time
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.end_time.or(self.start_time)
    }
}

impl Entity for BuildRecord {
    const RESOURCE_PATH: &'static str = "builds";
    const TYPE_NAME: &'static str = "BuildRecord";
}

impl BuildRecord {
    pub fn new(id: Id, status: BuildStatus) -> Self {
        Self {
            id,
            status,
            build_configuration_id: None,
            build_configuration_name: None,
            username: None,
            submit_time: None,
            start_time: None,
            end_time: None,
            group_build_id: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Wall-clock duration once the build has started
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_record_from_json() {
        let build: BuildRecord = serde_json::from_value(serde_json::json!({
            "id": 42,
            "status": "BUILDING",
            "buildConfigurationId": 100,
            "buildConfigurationName": "infinispan-13.0",
            "username": "jdoe",
            "submitTime": "2024-03-01T10:00:00Z",
            "startTime": "2024-03-01T10:01:00Z"
        }))
        .unwrap();

        assert_eq!(build.id(), 42);
        assert!(build.is_running());
        assert!(build.duration().is_none());
        assert_eq!(BuildRecord::member_path(build.id), "builds/42");
    }

    #[test]
    fn test_duration() {
        let mut build = BuildRecord::new(1, BuildStatus::Success);
        build.start_time = "2024-03-01T10:00:00Z".parse().ok();
        build.end_time = "2024-03-01T10:05:30Z".parse().ok();
        assert_eq!(build.duration().map(|d| d.num_seconds()), Some(330));
    }
}
