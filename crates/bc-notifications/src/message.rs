//! Push messages and the normalized events built from them
//!
//! The socket delivers `{ "eventType": "...", "payload": { ... } }` frames.
//! Listeners only ever see [`ConsoleEvent`], never the wire shape.

use bc_core::traits::Id;
use bc_models::{BuildRecord, BuildStatus, GroupBuild};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw frame from the notification socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub event_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl PushMessage {
    pub fn parse(frame: &str) -> Result<Self, EventError> {
        serde_json::from_str(frame).map_err(|e| EventError::Frame(e.to_string()))
    }
}

/// Event types the console reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BuildStatusChanged,
    GroupBuildStatusChanged,
    BrewPushResult,
    ScmRepositoryCreated,
    MaintenanceModeOn,
    MaintenanceModeOff,
    Announcement,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        Self::BuildStatusChanged,
        Self::GroupBuildStatusChanged,
        Self::BrewPushResult,
        Self::ScmRepositoryCreated,
        Self::MaintenanceModeOn,
        Self::MaintenanceModeOff,
        Self::Announcement,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuildStatusChanged => "BUILD_STATUS_CHANGED",
            Self::GroupBuildStatusChanged => "GROUP_BUILD_STATUS_CHANGED",
            Self::BrewPushResult => "BREW_PUSH_RESULT",
            Self::ScmRepositoryCreated => "SCM_REPOSITORY_CREATION_SUCCESS",
            Self::MaintenanceModeOn => "MAINTENANCE_MODE_ON",
            Self::MaintenanceModeOff => "MAINTENANCE_MODE_OFF",
            Self::Announcement => "NEW_ANNOUNCEMENT",
        }
    }

    pub fn parse(event_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == event_type)
    }
}

/// Status change of a single build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusUpdate {
    pub id: Id,
    pub status: BuildStatus,
    #[serde(default)]
    pub old_status: Option<BuildStatus>,
    #[serde(default)]
    pub build_configuration_id: Option<Id>,
    #[serde(default)]
    pub build_configuration_name: Option<String>,
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

impl BuildStatusUpdate {
    pub fn new(id: Id, status: BuildStatus) -> Self {
        Self {
            id,
            status,
            old_status: None,
            build_configuration_id: None,
            build_configuration_name: None,
            username: None,
            submit_time: None,
            start_time: None,
            end_time: None,
            group_build_id: None,
        }
    }

    /// Row for a build the list has not seen yet
    pub fn into_build_record(self) -> BuildRecord {
        BuildRecord {
            id: self.id,
            status: self.status,
            build_configuration_id: self.build_configuration_id,
            build_configuration_name: self.build_configuration_name,
            username: self.username,
            submit_time: self.submit_time,
            start_time: self.start_time,
            end_time: self.end_time,
            group_build_id: self.group_build_id,
        }
    }
}

/// Status change of a group build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBuildStatusUpdate {
    pub id: Id,
    pub status: BuildStatus,
    #[serde(default)]
    pub group_configuration_id: Option<Id>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl GroupBuildStatusUpdate {
    pub fn into_group_build(self) -> GroupBuild {
        let mut build = GroupBuild::new(self.id, self.status);
        build.group_configuration_id = self.group_configuration_id;
        build.start_time = self.start_time;
        build.end_time = self.end_time;
        build
    }
}

/// Outcome of pushing a build to Brew
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrewPushResult {
    pub build_id: Id,
    pub status: String,
    #[serde(default)]
    pub brew_build_id: Option<i64>,
    #[serde(default)]
    pub brew_build_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// An internal SCM repository was created for a build configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScmRepositoryCreated {
    pub repository_id: Id,
    pub internal_url: String,
    #[serde(default)]
    pub build_configuration_id: Option<Id>,
    #[serde(default)]
    pub task_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub banner: String,
    #[serde(default)]
    pub eta: Option<String>,
}

/// Normalized event delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    BuildStatusChanged(BuildStatusUpdate),
    GroupBuildStatusChanged(GroupBuildStatusUpdate),
    BrewPushResult(BrewPushResult),
    ScmRepositoryCreated(ScmRepositoryCreated),
    MaintenanceModeOn,
    MaintenanceModeOff,
    Announcement(Announcement),
}

/// Why a frame produced no event
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("unrecognized event type {0}")]
    Unrecognized(String),

    #[error("bad {event_type} payload: {message}")]
    Payload { event_type: String, message: String },
}

impl ConsoleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BuildStatusChanged(_) => EventKind::BuildStatusChanged,
            Self::GroupBuildStatusChanged(_) => EventKind::GroupBuildStatusChanged,
            Self::BrewPushResult(_) => EventKind::BrewPushResult,
            Self::ScmRepositoryCreated(_) => EventKind::ScmRepositoryCreated,
            Self::MaintenanceModeOn => EventKind::MaintenanceModeOn,
            Self::MaintenanceModeOff => EventKind::MaintenanceModeOff,
            Self::Announcement(_) => EventKind::Announcement,
        }
    }

    pub fn from_message(message: PushMessage) -> Result<Self, EventError> {
        let Some(kind) = EventKind::parse(&message.event_type) else {
            return Err(EventError::Unrecognized(message.event_type));
        };

        let payload = message.payload;
        let bad_payload = |e: serde_json::Error| EventError::Payload {
            event_type: kind.as_str().to_string(),
            message: e.to_string(),
        };

        Ok(match kind {
            EventKind::BuildStatusChanged => {
                Self::BuildStatusChanged(serde_json::from_value(payload).map_err(bad_payload)?)
            }
            EventKind::GroupBuildStatusChanged => {
                Self::GroupBuildStatusChanged(serde_json::from_value(payload).map_err(bad_payload)?)
            }
            EventKind::BrewPushResult => {
                Self::BrewPushResult(serde_json::from_value(payload).map_err(bad_payload)?)
            }
            EventKind::ScmRepositoryCreated => {
                Self::ScmRepositoryCreated(serde_json::from_value(payload).map_err(bad_payload)?)
            }
            EventKind::MaintenanceModeOn => Self::MaintenanceModeOn,
            EventKind::MaintenanceModeOff => Self::MaintenanceModeOff,
            EventKind::Announcement => {
                Self::Announcement(serde_json::from_value(payload).map_err(bad_payload)?)
            }
        })
    }

    /// Parse a raw socket frame
    pub fn from_frame(frame: &str) -> Result<Self, EventError> {
        Self::from_message(PushMessage::parse(frame)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status_frame() {
        let event = ConsoleEvent::from_frame(
            r#"{"eventType":"BUILD_STATUS_CHANGED","payload":{"id":42,"status":"SUCCESS","oldStatus":"BUILDING"}}"#,
        )
        .unwrap();

        let mut expected = BuildStatusUpdate::new(42, BuildStatus::Success);
        expected.old_status = Some(BuildStatus::Building);
        assert_eq!(event, ConsoleEvent::BuildStatusChanged(expected));
        assert_eq!(event.kind(), EventKind::BuildStatusChanged);
    }

    #[test]
    fn test_maintenance_needs_no_payload() {
        let event = ConsoleEvent::from_frame(r#"{"eventType":"MAINTENANCE_MODE_ON"}"#).unwrap();
        assert_eq!(event, ConsoleEvent::MaintenanceModeOn);
    }

    #[test]
    fn test_unrecognized_and_bad_frames() {
        assert_eq!(
            ConsoleEvent::from_frame(r#"{"eventType":"USER_LOGGED_IN","payload":{}}"#),
            Err(EventError::Unrecognized("USER_LOGGED_IN".into()))
        );
        assert!(matches!(
            ConsoleEvent::from_frame(
                r#"{"eventType":"BUILD_STATUS_CHANGED","payload":{"status":"SUCCESS"}}"#
            ),
            Err(EventError::Payload { .. })
        ));
        assert!(matches!(
            ConsoleEvent::from_frame("not json"),
            Err(EventError::Frame(_))
        ));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("build_status_changed"), None);
    }

    #[test]
    fn test_into_build_record() {
        let mut update = BuildStatusUpdate::new(7, BuildStatus::Enqueued);
        update.username = Some("jdoe".into());
        let record = update.into_build_record();
        assert_eq!(record.id, 7);
        assert!(record.is_running());
        assert_eq!(record.username.as_deref(), Some("jdoe"));
    }
}
