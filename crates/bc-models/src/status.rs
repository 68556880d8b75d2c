//! Build status shared by build records and group builds

use serde::{Deserialize, Serialize};

/// Lifecycle state of a build or group build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    #[default]
    New,
    Enqueued,
    WaitingForDependencies,
    Building,
    Success,
    Failed,
    NoRebuildRequired,
    Rejected,
    RejectedFailedDependencies,
    Cancelled,
    SystemError,
    /// Any status this client does not know yet
    #[serde(other)]
    Unknown,
}

impl BuildStatus {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Enqueued => "ENQUEUED",
            Self::WaitingForDependencies => "WAITING_FOR_DEPENDENCIES",
            Self::Building => "BUILDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::NoRebuildRequired => "NO_REBUILD_REQUIRED",
            Self::Rejected => "REJECTED",
            Self::RejectedFailedDependencies => "REJECTED_FAILED_DEPENDENCIES",
            Self::Cancelled => "CANCELLED",
            Self::SystemError => "SYSTEM_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// No further transitions happen from a final status
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Failed
                | Self::NoRebuildRequired
                | Self::Rejected
                | Self::RejectedFailedDependencies
                | Self::Cancelled
                | Self::SystemError
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Self::New | Self::Enqueued | Self::WaitingForDependencies | Self::Building
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::NoRebuildRequired)
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let status: BuildStatus = serde_json::from_str("\"WAITING_FOR_DEPENDENCIES\"").unwrap();
        assert_eq!(status, BuildStatus::WaitingForDependencies);
        assert_eq!(
            serde_json::to_string(&BuildStatus::NoRebuildRequired).unwrap(),
            "\"NO_REBUILD_REQUIRED\""
        );
    }

    #[test]
    fn test_unknown_status() {
        let status: BuildStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(status, BuildStatus::Unknown);
        assert!(!status.is_final());
        assert!(!status.is_running());
    }

    #[test]
    fn test_final_and_running_are_disjoint() {
        for status in [
            BuildStatus::New,
            BuildStatus::Building,
            BuildStatus::Success,
            BuildStatus::Cancelled,
            BuildStatus::SystemError,
        ] {
            assert!(!(status.is_final() && status.is_running()), "{}", status);
        }
        assert!(BuildStatus::NoRebuildRequired.is_success());
    }
}
