//! Filters shared by several console pages

use bc_core::traits::Id;
use bc_models::BuildStatus;

use crate::rsql::query;

const RUNNING: [BuildStatus; 4] = [
    BuildStatus::New,
    BuildStatus::Enqueued,
    BuildStatus::WaitingForDependencies,
    BuildStatus::Building,
];

/// Builds that have not reached a final status
pub fn running_builds() -> String {
    query().field("status").in_list(RUNNING).end()
}

/// Builds of one build configuration
pub fn builds_of_configuration(build_configuration_id: Id) -> String {
    query()
        .field("buildConfigurationId")
        .eq(build_configuration_id)
        .end()
}

/// Running builds submitted by `username`
pub fn running_builds_of(username: &str) -> String {
    query()
        .field("username")
        .eq(username)
        .and()
        .field("status")
        .in_list(RUNNING)
        .end()
}

/// Substring match on `name`, as typed into a list's search box
pub fn name_like(text: &str) -> String {
    query().field("name").like(format!("%{}%", text)).end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_builds() {
        assert_eq!(
            running_builds(),
            "status=in=(NEW,ENQUEUED,WAITING_FOR_DEPENDENCIES,BUILDING)"
        );
    }

    #[test]
    fn test_builds_of_configuration() {
        assert_eq!(builds_of_configuration(100), "buildConfigurationId==100");
    }

    #[test]
    fn test_running_builds_of() {
        assert_eq!(
            running_builds_of("jdoe"),
            "username==jdoe;status=in=(NEW,ENQUEUED,WAITING_FOR_DEPENDENCIES,BUILDING)"
        );
    }

    #[test]
    fn test_name_like_quotes_spaces() {
        assert_eq!(name_like("data grid"), "name=like=\"%data grid%\"");
    }
}
