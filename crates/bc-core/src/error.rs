//! Core error types for Build Console RS
//!
//! Every REST failure is mapped onto [`ConsoleError`] at the transport
//! boundary so callers can translate it into a user-visible notification.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Core error type for all console operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Malformed query: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        ConsoleError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Build the error for a non-success HTTP status
    pub fn from_status(
        status: u16,
        entity: &str,
        target: &str,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        match status {
            404 => ConsoleError::not_found(entity, target),
            401 => ConsoleError::Unauthorized { message },
            403 => ConsoleError::Forbidden { message },
            409 => ConsoleError::Conflict { message },
            400 | 422 => {
                let mut errors = ValidationErrors::new();
                errors.add_base(message);
                ConsoleError::Validation(errors)
            }
            _ => ConsoleError::Http { status, message },
        }
    }

    /// HTTP status this error corresponds to, when it came from (or maps to) one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ConsoleError::NotFound { .. } => Some(404),
            ConsoleError::Unauthorized { .. } => Some(401),
            ConsoleError::Forbidden { .. } => Some(403),
            ConsoleError::Validation(_) => Some(422),
            ConsoleError::Conflict { .. } => Some(409),
            ConsoleError::Http { status, .. } => Some(*status),
            ConsoleError::Network(_)
            | ConsoleError::Decode(_)
            | ConsoleError::Query(_)
            | ConsoleError::Config(_)
            | ConsoleError::Internal(_) => None,
        }
    }

    /// "No result yet" conditions are not surfaced to the user.
    pub fn is_expected_absence(&self) -> bool {
        matches!(self, ConsoleError::NotFound { .. })
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::NotFound { .. } => "not_found",
            ConsoleError::Unauthorized { .. } => "unauthorized",
            ConsoleError::Forbidden { .. } => "forbidden",
            ConsoleError::Validation(_) => "validation_failed",
            ConsoleError::Conflict { .. } => "conflict",
            ConsoleError::Http { .. } => "http_error",
            ConsoleError::Network(_) => "network_error",
            ConsoleError::Decode(_) => "decode_error",
            ConsoleError::Query(_) => "malformed_query",
            ConsoleError::Config(_) => "configuration_error",
            ConsoleError::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Decode(err.to_string())
    }
}

impl From<ValidationErrors> for ConsoleError {
    fn from(errors: ValidationErrors) -> Self {
        ConsoleError::Validation(errors)
    }
}

/// Field-level validation messages, shown next to the offending form field
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    /// Messages keyed by form field
    pub errors: HashMap<String, Vec<String>>,
    /// Messages for the form as a whole
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        for (field, field_messages) in fields {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in errs.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", err.code));
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ConsoleError::from_status(404, "BuildRecord", "42", "missing"),
            ConsoleError::NotFound { .. }
        ));
        assert!(matches!(
            ConsoleError::from_status(401, "Product", "1", "login"),
            ConsoleError::Unauthorized { .. }
        ));
        assert!(matches!(
            ConsoleError::from_status(409, "Product", "1", "dup"),
            ConsoleError::Conflict { .. }
        ));

        let err = ConsoleError::from_status(503, "Product", "list", "down");
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.error_code(), "http_error");
    }

    #[test]
    fn test_bad_request_becomes_validation() {
        let err = ConsoleError::from_status(400, "Project", "new", "name must be unique");
        match err {
            ConsoleError::Validation(errors) => {
                assert_eq!(errors.base_errors, vec!["name must be unique".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_expected_absence() {
        assert!(ConsoleError::not_found("BuildRecord", 7).is_expected_absence());
        assert!(!ConsoleError::Network("reset".into()).is_expected_absence());
    }

    #[test]
    fn test_validation_messages_are_sorted() {
        let mut errors = ValidationErrors::new();
        errors.add("version", "must look like 1.0");
        errors.add("name", "can't be blank");
        errors.add_base("form rejected");

        assert!(errors.has_error("name"));
        assert_eq!(
            errors.full_messages(),
            vec![
                "form rejected".to_string(),
                "name can't be blank".to_string(),
                "version must look like 1.0".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("name", "too short");
        let mut b = ValidationErrors::new();
        b.add("name", "reserved");
        b.add_base("oops");

        a.merge(b);
        assert_eq!(a.get("name").map(|v| v.len()), Some(2));
        assert_eq!(a.base_errors.len(), 1);
    }
}
