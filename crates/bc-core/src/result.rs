//! Result type aliases and helpers for expected absence

use crate::error::ConsoleError;

/// Standard Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Turns "not found" into `Ok(None)`.
///
/// A 404 on a lookup usually means "no result yet" (a build that has not
/// produced artifacts, a version without a milestone). It is logged at info
/// level and not treated as a failure.
pub trait OptionalExt<T> {
    fn optional(self) -> ConsoleResult<Option<T>>;
}

impl<T> OptionalExt<T> for ConsoleResult<T> {
    fn optional(self) -> ConsoleResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_expected_absence() => {
                tracing::info!(error = %err, "no result yet");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional() {
        let found: ConsoleResult<i32> = Ok(3);
        assert_eq!(found.optional().unwrap(), Some(3));

        let missing: ConsoleResult<i32> = Err(ConsoleError::not_found("BuildRecord", 1));
        assert_eq!(missing.optional().unwrap(), None);

        let failed: ConsoleResult<i32> = Err(ConsoleError::Network("refused".into()));
        assert!(failed.optional().is_err());
    }
}
