//! Core traits shared by the entity models and the REST client

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Primary key type used by the build platform
pub type Id = i64;

/// Trait for entities that carry a server-assigned id
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Trait for entities with creation/modification timestamps
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Base trait for all REST-backed entities
pub trait Entity:
    Identifiable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Collection path relative to the API base URL (e.g. `builds`)
    const RESOURCE_PATH: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;

    /// Path of a single member
    fn member_path(id: Id) -> String {
        format!("{}/{}", Self::RESOURCE_PATH, id)
    }
}
