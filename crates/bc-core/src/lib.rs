//! # bc-core
//!
//! Core types, traits, and utilities for Build Console RS.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases
//! - Core traits (Entity, Identifiable, Timestamped)
//! - Page types and page requests
//! - Listener registry for change callbacks
//! - Configuration and local preferences

pub mod error;
pub mod result;
pub mod traits;
pub mod pagination;
pub mod listeners;
pub mod config;
pub mod preferences;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use pagination::*;
pub use listeners::{ListenerGuard, Listeners};
