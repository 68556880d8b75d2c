//! # bc-client
//!
//! REST access for Build Console RS.
//!
//! - [`Transport`] and its reqwest implementation
//! - [`Resource<T>`] CRUD wrappers and per-entity actions
//! - [`Paginator<T>`] with caching, in-flight sharing and change callbacks
//!
//! ```no_run
//! # async fn demo() -> bc_core::ConsoleResult<()> {
//! use bc_client::Client;
//! use bc_core::config::ConsoleConfig;
//!
//! let client = Client::new(&ConsoleConfig::from_env()?)?;
//! let pages = client.builds().paginator(client.page_request());
//! let first = pages.get(0).await?;
//! println!("{} of {} builds", first.len(), first.total_count);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod client;
pub mod paginator;
pub mod resource;
pub mod transport;

#[cfg(test)]
mod testing;

pub use actions::{BuildParameters, RebuildMode};
pub use client::Client;
pub use paginator::{PageFetcher, PageSnapshot, Paginator};
pub use resource::{Collection, Resource};
pub use transport::{HttpTransport, Transport};
