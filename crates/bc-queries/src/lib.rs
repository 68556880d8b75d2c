//! # bc-queries
//!
//! Query layer for the build console's list endpoints.
//!
//! ## Structure
//!
//! - `rsql` - fluent builder for the `q` filter parameter
//! - `filters` - data-driven filter sets rendered through the checked builder
//! - `sorts` - sort orders rendered as the `sort` parameter
//! - `presets` - filters the console uses on several pages
//!
//! ## Example
//!
//! ```
//! use bc_queries::rsql::query;
//!
//! let q = query()
//!     .field("name").like("foo%")
//!     .and()
//!     .field("status").eq("DONE")
//!     .end();
//!
//! assert_eq!(q, "name=like=foo%;status==DONE");
//! ```

pub mod rsql;
pub mod filters;
pub mod sorts;
pub mod presets;

pub use rsql::{query, Argument, Combinator, Comparison, QueryError, RsqlBuilder, Token};
pub use filters::{Filter, FilterSet};
pub use sorts::{SortCriterion, SortDirection, SortOrder};
