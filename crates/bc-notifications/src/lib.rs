//! # bc-notifications
//!
//! Push notifications for Build Console RS.
//!
//! ## Features
//!
//! - Normalized events decoded from `{eventType, payload}` frames
//! - Event bus with per-subscriber queues and drop-based unsubscribe
//! - Adapter pumping a push channel into the bus
//! - Helpers merging status updates into rendered rows

pub mod adapter;
pub mod bus;
pub mod merge;
pub mod message;

pub use adapter::{AdapterStats, EventBusAdapter, PushChannel};
pub use bus::{EventBus, Subscription};
pub use merge::{
    merge_or_prepend_build, merge_update, merged, push_front_bounded, LivePatch, MergeOutcome,
};
pub use message::{
    Announcement, BrewPushResult, BuildStatusUpdate, ConsoleEvent, EventError, EventKind,
    GroupBuildStatusUpdate, PushMessage, ScmRepositoryCreated,
};
