//! Merging live updates into rendered rows
//!
//! A status event patches the row with the same id in place and is
//! ignored when no row matches. History widgets additionally prepend rows
//! for unseen entities and keep a bounded, most-recent-first window.

use bc_core::traits::{Id, Identifiable};
use bc_models::{BuildRecord, GroupBuild};

use crate::message::{BuildStatusUpdate, GroupBuildStatusUpdate};

/// A row that can absorb updates of type `U`
pub trait LivePatch<U>: Identifiable {
    /// Id of the entity `update` is about
    fn target(update: &U) -> Id;

    /// Copy the changed fields of `update` onto this row
    fn apply(&mut self, update: &U);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The row at this position was patched
    Updated(usize),
    /// No row matched
    Ignored,
}

impl MergeOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Patch the matching row in place; other rows and the order are untouched
pub fn merge_update<T, U>(rows: &mut [T], update: &U) -> MergeOutcome
where
    T: LivePatch<U>,
{
    let id = T::target(update);
    match rows.iter_mut().position(|row| row.id() == id) {
        Some(position) => {
            rows[position].apply(update);
            MergeOutcome::Updated(position)
        }
        None => {
            tracing::trace!(id, "no row for update");
            MergeOutcome::Ignored
        }
    }
}

/// Patched copy of `rows`, or `None` when no row matches
pub fn merged<T, U>(rows: &[T], update: &U) -> Option<Vec<T>>
where
    T: LivePatch<U> + Clone,
{
    let id = T::target(update);
    if !rows.iter().any(|row| row.id() == id) {
        return None;
    }
    let mut copy = rows.to_vec();
    merge_update(&mut copy, update);
    Some(copy)
}

/// Insert `item`, re-sort most-recent-first by `key` and keep at most
/// `capacity` rows. Returns the evicted rows, oldest last.
pub fn push_front_bounded<T, K, F>(rows: &mut Vec<T>, item: T, capacity: usize, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    rows.insert(0, item);
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    if rows.len() > capacity {
        rows.split_off(capacity)
    } else {
        Vec::new()
    }
}

/// History-widget merge: patch a known build, or prepend an unseen one
pub fn merge_or_prepend_build(
    rows: &mut Vec<BuildRecord>,
    update: &BuildStatusUpdate,
    capacity: usize,
) -> MergeOutcome {
    match merge_update(rows, update) {
        MergeOutcome::Ignored => {
            push_front_bounded(rows, update.clone().into_build_record(), capacity, |b| {
                b.submit_time
            });
            match rows.iter().position(|b| b.id == update.id) {
                Some(position) => MergeOutcome::Updated(position),
                // older than everything in a full window
                None => MergeOutcome::Ignored,
            }
        }
        updated => updated,
    }
}

impl LivePatch<BuildStatusUpdate> for BuildRecord {
    fn target(update: &BuildStatusUpdate) -> Id {
        update.id
    }

    fn apply(&mut self, update: &BuildStatusUpdate) {
        self.status = update.status;
        if update.build_configuration_id.is_some() {
            self.build_configuration_id = update.build_configuration_id;
        }
        if let Some(name) = &update.build_configuration_name {
            self.build_configuration_name = Some(name.clone());
        }
        if let Some(username) = &update.username {
            self.username = Some(username.clone());
        }
        self.submit_time = update.submit_time.or(self.submit_time);
        self.start_time = update.start_time.or(self.start_time);
        self.end_time = update.end_time.or(self.end_time);
        self.group_build_id = update.group_build_id.or(self.group_build_id);
    }
}

impl LivePatch<GroupBuildStatusUpdate> for GroupBuild {
    fn target(update: &GroupBuildStatusUpdate) -> Id {
        update.id
    }

    fn apply(&mut self, update: &GroupBuildStatusUpdate) {
        self.status = update.status;
        self.group_configuration_id = update.group_configuration_id.or(self.group_configuration_id);
        self.start_time = update.start_time.or(self.start_time);
        self.end_time = update.end_time.or(self.end_time);
    }
}
