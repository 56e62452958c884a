//! Optimistic-update tracking for client-side field edits.
//!
//! Each edit is an explicit state machine: the new value is applied locally
//! right away (`Pending`), then either `Confirmed` when the guarded update
//! succeeds or `Reverted` when it fails. A reverted edit exposes the previous
//! value and flags that authoritative state must be re-fetched. Edits to
//! different fields are independent machines; there is no queueing or
//! coalescing.

use std::collections::HashMap;
use thiserror::Error;

/// Lifecycle of a single optimistic edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    /// Applied locally, round trip still in flight.
    Pending,
    /// The mutation succeeded; the applied value is authoritative.
    Confirmed,
    /// The mutation failed; the previous value is back in effect and a
    /// resync is required.
    Reverted,
}

/// Error type for invalid edit-state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Edit already resolved as {0:?}")]
    AlreadyResolved(EditPhase),
}

/// One optimistic field edit.
#[derive(Debug, Clone)]
pub struct FieldEdit<T> {
    pub field: String,
    previous: T,
    applied: T,
    phase: EditPhase,
}

impl<T: Clone> FieldEdit<T> {
    /// Begins an edit: the applied value takes effect immediately.
    pub fn begin(field: impl Into<String>, previous: T, applied: T) -> Self {
        Self {
            field: field.into(),
            previous,
            applied,
            phase: EditPhase::Pending,
        }
    }

    /// The value currently shown: the applied value unless the edit was
    /// reverted.
    pub fn current(&self) -> &T {
        match self.phase {
            EditPhase::Reverted => &self.previous,
            _ => &self.applied,
        }
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Resolves the edit as successful.
    pub fn confirm(&mut self) -> Result<(), EditError> {
        match self.phase {
            EditPhase::Pending => {
                self.phase = EditPhase::Confirmed;
                Ok(())
            }
            resolved => Err(EditError::AlreadyResolved(resolved)),
        }
    }

    /// Resolves the edit as failed, restoring the previous value.
    ///
    /// Returns the restored value; the caller must re-fetch authoritative
    /// state afterwards (`needs_resync` stays true).
    pub fn revert(&mut self) -> Result<&T, EditError> {
        match self.phase {
            EditPhase::Pending => {
                self.phase = EditPhase::Reverted;
                Ok(&self.previous)
            }
            resolved => Err(EditError::AlreadyResolved(resolved)),
        }
    }

    /// Whether authoritative state must be re-fetched.
    pub fn needs_resync(&self) -> bool {
        self.phase == EditPhase::Reverted
    }
}

/// Tracks in-flight edits for one case, keyed by field name.
///
/// Concurrent edits to different fields are independent round trips, each
/// optimistically applied and independently reconciled.
#[derive(Debug, Default)]
pub struct EditTracker<T> {
    edits: HashMap<String, FieldEdit<T>>,
}

impl<T: Clone> EditTracker<T> {
    pub fn new() -> Self {
        Self {
            edits: HashMap::new(),
        }
    }

    /// Starts tracking an edit; a newer edit to the same field replaces the
    /// older one (last write wins on local state).
    pub fn apply(&mut self, field: impl Into<String>, previous: T, applied: T) {
        let field = field.into();
        self.edits
            .insert(field.clone(), FieldEdit::begin(field, previous, applied));
    }

    /// Resolves the edit for `field` as confirmed.
    pub fn confirm(&mut self, field: &str) -> Result<(), EditError> {
        match self.edits.get_mut(field) {
            Some(edit) => edit.confirm(),
            None => Ok(()), // superseded or never tracked; nothing to resolve
        }
    }

    /// Resolves the edit for `field` as failed; returns the value to restore.
    pub fn revert(&mut self, field: &str) -> Result<Option<T>, EditError> {
        match self.edits.get_mut(field) {
            Some(edit) => edit.revert().map(|v| Some(v.clone())),
            None => Ok(None),
        }
    }

    /// The locally visible value for `field`, if an edit is tracked.
    pub fn current(&self, field: &str) -> Option<&T> {
        self.edits.get(field).map(|e| e.current())
    }

    /// Whether any edit requires a re-fetch of authoritative state.
    pub fn needs_resync(&self) -> bool {
        self.edits.values().any(|e| e.needs_resync())
    }

    /// Drops resolved edits, typically after a resync has completed.
    pub fn clear_resolved(&mut self) {
        self.edits.retain(|_, e| e.phase() == EditPhase::Pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_edit_shows_applied_value() {
        let edit = FieldEdit::begin("handler_note", "old".to_string(), "new".to_string());
        assert_eq!(edit.phase(), EditPhase::Pending);
        assert_eq!(edit.current().as_str(), "new");
        assert!(!edit.needs_resync());
    }

    #[test]
    fn test_confirm_keeps_applied_value() {
        let mut edit = FieldEdit::begin("raknad_pa", "false".to_string(), "true".to_string());
        edit.confirm().unwrap();
        assert_eq!(edit.phase(), EditPhase::Confirmed);
        assert_eq!(edit.current().as_str(), "true");
        assert!(!edit.needs_resync());
    }

    #[test]
    fn test_revert_restores_previous_and_flags_resync() {
        let mut edit = FieldEdit::begin("raknad_pa", "false".to_string(), "true".to_string());
        let restored = edit.revert().unwrap().clone();
        assert_eq!(restored, "false");
        assert_eq!(edit.current().as_str(), "false");
        assert!(edit.needs_resync());
    }

    #[test]
    fn test_double_resolution_is_rejected() {
        let mut edit = FieldEdit::begin("field", 1, 2);
        edit.confirm().unwrap();
        assert_eq!(
            edit.confirm(),
            Err(EditError::AlreadyResolved(EditPhase::Confirmed))
        );
        assert_eq!(
            edit.revert().unwrap_err(),
            EditError::AlreadyResolved(EditPhase::Confirmed)
        );
    }

    #[test]
    fn test_tracker_independent_fields() {
        let mut tracker = EditTracker::new();
        tracker.apply("insurance_status", "pending".to_string(), "approved".to_string());
        tracker.apply("photo_inspection_done", "false".to_string(), "true".to_string());

        tracker.confirm("insurance_status").unwrap();
        tracker.revert("photo_inspection_done").unwrap();

        assert_eq!(
            tracker.current("insurance_status"),
            Some(&"approved".to_string())
        );
        assert_eq!(
            tracker.current("photo_inspection_done"),
            Some(&"false".to_string())
        );
        assert!(tracker.needs_resync());
    }

    #[test]
    fn test_tracker_last_write_wins() {
        let mut tracker = EditTracker::new();
        tracker.apply("handler_note", "a".to_string(), "b".to_string());
        tracker.apply("handler_note", "b".to_string(), "c".to_string());

        assert_eq!(tracker.current("handler_note"), Some(&"c".to_string()));
    }

    #[test]
    fn test_tracker_resolving_untracked_field_is_noop() {
        let mut tracker: EditTracker<String> = EditTracker::new();
        assert!(tracker.confirm("nothing").is_ok());
        assert_eq!(tracker.revert("nothing").unwrap(), None);
    }

    #[test]
    fn test_clear_resolved_keeps_pending() {
        let mut tracker = EditTracker::new();
        tracker.apply("a", 1, 2);
        tracker.apply("b", 3, 4);
        tracker.confirm("a").unwrap();

        tracker.clear_resolved();
        assert!(tracker.current("a").is_none());
        assert_eq!(tracker.current("b"), Some(&4));
    }
}
