//! # Edit Session Management
//!
//! An EditSession is one operator's editing context: the draft store plus
//! the sink that persists a validated draft.
//!
//! ## Commit flow
//!
//! ```text
//! commit(locale)
//!   ├─ validate the locale's draft ── errors ──→ record, CommitOutcome::Invalid (sink untouched)
//!   └─ ContentSink::commit(locale, draft, base version)
//!        ├─ Ok(version) ──→ mark_committed, CommitOutcome::Committed
//!        └─ Err(e)      ──→ draft/baseline/dirty unchanged, Err(e)
//! ```

use crate::array::{ArrayEditor, Direction};
use crate::document::{ContentDocument, VersionToken};
use crate::draft::DraftStore;
use crate::errors::EditorError;
use crate::validate::{validate, ValidationErrors};
use async_trait::async_trait;
use folio_common::Locale;
use serde_json::Value;
use std::sync::Arc;

/// Destination of committed documents
#[async_trait]
pub trait ContentSink: Send + Sync {
    /// Store `document` for `locale`. `base_version` is the version the
    /// draft was started from; returns the new version.
    async fn commit(
        &self,
        locale: Locale,
        document: &ContentDocument,
        base_version: Option<&VersionToken>,
    ) -> Result<VersionToken, EditorError>;
}

/// Result of a commit attempt that reached a decision
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(VersionToken),
    Invalid(ValidationErrors),
}

/// Single operator's edit session
pub struct EditSession {
    store: DraftStore,
    sink: Arc<dyn ContentSink>,
    lists: ArrayEditor<'static>,
}

impl EditSession {
    pub fn new(store: DraftStore, sink: Arc<dyn ContentSink>) -> Self {
        Self {
            store,
            sink,
            lists: ArrayEditor::site(),
        }
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DraftStore {
        &mut self.store
    }

    pub fn active(&self) -> Locale {
        self.store.active()
    }

    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), EditorError> {
        self.store.set_field(path, value)
    }

    pub fn append_item(&mut self, path: &str, item: Option<Value>) -> Result<usize, EditorError> {
        self.store.append_item(&self.lists, path, item)
    }

    pub fn remove_item(&mut self, path: &str, index: usize) -> Result<Value, EditorError> {
        self.store.remove_item(&self.lists, path, index)
    }

    pub fn move_item(
        &mut self,
        path: &str,
        index: usize,
        direction: Direction,
    ) -> Result<bool, EditorError> {
        self.store.move_item(&self.lists, path, index, direction)
    }

    /// Validate the active draft and record the result for its locale
    pub fn validate(&mut self) -> ValidationErrors {
        let errors = validate(self.store.draft());
        self.store.record_errors(self.store.active(), errors.clone());
        errors
    }

    /// Validate and persist `locale`'s draft, which need not be active
    pub async fn commit(&mut self, locale: Locale) -> Result<CommitOutcome, EditorError> {
        let snapshot = self.store.snapshot_of(locale)?;
        let errors = validate(&snapshot);
        self.store.record_errors(locale, errors.clone());
        if !errors.is_empty() {
            return Ok(CommitOutcome::Invalid(errors));
        }

        let base_version = self.store.baseline(locale).map(|baseline| baseline.version.clone());
        let version = self
            .sink
            .commit(locale, &snapshot, base_version.as_ref())
            .await?;

        self.store
            .mark_committed(locale, ContentDocument::clone(&snapshot), version.clone());
        Ok(CommitOutcome::Committed(version))
    }
}
