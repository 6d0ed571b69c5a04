//! # Content Stores
//!
//! Where committed site documents live. Every store hands out a
//! [`VersionToken`] with each read and write:
//!
//! | Store            | Mode   | Token                               |
//! |------------------|--------|-------------------------------------|
//! | `LocalFileStore` | Local  | always `"local"`                    |
//! | `MemoryStore`    | Remote | hex SHA-256 of the stored JSON      |
//! | `GitHubStore`    | Remote | blob `sha` from the contents API    |
//!
//! Remote stores reject a write whose expected token is not the current one.

use crate::errors::PersistResult;
use async_trait::async_trait;
use folio_common::Locale;
use folio_editor::{ContentDocument, VersionToken};
use serde::{Deserialize, Serialize};

/// Token reported by stores without versioning
pub const LOCAL_VERSION: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Last write wins; no concurrency check
    Local,
    /// Writes carry the token they were based on
    Remote,
}

/// Document as read from a store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredContent {
    pub document: ContentDocument,
    pub version: VersionToken,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    fn mode(&self) -> StoreMode;

    async fn read(&self, locale: Locale) -> PersistResult<StoredContent>;

    /// Replace the locale's document. `expected` is the token the write is
    /// based on; remote stores fail with `Conflict` when it is stale.
    async fn write(
        &self,
        locale: Locale,
        document: &ContentDocument,
        expected: Option<&VersionToken>,
    ) -> PersistResult<VersionToken>;
}

/// Serialized form every store writes: two-space pretty JSON and a newline
pub fn to_pretty_json(document: &ContentDocument) -> PersistResult<String> {
    let mut json = serde_json::to_string_pretty(document)?;
    json.push('\n');
    Ok(json)
}
