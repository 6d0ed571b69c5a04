use crate::errors::{PersistError, PersistResult};
use crate::store::{to_pretty_json, ContentStore, StoreMode, StoredContent};
use async_trait::async_trait;
use folio_common::Locale;
use folio_editor::{ContentDocument, VersionToken};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-process versioned store. Tokens are content hashes and every write
/// must name the current one, like the remote store it stands in for.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Locale, StoredContent>>,
    writes: AtomicUsize,
    write_delay: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a locale's document
    pub fn with_document(self, locale: Locale, document: ContentDocument) -> PersistResult<Self> {
        let version = content_version(&document)?;
        self.lock()?
            .insert(locale, StoredContent { document, version });
        Ok(self)
    }

    /// Hold every write for `delay` before it lands
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Number of writes that landed
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn current_version(&self, locale: Locale) -> Option<VersionToken> {
        self.lock()
            .ok()?
            .get(&locale)
            .map(|stored| stored.version.clone())
    }

    fn lock(&self) -> PersistResult<std::sync::MutexGuard<'_, HashMap<Locale, StoredContent>>> {
        self.documents
            .lock()
            .map_err(|_| PersistError::Corrupt("memory store lock poisoned".to_string()))
    }
}

/// Hex SHA-256 of the document's stored form
pub fn content_version(document: &ContentDocument) -> PersistResult<VersionToken> {
    let json = to_pretty_json(document)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(VersionToken::new(hex::encode(hasher.finalize())))
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Remote
    }

    async fn read(&self, locale: Locale) -> PersistResult<StoredContent> {
        self.lock()?
            .get(&locale)
            .cloned()
            .ok_or(PersistError::NotFound(locale))
    }

    async fn write(
        &self,
        locale: Locale,
        document: &ContentDocument,
        expected: Option<&VersionToken>,
    ) -> PersistResult<VersionToken> {
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }

        let version = content_version(document)?;
        let mut documents = self.lock()?;
        let current = documents.get(&locale).map(|stored| &stored.version);
        if current != expected {
            tracing::warn!(%locale, ?current, ?expected, "Rejected write with stale version");
            return Err(PersistError::Conflict(locale));
        }

        documents.insert(
            locale,
            StoredContent {
                document: document.clone(),
                version: version.clone(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }
}
