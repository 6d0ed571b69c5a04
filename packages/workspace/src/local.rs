use crate::errors::{PersistError, PersistResult};
use crate::store::{to_pretty_json, ContentStore, StoreMode, StoredContent, LOCAL_VERSION};
use async_trait::async_trait;
use folio_common::Locale;
use folio_editor::{ContentDocument, VersionToken};
use std::path::{Path, PathBuf};

/// `site.<locale>.json` files in one content directory
pub struct LocalFileStore {
    dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, locale: Locale) -> PathBuf {
        self.dir.join(locale.file_name())
    }
}

#[async_trait]
impl ContentStore for LocalFileStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Local
    }

    async fn read(&self, locale: Locale) -> PersistResult<StoredContent> {
        let path = self.file_path(locale);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistError::NotFound(locale))
            }
            Err(e) => return Err(e.into()),
        };
        let document = ContentDocument::parse(serde_json::from_str(&raw)?)?;
        tracing::debug!(?path, "Read content from disk");

        Ok(StoredContent {
            document,
            version: VersionToken::new(LOCAL_VERSION),
        })
    }

    async fn write(
        &self,
        locale: Locale,
        document: &ContentDocument,
        _expected: Option<&VersionToken>,
    ) -> PersistResult<VersionToken> {
        let json = to_pretty_json(document)?;
        let path = self.file_path(locale);
        let staging = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &path).await?;
        tracing::info!(?path, "Wrote content to disk");

        Ok(VersionToken::new(LOCAL_VERSION))
    }
}
