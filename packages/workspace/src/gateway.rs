//! # Persistence Gateway
//!
//! The single write path for site content. A commit passes, in order:
//!
//! ```text
//! rate limit ─→ shape parse ─→ validate ─→ per-locale guard ─→ store write (timeout)
//!   429            400            400          409 busy          409 conflict / 504
//! ```
//!
//! and on success replaces the gateway's cached baseline for the locale.
//! A failure at any step leaves the store and the cache as they were.

use crate::errors::{PersistError, PersistResult};
use crate::rate_limit::{RateLimiter, ADMIN_SAVE_KEY};
use crate::store::{ContentStore, StoreMode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use folio_common::Locale;
use folio_editor::{validate, Baseline, ContentDocument, ContentSink, EditorError, VersionToken};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Rate limiter key commits are counted under
    pub rate_limit_key: String,
    pub commit_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rate_limit_key: ADMIN_SAVE_KEY.to_string(),
            commit_timeout: Duration::from_secs(30),
        }
    }
}

/// Proof of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub locale: Locale,
    pub version: VersionToken,
    pub committed_at: DateTime<Utc>,
}

pub struct PersistenceGateway {
    store: Arc<dyn ContentStore>,
    limiter: Arc<RateLimiter>,
    config: GatewayConfig,
    in_flight: DashMap<Locale, Arc<Mutex<()>>>,
    baselines: DashMap<Locale, Baseline>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn ContentStore>, limiter: Arc<RateLimiter>, config: GatewayConfig) -> Self {
        Self {
            store,
            limiter,
            config,
            in_flight: DashMap::new(),
            baselines: DashMap::new(),
        }
    }

    pub fn mode(&self) -> StoreMode {
        self.store.mode()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Validate and store `document` for `locale`.
    ///
    /// `base_version` is the version the caller's edits started from. Remote
    /// stores reject the commit when it is no longer current; local mode
    /// ignores it.
    pub async fn commit(
        &self,
        key: &str,
        locale: Locale,
        document: ContentDocument,
        base_version: Option<&VersionToken>,
    ) -> PersistResult<CommitReceipt> {
        if !self.limiter.check_and_record(key) {
            tracing::warn!(key, %locale, "Commit rejected by rate limiter");
            return Err(PersistError::RateLimited);
        }

        let document = ContentDocument::parse(document.into_value())?;
        let errors = validate(&document);
        if !errors.is_empty() {
            tracing::info!(%locale, errors = errors.len(), "Commit rejected by validation");
            return Err(PersistError::Invalid(errors));
        }

        let guard = self.in_flight.entry(locale).or_default().clone();
        let _held = guard.try_lock().map_err(|_| {
            tracing::warn!(%locale, "Commit rejected, another one is in flight");
            PersistError::Busy(locale)
        })?;

        let version = tokio::time::timeout(
            self.config.commit_timeout,
            self.persist(locale, &document, base_version),
        )
        .await
        .map_err(|_| {
            tracing::error!(%locale, timeout = ?self.config.commit_timeout, "Commit timed out");
            PersistError::Timeout(self.config.commit_timeout)
        })??;

        self.baselines
            .insert(locale, Baseline::new(document, version.clone()));
        let receipt = CommitReceipt {
            locale,
            version,
            committed_at: Utc::now(),
        };
        tracing::info!(%locale, version = %receipt.version, "Committed content");
        Ok(receipt)
    }

    async fn persist(
        &self,
        locale: Locale,
        document: &ContentDocument,
        base_version: Option<&VersionToken>,
    ) -> PersistResult<VersionToken> {
        match self.store.mode() {
            StoreMode::Local => self.store.write(locale, document, None).await,
            StoreMode::Remote => {
                let current = match self.store.read(locale).await {
                    Ok(stored) => Some(stored.version),
                    Err(PersistError::NotFound(_)) => None,
                    Err(e) => return Err(e),
                };
                if let Some(base) = base_version {
                    if current.as_ref() != Some(base) {
                        tracing::warn!(%locale, %base, ?current, "Commit based on a stale version");
                        return Err(PersistError::Conflict(locale));
                    }
                }
                self.store.write(locale, document, current.as_ref()).await
            }
        }
    }

    /// Committed document of `locale`, read through the cache. Stored
    /// content that fails validation is refused and not cached.
    pub async fn load(&self, locale: Locale) -> PersistResult<Baseline> {
        if let Some(cached) = self.baselines.get(&locale) {
            tracing::debug!(%locale, "Baseline served from cache");
            return Ok(cached.clone());
        }

        let stored = self.store.read(locale).await?;
        let errors = validate(&stored.document);
        if !errors.is_empty() {
            tracing::error!(%locale, errors = %errors.summary(), "Stored content failed validation");
            return Err(PersistError::Invalid(errors));
        }
        let baseline = Baseline::new(stored.document, stored.version);
        self.baselines.insert(locale, baseline.clone());
        Ok(baseline)
    }

    /// Forget cached baselines of one locale, or of all when `None`
    pub fn clear_cache(&self, locale: Option<Locale>) {
        match locale {
            Some(locale) => {
                self.baselines.remove(&locale);
            }
            None => self.baselines.clear(),
        }
    }
}

#[async_trait]
impl ContentSink for PersistenceGateway {
    async fn commit(
        &self,
        locale: Locale,
        document: &ContentDocument,
        base_version: Option<&VersionToken>,
    ) -> Result<VersionToken, EditorError> {
        let receipt = PersistenceGateway::commit(
            self,
            &self.config.rate_limit_key,
            locale,
            document.clone(),
            base_version,
        )
        .await?;
        Ok(receipt.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::{json, Value};

    fn page(slug: &str) -> Value {
        json!({ "slug": slug, "title": slug.to_uppercase() })
    }

    fn site(brand: &str) -> ContentDocument {
        ContentDocument::parse(json!({
            "brandName": brand,
            "navigation": {
                "header": { "items": [{ "title": "Home", "path": "/", "order": 0 }] },
                "footer": { "items": [] }
            },
            "pages": {
                "home": page("home"), "about": page("about"), "academy": page("academy"),
                "incubator": page("incubator"), "placement": page("placement"), "contact": page("contact")
            }
        }))
        .unwrap()
    }

    fn gateway(store: Arc<MemoryStore>, config: GatewayConfig) -> PersistenceGateway {
        PersistenceGateway::new(store, Arc::new(RateLimiter::default()), config)
    }

    fn seeded() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_document(Locale::He, site("A")).unwrap())
    }

    #[tokio::test]
    async fn test_commit_with_current_base() {
        let store = seeded();
        let gateway = gateway(store.clone(), GatewayConfig::default());
        let base = gateway.load(Locale::He).await.unwrap();

        let receipt = gateway
            .commit(ADMIN_SAVE_KEY, Locale::He, site("B"), Some(&base.version))
            .await
            .unwrap();
        assert_eq!(receipt.locale, Locale::He);
        assert_eq!(Some(receipt.version.clone()), store.current_version(Locale::He));

        let cached = gateway.load(Locale::He).await.unwrap();
        assert_eq!(cached.version, receipt.version);
        assert_eq!(cached.document.text("brandName"), Some("B"));
    }

    #[tokio::test]
    async fn test_stale_base_conflicts_and_keeps_baseline() {
        let store = seeded();
        let gateway = gateway(store.clone(), GatewayConfig::default());
        let base = gateway.load(Locale::He).await.unwrap();
        let stale = VersionToken::new("0000");

        let err = gateway
            .commit(ADMIN_SAVE_KEY, Locale::He, site("B"), Some(&stale))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Conflict(Locale::He)));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
        assert_eq!(store.write_count(), 0);
        assert_eq!(gateway.load(Locale::He).await.unwrap(), base);
    }

    #[tokio::test]
    async fn test_sixth_commit_is_rate_limited() {
        let store = Arc::new(MemoryStore::new());
        let gateway = gateway(store.clone(), GatewayConfig::default());
        for i in 0..5 {
            gateway
                .commit(ADMIN_SAVE_KEY, Locale::En, site(&format!("v{}", i)), None)
                .await
                .unwrap();
        }
        let err = gateway
            .commit(ADMIN_SAVE_KEY, Locale::En, site("v5"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::RateLimited));
        assert_eq!(store.write_count(), 5);
        assert_eq!(store.read(Locale::En).await.unwrap().document.text("brandName"), Some("v4"));
    }

    #[tokio::test]
    async fn test_invalid_content_never_reaches_store() {
        let store = seeded();
        let gateway = gateway(store.clone(), GatewayConfig::default());

        let mut document = site("B");
        document.set("pages.home.cta.primaryLabel", json!("Book")).unwrap();
        let err = gateway
            .commit(ADMIN_SAVE_KEY, Locale::He, document, None)
            .await
            .unwrap_err();
        let PersistError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["pages.home.cta.primaryHref"]);

        let garbage = ContentDocument::from_value_unchecked(json!({ "brandName": "B" }));
        let err = gateway
            .commit(ADMIN_SAVE_KEY, Locale::He, garbage, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Shape(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_commit_is_busy() {
        let store = Arc::new(MemoryStore::new().with_write_delay(Duration::from_millis(200)));
        let gateway = gateway(store.clone(), GatewayConfig::default());

        let (first, second) = tokio::join!(
            gateway.commit(ADMIN_SAVE_KEY, Locale::He, site("A"), None),
            gateway.commit(ADMIN_SAVE_KEY, Locale::He, site("B"), None),
        );
        assert!(first.is_ok());
        assert!(matches!(second, Err(PersistError::Busy(Locale::He))));
        assert_eq!(store.write_count(), 1);

        // Other locales are not blocked
        let (he, en) = tokio::join!(
            gateway.commit(ADMIN_SAVE_KEY, Locale::He, site("C"), None),
            gateway.commit(ADMIN_SAVE_KEY, Locale::En, site("D"), None),
        );
        assert!(he.is_ok());
        assert!(en.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_leaves_baseline() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document(Locale::He, site("A"))
                .unwrap()
                .with_write_delay(Duration::from_millis(300)),
        );
        let config = GatewayConfig {
            commit_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let gateway = gateway(store.clone(), config);
        let base = gateway.load(Locale::He).await.unwrap();

        let err = gateway
            .commit(ADMIN_SAVE_KEY, Locale::He, site("B"), Some(&base.version))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::Timeout(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(gateway.load(Locale::He).await.unwrap(), base);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_load_caches_until_cleared() {
        let store = seeded();
        let gateway = gateway(store.clone(), GatewayConfig::default());
        let first = gateway.load(Locale::He).await.unwrap();

        store
            .write(Locale::He, &site("Elsewhere"), Some(&first.version))
            .await
            .unwrap();
        assert_eq!(gateway.load(Locale::He).await.unwrap(), first);

        gateway.clear_cache(Some(Locale::He));
        let fresh = gateway.load(Locale::He).await.unwrap();
        assert_eq!(fresh.document.text("brandName"), Some("Elsewhere"));

        gateway.clear_cache(None);
        assert!(matches!(
            gateway.load(Locale::En).await,
            Err(PersistError::NotFound(Locale::En))
        ));
    }

    #[tokio::test]
    async fn test_load_refuses_invalid_stored_content() {
        let mut document = site("A");
        document.set("pages.home.cta.primaryLabel", json!("Book")).unwrap();
        let store = Arc::new(MemoryStore::new().with_document(Locale::He, document).unwrap());
        let gateway = gateway(store.clone(), GatewayConfig::default());

        let err = gateway.load(Locale::He).await.unwrap_err();
        let PersistError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["pages.home.cta.primaryHref"]);

        // Nothing was cached, so a repaired store is picked up
        let current = store.current_version(Locale::He).unwrap();
        store.write(Locale::He, &site("B"), Some(&current)).await.unwrap();
        assert_eq!(gateway.load(Locale::He).await.unwrap().document.text("brandName"), Some("B"));
    }

    #[tokio::test]
    async fn test_gateway_as_content_sink() {
        let store = seeded();
        let gateway = gateway(store.clone(), GatewayConfig::default());
        let sink: &dyn ContentSink = &gateway;

        let stale = VersionToken::new("stale");
        let err = sink.commit(Locale::He, &site("B"), Some(&stale)).await.unwrap_err();
        assert_eq!(err, EditorError::Conflict);

        let version = sink.commit(Locale::He, &site("B"), None).await.unwrap();
        assert_eq!(Some(version), store.current_version(Locale::He));
    }
}
