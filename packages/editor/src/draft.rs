//! # Drafts and Baselines
//!
//! The DraftStore owns one baseline and at most one draft per locale, plus
//! the dirty flags and validation errors the editor shows next to fields.
//!
//! ## Copy-on-write
//!
//! Drafts are published as `Arc<ContentDocument>`. Every mutation clones the
//! active draft, applies the change to the clone and swaps it in, so a
//! snapshot handed out earlier never changes underneath its holder and a
//! failed mutation leaves the draft exactly as it was.
//!
//! ```text
//! baseline(he) ──clone on activate──→ draft(he) ──set_field──→ draft'(he)
//!      ↑                                                          │
//!      └──────────────────── mark_committed ──────────────────────┘
//! ```

use crate::array::{ArrayEditor, Direction};
use crate::document::{ContentDocument, VersionToken};
use crate::errors::EditorError;
use crate::path::FieldPath;
use crate::registry::SectionKey;
use crate::validate::ValidationErrors;
use folio_common::Locale;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

static NO_ERRORS: ValidationErrors = ValidationErrors::new();

/// Last committed document of a locale and the version it was stored at
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub document: ContentDocument,
    pub version: VersionToken,
}

impl Baseline {
    pub fn new(document: ContentDocument, version: VersionToken) -> Self {
        Self { document, version }
    }
}

/// Per-locale drafts, baselines, dirty flags and field errors
#[derive(Debug)]
pub struct DraftStore {
    active: Locale,
    current: Arc<ContentDocument>,
    baselines: HashMap<Locale, Arc<Baseline>>,
    /// Drafts of inactive locales
    drafts: HashMap<Locale, Arc<ContentDocument>>,
    dirty: BTreeSet<Locale>,
    errors: HashMap<Locale, ValidationErrors>,
}

impl DraftStore {
    /// Start editing `active`, whose baseline must be among `baselines`.
    pub fn new(baselines: HashMap<Locale, Baseline>, active: Locale) -> Result<Self, EditorError> {
        let baselines: HashMap<Locale, Arc<Baseline>> = baselines
            .into_iter()
            .map(|(locale, baseline)| (locale, Arc::new(baseline)))
            .collect();
        let current = baselines
            .get(&active)
            .map(|baseline| Arc::new(baseline.document.clone()))
            .ok_or(EditorError::NoBaseline(active))?;

        Ok(Self {
            active,
            current,
            baselines,
            drafts: HashMap::new(),
            dirty: BTreeSet::new(),
            errors: HashMap::new(),
        })
    }

    pub fn active(&self) -> Locale {
        self.active
    }

    /// Switch the locale being edited. The outgoing draft stays cached with
    /// its dirty flag; the incoming one is restored, or cloned from its
    /// baseline the first time.
    pub fn activate_locale(&mut self, locale: Locale) -> Result<(), EditorError> {
        if locale == self.active {
            return Ok(());
        }
        let incoming = match self.drafts.remove(&locale) {
            Some(draft) => draft,
            None => self
                .baselines
                .get(&locale)
                .map(|baseline| Arc::new(baseline.document.clone()))
                .ok_or(EditorError::NoBaseline(locale))?,
        };
        let outgoing = std::mem::replace(&mut self.current, incoming);
        self.drafts.insert(self.active, outgoing);
        self.active = locale;
        Ok(())
    }

    /// Load or replace a locale's baseline. An untouched draft follows it.
    pub fn insert_baseline(&mut self, locale: Locale, baseline: Baseline) {
        if !self.dirty.contains(&locale) {
            self.publish(locale, Arc::new(baseline.document.clone()));
        }
        self.baselines.insert(locale, Arc::new(baseline));
        self.refresh_dirty(locale);
    }

    /// Active draft
    pub fn draft(&self) -> &ContentDocument {
        &self.current
    }

    /// Shared handle on the active draft that later edits will not touch
    pub fn snapshot(&self) -> Arc<ContentDocument> {
        Arc::clone(&self.current)
    }

    /// Shared handle on `locale`'s draft, active or not. A locale never
    /// activated yet yields its baseline document.
    pub fn snapshot_of(&self, locale: Locale) -> Result<Arc<ContentDocument>, EditorError> {
        if locale == self.active {
            return Ok(Arc::clone(&self.current));
        }
        if let Some(draft) = self.drafts.get(&locale) {
            return Ok(Arc::clone(draft));
        }
        self.baselines
            .get(&locale)
            .map(|baseline| Arc::new(baseline.document.clone()))
            .ok_or(EditorError::NoBaseline(locale))
    }

    pub fn baseline(&self, locale: Locale) -> Option<&Baseline> {
        self.baselines.get(&locale).map(Arc::as_ref)
    }

    /// Write `value` at `path` in the active draft
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), EditorError> {
        self.update(|draft| draft.set(path, value))?;
        self.errors_mut().clear(path);
        Ok(())
    }

    /// Restore the baseline value at `path`; a path the baseline lacks is
    /// removed from the draft.
    pub fn reset_field(&mut self, path: &str) -> Result<(), EditorError> {
        let parsed = FieldPath::parse(path)?;
        let original = self.active_baseline()?.document.get(path).cloned();
        self.update(|draft| restore(draft, path, original))?;
        self.errors_mut().clear_under(&parsed);
        Ok(())
    }

    /// Restore every subtree of `section` and drop the locale's errors
    pub fn reset_section(&mut self, section: SectionKey) -> Result<(), EditorError> {
        let baseline = Arc::clone(self.active_baseline()?);
        self.update(|draft| {
            section.reset_paths().iter().try_for_each(|path| {
                restore(draft, path, baseline.document.get(path).cloned())
            })
        })?;
        self.errors_mut().clear_all();
        Ok(())
    }

    /// Swap in a whole list
    pub fn replace_list(&mut self, path: &str, items: Vec<Value>) -> Result<(), EditorError> {
        self.set_field(path, Value::Array(items))
    }

    pub fn append_item(
        &mut self,
        editor: &ArrayEditor<'_>,
        path: &str,
        item: Option<Value>,
    ) -> Result<usize, EditorError> {
        let index = self.update(|draft| editor.append(draft, path, item))?;
        if let Ok(list) = FieldPath::parse(path) {
            self.errors_mut().clear_under(&list);
        }
        Ok(index)
    }

    pub fn remove_item(
        &mut self,
        editor: &ArrayEditor<'_>,
        path: &str,
        index: usize,
    ) -> Result<Value, EditorError> {
        let removed = self.update(|draft| editor.remove(draft, path, index))?;
        // Item errors are keyed by index and no longer line up
        if let Ok(list) = FieldPath::parse(path) {
            self.errors_mut().clear_under(&list);
        }
        Ok(removed)
    }

    pub fn move_item(
        &mut self,
        editor: &ArrayEditor<'_>,
        path: &str,
        index: usize,
        direction: Direction,
    ) -> Result<bool, EditorError> {
        let moved = self.update(|draft| editor.move_item(draft, path, index, direction))?;
        if moved {
            if let Ok(list) = FieldPath::parse(path) {
                self.errors_mut().clear_under(&list);
            }
        }
        Ok(moved)
    }

    /// Apply `edit` to a copy of the active draft and publish the copy on
    /// success. On error the published draft is untouched.
    pub fn update<T, E>(
        &mut self,
        edit: impl FnOnce(&mut ContentDocument) -> Result<T, E>,
    ) -> Result<T, EditorError>
    where
        EditorError: From<E>,
    {
        let mut next = self.draft().clone();
        let output = edit(&mut next)?;
        self.current = Arc::new(next);
        self.refresh_dirty(self.active);
        Ok(output)
    }

    pub fn record_errors(&mut self, locale: Locale, errors: ValidationErrors) {
        self.errors.insert(locale, errors);
    }

    pub fn errors(&self, locale: Locale) -> &ValidationErrors {
        self.errors.get(&locale).unwrap_or(&NO_ERRORS)
    }

    pub fn is_dirty(&self, locale: Locale) -> bool {
        self.dirty.contains(&locale)
    }

    /// Dirty locales in stable order
    pub fn dirty_locales(&self) -> Vec<Locale> {
        self.dirty.iter().copied().collect()
    }

    /// `document` was stored at `version`: it becomes both the baseline and
    /// the draft, and the locale is clean again.
    pub fn mark_committed(&mut self, locale: Locale, document: ContentDocument, version: VersionToken) {
        self.publish(locale, Arc::new(document.clone()));
        self.baselines
            .insert(locale, Arc::new(Baseline::new(document, version)));
        self.dirty.remove(&locale);
        self.errors.remove(&locale);
    }

    fn active_baseline(&self) -> Result<&Arc<Baseline>, EditorError> {
        self.baselines
            .get(&self.active)
            .ok_or(EditorError::NoBaseline(self.active))
    }

    fn errors_mut(&mut self) -> &mut ValidationErrors {
        self.errors.entry(self.active).or_default()
    }

    fn publish(&mut self, locale: Locale, draft: Arc<ContentDocument>) {
        if locale == self.active {
            self.current = draft;
        } else {
            self.drafts.insert(locale, draft);
        }
    }

    fn draft_of(&self, locale: Locale) -> Option<&ContentDocument> {
        if locale == self.active {
            Some(&self.current)
        } else {
            self.drafts.get(&locale).map(Arc::as_ref)
        }
    }

    fn refresh_dirty(&mut self, locale: Locale) {
        let changed = match (self.draft_of(locale), self.baselines.get(&locale)) {
            (Some(draft), Some(baseline)) => *draft != baseline.document,
            _ => false,
        };
        if changed {
            self.dirty.insert(locale);
        } else {
            self.dirty.remove(&locale);
        }
    }
}

fn restore(draft: &mut ContentDocument, path: &str, original: Option<Value>) -> Result<(), EditorError> {
    match original {
        Some(value) => draft.set(path, value)?,
        None => {
            draft.remove(path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CallToAction, NavItem, PageCommon, SiteContent};
    use crate::path::PathError;
    use serde_json::json;

    fn site(brand: &str) -> ContentDocument {
        let mut site = SiteContent {
            brand_name: brand.to_string(),
            ..Default::default()
        };
        site.navigation.header.items = vec![NavItem::new("Home", "/", 0)];
        site.pages.home.common = PageCommon::new("home", "Home");
        site.pages.home.cta = Some(CallToAction {
            primary_label: Some("Book".to_string()),
            primary_href: Some("/contact".to_string()),
            ..Default::default()
        });
        site.pages.contact.common = PageCommon::new("contact", "Contact");
        ContentDocument::from_site(&site)
    }

    fn store() -> DraftStore {
        let baselines = HashMap::from([
            (Locale::He, Baseline::new(site("פוליו"), VersionToken::new("v-he"))),
            (Locale::En, Baseline::new(site("Folio"), VersionToken::new("v-en"))),
        ]);
        DraftStore::new(baselines, Locale::He).unwrap()
    }

    #[test]
    fn test_set_then_reset_field() {
        let mut store = store();
        store.set_field("pages.contact.email", json!("a@b.com")).unwrap();
        assert!(store.is_dirty(Locale::He));
        assert_eq!(store.draft().text("pages.contact.email"), Some("a@b.com"));

        store.reset_field("pages.contact.email").unwrap();
        assert!(!store.is_dirty(Locale::He));
        assert_eq!(store.draft().get("pages.contact.email"), None);
        assert_eq!(store.draft(), &store.baseline(Locale::He).unwrap().document);
    }

    fn store_with_null_subtitle() -> DraftStore {
        let mut value = site("Folio").into_value();
        value["pages"]["home"]["subtitle"] = Value::Null;
        let document = ContentDocument::from_value_unchecked(value);
        let baselines = HashMap::from([(Locale::En, Baseline::new(document, VersionToken::new("v")))]);
        DraftStore::new(baselines, Locale::En).unwrap()
    }

    #[test]
    fn test_reset_restores_stored_null() {
        let mut store = store_with_null_subtitle();
        store.set_field("pages.home.subtitle", json!("x")).unwrap();
        assert!(store.is_dirty(Locale::En));

        store.reset_field("pages.home.subtitle").unwrap();
        assert_eq!(store.draft().get("pages.home.subtitle"), Some(&Value::Null));
        assert!(!store.is_dirty(Locale::En));
    }

    #[test]
    fn test_reset_of_untouched_null_field_stays_clean() {
        let mut store = store_with_null_subtitle();
        store.reset_field("pages.home.subtitle").unwrap();
        assert!(!store.is_dirty(Locale::En));

        store.set_field("pages.home.subtitle", json!("x")).unwrap();
        store.reset_section(SectionKey::PagesHome).unwrap();
        assert!(!store.is_dirty(Locale::En));
    }

    #[test]
    fn test_setting_baseline_value_is_not_dirty() {
        let mut store = store();
        store.set_field("brandName", json!("Other")).unwrap();
        store.set_field("brandName", json!("פוליו")).unwrap();
        assert!(store.dirty_locales().is_empty());
    }

    #[test]
    fn test_failed_set_leaves_draft_untouched() {
        let mut store = store();
        let before = store.snapshot();
        let err = store.set_field("brandName.0.title", json!("x")).unwrap_err();
        assert!(matches!(err, EditorError::Path(PathError::ShapeMismatch { .. })));
        assert_eq!(store.draft(), before.as_ref());
        assert!(!store.is_dirty(Locale::He));
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_edits() {
        let mut store = store();
        let snapshot = store.snapshot();
        store.set_field("pages.home.title", json!("Start")).unwrap();
        assert_eq!(snapshot.text("pages.home.title"), Some("Home"));
        assert_eq!(store.draft().text("pages.home.title"), Some("Start"));
        assert_eq!(store.baseline(Locale::He).unwrap().document.text("pages.home.title"), Some("Home"));
    }

    #[test]
    fn test_locale_switch_keeps_drafts() {
        let mut store = store();
        store.set_field("brandName", json!("Draft he")).unwrap();
        store.activate_locale(Locale::En).unwrap();
        assert_eq!(store.draft().text("brandName"), Some("Folio"));
        assert!(!store.is_dirty(Locale::En));

        store.activate_locale(Locale::He).unwrap();
        assert_eq!(store.draft().text("brandName"), Some("Draft he"));
        assert_eq!(store.dirty_locales(), vec![Locale::He]);
    }

    #[test]
    fn test_missing_baseline() {
        let baselines = HashMap::from([(Locale::En, Baseline::new(site("Folio"), VersionToken::new("v")))]);
        assert_eq!(
            DraftStore::new(baselines.clone(), Locale::He).unwrap_err(),
            EditorError::NoBaseline(Locale::He)
        );
        let mut store = DraftStore::new(baselines, Locale::En).unwrap();
        assert_eq!(
            store.activate_locale(Locale::He).unwrap_err(),
            EditorError::NoBaseline(Locale::He)
        );
        assert_eq!(store.active(), Locale::En);
    }

    #[test]
    fn test_set_field_clears_only_its_error() {
        let mut store = store();
        let mut errors = ValidationErrors::new();
        errors.insert("brandName", "required field");
        errors.insert("pages.home.title", "required field");
        store.record_errors(Locale::He, errors);

        store.set_field("brandName", json!("Folio")).unwrap();
        assert_eq!(store.errors(Locale::He).paths().collect::<Vec<_>>(), vec!["pages.home.title"]);
        assert!(store.errors(Locale::En).is_empty());
    }

    #[test]
    fn test_reset_field_clears_nested_errors() {
        let mut store = store();
        store.set_field("pages.home.cta.primaryHref", json!("")).unwrap();
        let mut errors = ValidationErrors::new();
        errors.insert("pages.home.cta.primaryHref", "required when primaryLabel is set");
        errors.insert("pages.homepage", "other");
        store.record_errors(Locale::He, errors);

        store.reset_field("pages.home.cta").unwrap();
        assert_eq!(store.draft().text("pages.home.cta.primaryHref"), Some("/contact"));
        assert_eq!(store.errors(Locale::He).paths().collect::<Vec<_>>(), vec!["pages.homepage"]);
    }

    #[test]
    fn test_reset_section_restores_subtrees() {
        let mut store = store();
        let editor = ArrayEditor::site();
        store
            .append_item(&editor, "navigation.header.items", Some(json!({ "title": "About", "path": "/about" })))
            .unwrap();
        store.set_field("navigation.footer.legal", json!("© Folio")).unwrap();
        store.set_field("brandName", json!("Renamed")).unwrap();
        let mut errors = ValidationErrors::new();
        errors.insert("navigation.header.items.1.path", "required field");
        store.record_errors(Locale::He, errors);

        store.reset_section(SectionKey::GlobalHeader).unwrap();
        store.reset_section(SectionKey::GlobalFooter).unwrap();
        let draft = store.draft();
        assert_eq!(draft.get("navigation.header.items").and_then(Value::as_array).map(Vec::len), Some(1));
        assert_eq!(draft.get("navigation.footer.legal"), None);
        assert_eq!(draft.text("brandName"), Some("Renamed"));
        assert!(store.errors(Locale::He).is_empty());
        assert!(store.is_dirty(Locale::He));
    }

    #[test]
    fn test_append_clears_list_errors() {
        let mut store = store();
        let editor = ArrayEditor::site();
        let mut errors = ValidationErrors::new();
        errors.insert("navigation.footer.items", "at least one item is required");
        errors.insert("brandName", "required field");
        store.record_errors(Locale::He, errors);

        store.append_item(&editor, "navigation.footer.items", None).unwrap();
        assert_eq!(store.errors(Locale::He).paths().collect::<Vec<_>>(), vec!["brandName"]);
    }

    #[test]
    fn test_list_edits_through_store() {
        let mut store = store();
        let editor = ArrayEditor::site();
        let path = "navigation.header.items";
        store
            .append_item(&editor, path, Some(json!({ "title": "About", "path": "/about", "order": 1 })))
            .unwrap();
        store.remove_item(&editor, path, 0).unwrap();
        assert_eq!(
            store.draft().get(path),
            Some(&json!([{ "title": "About", "path": "/about", "order": 0 }]))
        );

        let before = store.snapshot();
        assert!(!store.move_item(&editor, path, 0, Direction::Up).unwrap());
        assert!(matches!(
            store.remove_item(&editor, path, 5),
            Err(EditorError::Array(_))
        ));
        assert_eq!(store.draft(), before.as_ref());
    }

    #[test]
    fn test_mark_committed_resets_dirty_state() {
        let mut store = store();
        store.set_field("brandName", json!("New")).unwrap();
        let mut errors = ValidationErrors::new();
        errors.insert("pages.home.title", "required field");
        store.record_errors(Locale::He, errors);

        let committed = store.draft().clone();
        store.mark_committed(Locale::He, committed.clone(), VersionToken::new("v2"));
        assert!(!store.is_dirty(Locale::He));
        assert!(store.errors(Locale::He).is_empty());
        let baseline = store.baseline(Locale::He).unwrap();
        assert_eq!(baseline.version.as_str(), "v2");
        assert_eq!(baseline.document, committed);
    }

    #[test]
    fn test_insert_baseline_follows_clean_draft_only() {
        let mut store = store();
        store.insert_baseline(Locale::En, Baseline::new(site("Folio 2"), VersionToken::new("v3")));
        store.activate_locale(Locale::En).unwrap();
        assert_eq!(store.draft().text("brandName"), Some("Folio 2"));

        store.set_field("brandName", json!("Mine")).unwrap();
        store.insert_baseline(Locale::En, Baseline::new(site("Folio 3"), VersionToken::new("v4")));
        assert_eq!(store.draft().text("brandName"), Some("Mine"));
        assert!(store.is_dirty(Locale::En));
    }
}
