//! # Section Registry
//!
//! Catalog of editor sections and the labelled fields each one exposes.
//! The registry answers "which section and path does this label belong
//! to", which is all a UI needs to deep-link a search hit to its control.

use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKey {
    #[serde(rename = "global.brand")]
    GlobalBrand,
    #[serde(rename = "global.header")]
    GlobalHeader,
    #[serde(rename = "global.footer")]
    GlobalFooter,
    #[serde(rename = "global.meta")]
    GlobalMeta,
    #[serde(rename = "pages.home")]
    PagesHome,
    #[serde(rename = "pages.about")]
    PagesAbout,
    #[serde(rename = "pages.academy")]
    PagesAcademy,
    #[serde(rename = "pages.incubator")]
    PagesIncubator,
    #[serde(rename = "pages.placement")]
    PagesPlacement,
    #[serde(rename = "pages.contact")]
    PagesContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionGroup {
    Global,
    Pages,
}

impl SectionGroup {
    pub const ALL: [SectionGroup; 2] = [SectionGroup::Global, SectionGroup::Pages];

    pub fn label(&self) -> &'static str {
        match self {
            SectionGroup::Global => "Global",
            SectionGroup::Pages => "Pages",
        }
    }
}

impl SectionKey {
    /// Sections in sidebar order
    pub const ALL: [SectionKey; 10] = [
        SectionKey::GlobalBrand,
        SectionKey::GlobalHeader,
        SectionKey::GlobalFooter,
        SectionKey::GlobalMeta,
        SectionKey::PagesHome,
        SectionKey::PagesAbout,
        SectionKey::PagesAcademy,
        SectionKey::PagesIncubator,
        SectionKey::PagesPlacement,
        SectionKey::PagesContact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::GlobalBrand => "global.brand",
            SectionKey::GlobalHeader => "global.header",
            SectionKey::GlobalFooter => "global.footer",
            SectionKey::GlobalMeta => "global.meta",
            SectionKey::PagesHome => "pages.home",
            SectionKey::PagesAbout => "pages.about",
            SectionKey::PagesAcademy => "pages.academy",
            SectionKey::PagesIncubator => "pages.incubator",
            SectionKey::PagesPlacement => "pages.placement",
            SectionKey::PagesContact => "pages.contact",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.as_str() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKey::GlobalBrand => "Brand name",
            SectionKey::GlobalHeader => "Header menu",
            SectionKey::GlobalFooter => "Footer menu",
            SectionKey::GlobalMeta => "Meta settings",
            SectionKey::PagesHome => "Home page",
            SectionKey::PagesAbout => "About",
            SectionKey::PagesAcademy => "Academy",
            SectionKey::PagesIncubator => "Incubator",
            SectionKey::PagesPlacement => "Placement",
            SectionKey::PagesContact => "Contact",
        }
    }

    pub fn group(&self) -> SectionGroup {
        match self {
            SectionKey::GlobalBrand
            | SectionKey::GlobalHeader
            | SectionKey::GlobalFooter
            | SectionKey::GlobalMeta => SectionGroup::Global,
            _ => SectionGroup::Pages,
        }
    }

    /// Document subtrees restored when the section is reset
    pub fn reset_paths(&self) -> &'static [&'static str] {
        match self {
            SectionKey::GlobalBrand => &["brandName"],
            SectionKey::GlobalHeader => &["navigation.header.items"],
            SectionKey::GlobalFooter => &["navigation.footer.items", "navigation.footer.legal"],
            SectionKey::GlobalMeta => &["meta"],
            SectionKey::PagesHome => &["pages.home"],
            SectionKey::PagesAbout => &["pages.about"],
            SectionKey::PagesAcademy => &["pages.academy"],
            SectionKey::PagesIncubator => &["pages.incubator"],
            SectionKey::PagesPlacement => &["pages.placement"],
            SectionKey::PagesContact => &["pages.contact"],
        }
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labelled, addressable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldEntry {
    pub section: SectionKey,
    pub label: String,
    pub path: String,
}

/// Sections of one sidebar group that survived a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionMatch {
    pub group: SectionGroup,
    pub sections: Vec<SectionKey>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Registry paths missing from schema: {}", .unresolved.join(", "))]
pub struct RegistryError {
    pub unresolved: Vec<String>,
}

static PAGE_FIELDS: [(&str, &str); 8] = [
    ("Page path (slug)", "slug"),
    ("Title", "title"),
    ("Subtitle", "subtitle"),
    ("Content (Markdown)", "body"),
    ("Hero image URL", "hero.url"),
    ("Hero image alt text", "hero.alt"),
    ("Gallery image URL", "gallery.0.url"),
    ("Gallery image alt text", "gallery.0.alt"),
];

pub struct Registry {
    entries: Vec<FieldEntry>,
}

impl Registry {
    /// Catalog of the site editor
    pub fn site() -> &'static Registry {
        static SITE: OnceLock<Registry> = OnceLock::new();
        SITE.get_or_init(site_registry)
    }

    pub fn new(entries: Vec<FieldEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Fields of one section, in declaration order
    pub fn section(&self, section: SectionKey) -> impl Iterator<Item = &FieldEntry> {
        self.entries.iter().filter(move |entry| entry.section == section)
    }

    /// First field, in declaration order, whose label contains `term`
    /// (case-insensitive). Blank terms match nothing.
    pub fn find_by_label(&self, term: &str) -> Option<&FieldEntry> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.label.to_lowercase().contains(&term))
    }

    /// Sidebar groups narrowed to sections whose own label or any field
    /// label contains `term`. A blank term keeps everything.
    pub fn filter_sections(&self, term: &str) -> Vec<SectionMatch> {
        let term = term.trim().to_lowercase();
        SectionGroup::ALL
            .into_iter()
            .map(|group| SectionMatch {
                group,
                sections: SectionKey::ALL
                    .into_iter()
                    .filter(|section| section.group() == group)
                    .filter(|section| {
                        term.is_empty()
                            || section.label().to_lowercase().contains(&term)
                            || self
                                .section(*section)
                                .any(|entry| entry.label.to_lowercase().contains(&term))
                    })
                    .collect(),
            })
            .filter(|group| !group.sections.is_empty())
            .collect()
    }

    /// Every field and reset path must exist in `schema`
    pub fn check(&self, schema: &Schema) -> Result<(), RegistryError> {
        let mut paths: Vec<&str> = self.entries.iter().map(|entry| entry.path.as_str()).collect();
        for section in SectionKey::ALL {
            paths.extend_from_slice(section.reset_paths());
        }
        let unresolved: Vec<String> = paths
            .into_iter()
            .filter(|path| schema.resolve(path).is_none())
            .map(str::to_string)
            .collect();

        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(RegistryError { unresolved })
        }
    }
}

fn entry(section: SectionKey, label: &str, path: &str) -> FieldEntry {
    FieldEntry {
        section,
        label: label.to_string(),
        path: path.to_string(),
    }
}

fn page_entries(section: SectionKey, base: &str) -> impl Iterator<Item = FieldEntry> + '_ {
    PAGE_FIELDS
        .iter()
        .map(move |(label, field)| entry(section, label, &format!("{}.{}", base, field)))
}

fn site_registry() -> Registry {
    use SectionKey::*;

    let mut entries = vec![
        entry(GlobalBrand, "Brand name", "brandName"),
        entry(GlobalHeader, "Link title (header)", "navigation.header.items.0.title"),
        entry(GlobalHeader, "Link path (header)", "navigation.header.items.0.path"),
        entry(GlobalFooter, "Link title (footer)", "navigation.footer.items.0.title"),
        entry(GlobalFooter, "Link path (footer)", "navigation.footer.items.0.path"),
        entry(GlobalFooter, "Footer legal text", "navigation.footer.legal"),
        entry(GlobalMeta, "Title template", "meta.titleTemplate"),
        entry(GlobalMeta, "Default description", "meta.description"),
    ];

    entries.extend(page_entries(PagesHome, "pages.home"));
    entries.extend([
        entry(PagesHome, "Primary CTA label", "pages.home.cta.primaryLabel"),
        entry(PagesHome, "Primary CTA link", "pages.home.cta.primaryHref"),
        entry(PagesHome, "Secondary CTA label", "pages.home.cta.secondaryLabel"),
        entry(PagesHome, "Secondary CTA link", "pages.home.cta.secondaryHref"),
    ]);
    entries.extend(page_entries(PagesAbout, "pages.about"));
    entries.extend(page_entries(PagesAcademy, "pages.academy"));
    entries.extend([
        entry(PagesAcademy, "Program title", "pages.academy.programs.0.title"),
        entry(PagesAcademy, "Program description", "pages.academy.programs.0.description"),
        entry(PagesAcademy, "Program sessions label", "pages.academy.programs.0.sessionsLabel"),
        entry(PagesAcademy, "Program image URL", "pages.academy.programs.0.image.url"),
        entry(PagesAcademy, "Program image alt text", "pages.academy.programs.0.image.alt"),
    ]);
    entries.extend(page_entries(PagesIncubator, "pages.incubator"));
    entries.extend(page_entries(PagesPlacement, "pages.placement"));
    entries.extend(page_entries(PagesContact, "pages.contact"));
    entries.extend([
        entry(PagesContact, "Address", "pages.contact.address"),
        entry(PagesContact, "Phone", "pages.contact.phone"),
        entry(PagesContact, "Email", "pages.contact.email"),
        entry(PagesContact, "Enable contact form", "pages.contact.contactForm.enabled"),
        entry(PagesContact, "Submit button label", "pages.contact.contactForm.submitLabel"),
        entry(PagesContact, "Success message", "pages.contact.contactForm.successMessage"),
    ]);

    Registry::new(entries)
}
