//! # Content Document
//!
//! A ContentDocument is one locale's full site content. It is kept as a JSON
//! tree so that field paths can address any node and unknown fields survive
//! a round trip; the typed [`SiteContent`] view is used to check the
//! payload's shape and to build documents in code.
//!
//! ## Lifecycle
//!
//! ```text
//! Store → parse → Baseline ──clone──→ Draft → set_field/reset → validate → commit
//!                    ↑                                                       │
//!                    └────────────────── committed snapshot ─────────────────┘
//! ```

use crate::path::{self, PathError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Payload rejected before validation because its overall shape is wrong
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid content shape: {0}")]
pub struct ShapeError(pub String);

/// Editable site content for one locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument(Value);

impl ContentDocument {
    /// Check the payload's shape and wrap it.
    pub fn parse(value: Value) -> Result<Self, ShapeError> {
        let object = value
            .as_object()
            .ok_or_else(|| ShapeError("site content must be an object".to_string()))?;

        if !object.get("brandName").is_some_and(Value::is_string) {
            return Err(ShapeError("brandName is missing or not a string".to_string()));
        }
        if !object.get("navigation").is_some_and(Value::is_object) {
            return Err(ShapeError("navigation is missing or not an object".to_string()));
        }
        let pages = object
            .get("pages")
            .and_then(Value::as_object)
            .ok_or_else(|| ShapeError("pages is missing or not an object".to_string()))?;
        for key in PAGE_KEYS {
            if !pages.get(key).is_some_and(Value::is_object) {
                return Err(ShapeError(format!("missing page definition for {}", key)));
            }
        }
        for list in ["navigation.header.items", "navigation.footer.items"] {
            if !path::get(&value, list).is_some_and(Value::is_array) {
                return Err(ShapeError(format!("{} must be a list", list)));
            }
        }

        // Field types are checked by the typed view; extra fields stay in the tree
        serde_json::from_value::<SiteContent>(value.clone())
            .map_err(|e| ShapeError(e.to_string()))?;

        Ok(Self(value))
    }

    /// Wrap a tree without shape checks (drafts may be mid-edit)
    pub fn from_value_unchecked(value: Value) -> Self {
        Self(value)
    }

    pub fn from_site(content: &SiteContent) -> Self {
        // SiteContent only holds strings, numbers and bools
        Self(serde_json::to_value(content).unwrap_or(Value::Null))
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path::get(&self.0, path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        path::get_mut(&mut self.0, path)
    }

    pub fn set(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        path::set(&mut self.0, path, value)
    }

    pub fn remove(&mut self, path: &str) -> Result<Option<Value>, PathError> {
        path::remove(&mut self.0, path)
    }

    /// String at `path`, if the node is a string
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Typed view of the document
    pub fn to_site(&self) -> Result<SiteContent, ShapeError> {
        serde_json::from_value(self.0.clone()).map_err(|e| ShapeError(e.to_string()))
    }
}

/// Opaque marker of the stored revision a document was read at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(pub String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pages every document must define
pub const PAGE_KEYS: [&str; 6] = ["home", "about", "academy", "incubator", "placement", "contact"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub brand_name: String,
    pub navigation: Navigation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaDefaults>,
    pub pages: Pages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub header: NavList,
    pub footer: FooterNav,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavList {
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterNav {
    pub items: Vec<NavItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub order: u32,
}

impl NavItem {
    pub fn new(title: &str, path: &str, order: u32) -> Self {
        Self {
            title: title.to_string(),
            path: path.to_string(),
            order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Fields shared by every page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageCommon {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<ImageItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<ImageItem>>,
}

impl PageCommon {
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomePage {
    #[serde(flatten)]
    pub common: PageCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<CallToAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademyPage {
    #[serde(flatten)]
    pub common: PageCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<Program>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPage {
    #[serde(flatten)]
    pub common: PageCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_form: Option<ContactForm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pages {
    pub home: HomePage,
    pub about: PageCommon,
    pub academy: AcademyPage,
    pub incubator: PageCommon,
    pub placement: PageCommon,
    pub contact: ContactPage,
}
