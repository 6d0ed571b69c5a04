//! # Folio Editor
//!
//! Path-addressed editing of the bilingual site content document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: section → {label, path} catalog   │
//! └─────────────────────────────────────────────┘
//!                     ↓ field paths
//! ┌─────────────────────────────────────────────┐
//! │ draft: per-locale drafts + baselines        │
//! │  - set/reset fields and sections            │
//! │  - list edits through the array editor      │
//! │  - dirty tracking, recorded errors          │
//! └─────────────────────────────────────────────┘
//!                     ↓ validate
//! ┌─────────────────────────────────────────────┐
//! │ schema + validate: path → message map       │
//! └─────────────────────────────────────────────┘
//!                     ↓ commit
//! ┌─────────────────────────────────────────────┐
//! │ session: ContentSink (persistence gateway)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Paths are the API**: every field, list item and section is
//!    addressed by a dot/index path checked against the schema
//! 2. **Drafts are copy-on-write**: a failed edit or commit never touches
//!    the published draft
//! 3. **Invalid documents never leave the editor**: the sink only sees
//!    drafts with an empty error map
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Baseline, DraftStore, EditSession, CommitOutcome};
//!
//! let store = DraftStore::new(baselines, Locale::He)?;
//! let mut session = EditSession::new(store, gateway);
//!
//! session.set_field("pages.contact.email", json!("hello@example.com"))?;
//! session.append_item("navigation.header.items", None)?;
//!
//! match session.commit(Locale::He).await? {
//!     CommitOutcome::Committed(version) => println!("saved at {}", version),
//!     CommitOutcome::Invalid(errors) => println!("{}", errors.summary()),
//! }
//! ```

mod array;
mod document;
mod draft;
mod errors;
mod path;
mod registry;
mod schema;
mod session;
mod validate;

pub use array::{ArrayEditor, ArrayError, Direction};
pub use document::{
    AcademyPage, CallToAction, ContactForm, ContactPage, ContentDocument, FooterNav, HomePage,
    ImageItem, MetaDefaults, NavItem, NavList, Navigation, PageCommon, Pages, Program,
    ShapeError, SiteContent, VersionToken, PAGE_KEYS,
};
pub use draft::{Baseline, DraftStore};
pub use errors::EditorError;
pub use path::{Container, FieldPath, PathError, Segment};
pub use registry::{FieldEntry, Registry, RegistryError, SectionGroup, SectionKey, SectionMatch};
pub use schema::{Field, ListShape, Schema, Shape, TextRule};
pub use session::{CommitOutcome, ContentSink, EditSession};
pub use validate::{validate, ValidationErrors};

// Re-export common types for convenience
pub use folio_common::Locale;
