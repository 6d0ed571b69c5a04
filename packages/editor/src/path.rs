//! # Field Paths
//!
//! Dot-separated addresses into a content document. All-digit segments
//! index into lists, every other segment is an object key:
//!
//! ```text
//! pages.academy.programs.2.image.alt
//! └─key─┘└─key──┘└──key──┘│└─key┘└key┘
//!                       index
//! ```
//!
//! ## Write semantics
//!
//! `set` creates missing or null intermediates, choosing a list when the
//! next segment is an index and an object otherwise. An existing child of
//! the wrong container kind is never replaced; the write fails with
//! [`PathError::ShapeMismatch`] so the caller sees the typo instead of
//! losing a subtree. List indices may address an existing item or the
//! slot just past the end; anything further is
//! [`PathError::IndexOutOfRange`].

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Malformed path: {0:?}")]
    Malformed(String),

    #[error("Expected {expected} at segment {segment:?} of path {path:?}")]
    ShapeMismatch {
        path: String,
        segment: String,
        expected: Container,
    },

    #[error("Index {index} of path {path:?} is past the end of a list of {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Container kind a path segment requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    List,
    Object,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::List => f.write_str("list"),
            Container::Object => f.write_str("object"),
        }
    }
}

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = raw.parse() {
                return Segment::Index(index);
            }
        }
        Segment::Key(raw.to_string())
    }

    fn container(&self) -> Container {
        match self {
            Segment::Key(_) => Container::Object,
            Segment::Index(_) => Container::List,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Parsed field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() || raw.split('.').any(str::is_empty) {
            return Err(PathError::Malformed(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments: raw.split('.').map(Segment::parse).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if `other` is this path or lies underneath it
    pub fn contains(&self, other: &str) -> bool {
        other == self.raw
            || other
                .strip_prefix(self.raw.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Read the value at `path`, or `None` when any step is missing.
///
/// A stored `null` is returned as is; a `null` part way along the path
/// counts as missing. Malformed paths resolve to `None`; reads never fail.
pub fn get<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path = FieldPath::parse(path).ok()?;
    let mut current = document;
    for segment in path.segments() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            // Objects with numeric keys are still addressable
            (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get`]; never creates anything.
pub fn get_mut<'a>(document: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let path = FieldPath::parse(path).ok()?;
    let mut current = document;
    for segment in path.segments() {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Segment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediates as needed.
pub fn set(document: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let parsed = FieldPath::parse(path)?;
    let segments = parsed.segments();
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| PathError::Malformed(path.to_string()))?;

    let mut current = document;
    for (position, segment) in parents.iter().enumerate() {
        let next = &segments[position + 1];
        let child = child_slot(current, segment, path)?;
        if child.is_null() {
            *child = match next.container() {
                Container::List => Value::Array(Vec::new()),
                Container::Object => Value::Object(Map::new()),
            };
        }
        let fits = match next.container() {
            Container::List => child.is_array(),
            Container::Object => child.is_object(),
        };
        if !fits {
            return Err(PathError::ShapeMismatch {
                path: path.to_string(),
                segment: segment.to_string(),
                expected: next.container(),
            });
        }
        current = child;
    }

    *child_slot(current, last, path)? = value;
    Ok(())
}

/// Remove the value at `path`. Removing from a list shifts later items.
pub fn remove(document: &mut Value, path: &str) -> Result<Option<Value>, PathError> {
    let parsed = FieldPath::parse(path)?;
    let segments = parsed.segments();
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| PathError::Malformed(path.to_string()))?;

    let mut current = document;
    for segment in parents {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => match map.get_mut(key) {
                Some(child) => child,
                None => return Ok(None),
            },
            (Segment::Index(index), Value::Array(items)) => match items.get_mut(*index) {
                Some(child) => child,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
    }

    Ok(match (last, current) {
        (Segment::Key(key), Value::Object(map)) => map.remove(key),
        (Segment::Index(index), Value::Array(items)) if *index < items.len() => {
            Some(items.remove(*index))
        }
        _ => None,
    })
}

/// Mutable slot for `segment` inside `container`. An index equal to the
/// list length appends a `null` slot.
fn child_slot<'a>(
    container: &'a mut Value,
    segment: &Segment,
    path: &str,
) -> Result<&'a mut Value, PathError> {
    match (segment, container) {
        (Segment::Key(key), Value::Object(map)) => Ok(map.entry(key.clone()).or_insert(Value::Null)),
        (Segment::Index(index), Value::Array(items)) => {
            let len = items.len();
            if *index > len {
                return Err(PathError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *index,
                    len,
                });
            }
            if *index == len {
                items.push(Value::Null);
            }
            Ok(&mut items[*index])
        }
        (segment, _) => Err(PathError::ShapeMismatch {
            path: path.to_string(),
            segment: segment.to_string(),
            expected: segment.container(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "brandName": "Folio",
            "navigation": {
                "header": { "items": [{ "title": "Home", "path": "/", "order": 0 }] }
            },
            "pages": { "contact": { "email": "" } }
        })
    }

    #[test]
    fn test_get_nested_and_indexed() {
        let doc = sample();
        assert_eq!(get(&doc, "brandName"), Some(&json!("Folio")));
        assert_eq!(
            get(&doc, "navigation.header.items.0.title"),
            Some(&json!("Home"))
        );
        assert_eq!(get(&doc, "navigation.header.items.3.title"), None);
        assert_eq!(get(&doc, "pages.about.title"), None);
        assert_eq!(get(&doc, "brandName.length"), None);
        assert_eq!(get(&doc, ""), None);
    }

    #[test]
    fn test_set_round_trip() {
        let mut doc = sample();
        set(&mut doc, "pages.contact.email", json!("a@b.com")).unwrap();
        assert_eq!(get(&doc, "pages.contact.email"), Some(&json!("a@b.com")));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = sample();
        set(&mut doc, "pages.academy.programs.0.image.alt", json!("Class")).unwrap();
        assert_eq!(
            doc["pages"]["academy"]["programs"],
            json!([{ "image": { "alt": "Class" } }])
        );
    }

    #[test]
    fn test_set_appends_at_list_end_only() {
        let mut doc = json!({ "items": ["a"] });
        set(&mut doc, "items.1", json!("b")).unwrap();
        assert_eq!(doc["items"], json!(["a", "b"]));

        let err = set(&mut doc, "items.4000000000", json!("x")).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                path: "items.4000000000".to_string(),
                index: 4_000_000_000,
                len: 2,
            }
        );
        let err = set(&mut doc, "items.5.title", json!("x")).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfRange { index: 5, len: 2, .. }));
        assert_eq!(doc["items"], json!(["a", "b"]));
    }

    #[test]
    fn test_get_keeps_stored_null() {
        let mut doc = json!({ "pages": { "home": { "subtitle": null, "cta": null } } });
        assert_eq!(get(&doc, "pages.home.subtitle"), Some(&Value::Null));
        assert_eq!(get(&doc, "pages.home.cta.primaryLabel"), None);
        assert_eq!(get(&doc, "pages.home.body"), None);

        set(&mut doc, "pages.home.body", Value::Null).unwrap();
        assert_eq!(get(&doc, "pages.home.body"), Some(&Value::Null));
    }

    #[test]
    fn test_set_leaves_siblings_untouched() {
        let mut doc = sample();
        let before = doc.clone();
        set(&mut doc, "navigation.header.items.0.title", json!("Start")).unwrap();
        assert_eq!(get(&doc, "brandName"), get(&before, "brandName"));
        assert_eq!(
            get(&doc, "navigation.header.items.0.path"),
            get(&before, "navigation.header.items.0.path")
        );
        assert_eq!(get(&doc, "pages"), get(&before, "pages"));
    }

    #[test]
    fn test_set_refuses_to_coerce_existing_value() {
        let mut doc = sample();
        let err = set(&mut doc, "brandName.0", json!("x")).unwrap_err();
        assert_eq!(
            err,
            PathError::ShapeMismatch {
                path: "brandName.0".to_string(),
                segment: "brandName".to_string(),
                expected: Container::List,
            }
        );

        let err = set(&mut doc, "navigation.header.items.title", json!("x")).unwrap_err();
        assert!(matches!(err, PathError::ShapeMismatch { expected: Container::Object, .. }));
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_malformed_paths() {
        let mut doc = sample();
        assert!(matches!(set(&mut doc, "", json!(1)), Err(PathError::Malformed(_))));
        assert!(matches!(set(&mut doc, "a..b", json!(1)), Err(PathError::Malformed(_))));
        assert!(matches!(FieldPath::parse("pages."), Err(PathError::Malformed(_))));
    }

    #[test]
    fn test_remove() {
        let mut doc = sample();
        let removed = remove(&mut doc, "navigation.header.items.0").unwrap();
        assert_eq!(removed.unwrap()["title"], json!("Home"));
        assert_eq!(doc["navigation"]["header"]["items"], json!([]));
        assert_eq!(remove(&mut doc, "pages.home.title").unwrap(), None);
    }

    #[test]
    fn test_contains() {
        let path = FieldPath::parse("pages.home").unwrap();
        assert!(path.contains("pages.home"));
        assert!(path.contains("pages.home.cta.primaryHref"));
        assert!(!path.contains("pages.homepage"));
        assert!(!path.contains("pages"));
    }
}
