//! Schema-driven validation.
//!
//! Validation walks the whole document and reports every offending field,
//! keyed by its field path, so an editor can highlight all of them at once.

use crate::document::ContentDocument;
use crate::path::FieldPath;
use crate::schema::{Field, ListShape, Schema, Shape, TextRule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const REQUIRED: &str = "required field";
pub const IMAGE_URL_REQUIRED: &str = "image url is required";
pub const IMAGE_ALT_REQUIRED: &str = "image alt text is required";
pub const NOT_BLANK: &str = "must not be blank";
pub const NOT_A_NUMBER: &str = "must be a number";
pub const NOT_AN_OBJECT: &str = "must be an object";
pub const NOT_A_LIST: &str = "must be a list";

/// Field path → message. Empty means the document can be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.insert(path.into(), message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, message)| (path.as_str(), message.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Drop the error recorded at exactly `path`
    pub fn clear(&mut self, path: &str) {
        self.0.remove(path);
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    /// Drop errors at `path` and everything beneath it
    pub fn clear_under(&mut self, path: &FieldPath) {
        self.0.retain(|key, _| !path.contains(key));
    }

    /// One-line summary, `path: message` pairs joined by commas
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(path, message)| format!("{}: {}", path, message))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Validate a document against the site schema.
pub fn validate(document: &ContentDocument) -> ValidationErrors {
    Schema::site().validate(document.as_value())
}

impl Schema {
    /// Validate any JSON tree against this schema. Never panics.
    pub fn validate(&self, value: &Value) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check(self.root(), Some(value), true, "", None, &mut errors);
        errors
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn filled(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|text| !text.trim().is_empty())
}

fn check(
    shape: &Shape,
    value: Option<&Value>,
    required: bool,
    path: &str,
    siblings: Option<&Map<String, Value>>,
    errors: &mut ValidationErrors,
) {
    let value = present(value);
    match shape {
        Shape::Text(rule) => check_text(*rule, value, required, path, siblings, errors),
        Shape::Number => {
            if required && !value.is_some_and(Value::is_number) {
                errors.insert(path, NOT_A_NUMBER);
            }
        }
        Shape::Flag => {}
        Shape::Image => match value {
            Some(Value::Object(image)) => {
                if !filled(image.get("url")) {
                    errors.insert(join(path, "url"), IMAGE_URL_REQUIRED);
                }
                if !filled(image.get("alt")) {
                    errors.insert(join(path, "alt"), IMAGE_ALT_REQUIRED);
                }
            }
            Some(_) => errors.insert(path, NOT_AN_OBJECT),
            None if required => errors.insert(path, REQUIRED),
            None => {}
        },
        Shape::Object(fields) => match value {
            Some(Value::Object(map)) => check_fields(fields, Some(map), path, errors),
            Some(_) => errors.insert(path, NOT_AN_OBJECT),
            // A missing required container still reports its required fields
            None if required => check_fields(fields, None, path, errors),
            None => {}
        },
        Shape::List(list) => check_list(list, value, required, path, errors),
    }
}

fn check_fields(
    fields: &[Field],
    map: Option<&Map<String, Value>>,
    path: &str,
    errors: &mut ValidationErrors,
) {
    for field in fields {
        let child = map.and_then(|m| m.get(field.name));
        check(&field.shape, child, field.required, &join(path, field.name), map, errors);
    }
}

fn check_text(
    rule: TextRule,
    value: Option<&Value>,
    required: bool,
    path: &str,
    siblings: Option<&Map<String, Value>>,
    errors: &mut ValidationErrors,
) {
    if filled(value) {
        return;
    }
    if required {
        errors.insert(path, REQUIRED);
        return;
    }
    match rule {
        TextRule::Plain => {}
        TextRule::NotBlank => {
            if value.and_then(Value::as_str).is_some_and(|text| !text.is_empty()) {
                errors.insert(path, NOT_BLANK);
            }
        }
        TextRule::PairedWith(other) => {
            if filled(siblings.and_then(|s| s.get(other))) {
                errors.insert(path, format!("required when {} is set", other));
            }
        }
    }
}

fn check_list(
    list: &ListShape,
    value: Option<&Value>,
    required: bool,
    path: &str,
    errors: &mut ValidationErrors,
) {
    let items: &[Value] = match value {
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            errors.insert(path, NOT_A_LIST);
            return;
        }
        None if required => &[],
        None => return,
    };
    if items.len() < list.min_items {
        let message = if list.min_items == 1 {
            "at least one item is required".to_string()
        } else {
            format!("at least {} items are required", list.min_items)
        };
        errors.insert(path, message);
    }
    for (index, item) in items.iter().enumerate() {
        check(&list.item, Some(item), true, &join(path, &index.to_string()), None, errors);
    }
}
