//! # List Editing
//!
//! Append, remove and reorder items of any list in a document. When the
//! schema declares that a list tracks `order`, every operation leaves the
//! items numbered `0..n` in list position, with no gaps or duplicates.

use crate::document::ContentDocument;
use crate::path::PathError;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Value at {0} is not a list")]
    NotAList(String),

    #[error("No default item declared for list {0}")]
    UnknownList(String),

    #[error("Index {index} out of bounds for list {path} of length {len}")]
    IndexOutOfBounds { path: String, index: usize, len: usize },
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `-1` is up, `+1` is down
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta {
            -1 => Some(Direction::Up),
            1 => Some(Direction::Down),
            _ => None,
        }
    }

    fn target(&self, index: usize) -> Option<usize> {
        match self {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        }
    }
}

/// List operations driven by a schema
#[derive(Debug, Clone, Copy)]
pub struct ArrayEditor<'s> {
    schema: &'s Schema,
}

impl ArrayEditor<'static> {
    pub fn site() -> Self {
        Self::new(Schema::site())
    }
}

impl<'s> ArrayEditor<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    fn ordered(&self, path: &str) -> bool {
        self.schema.list_at(path).is_some_and(|list| list.ordered)
    }

    /// Push `item`, or the schema's empty item, and return its index.
    /// A missing list is created.
    pub fn append(
        &self,
        document: &mut ContentDocument,
        path: &str,
        item: Option<Value>,
    ) -> Result<usize, ArrayError> {
        let list = self.schema.list_at(path);
        if item.is_none() && list.is_none() {
            return Err(ArrayError::UnknownList(path.to_string()));
        }
        if document.get(path).map_or(true, Value::is_null) {
            document.set(path, json!([]))?;
        }
        let items = list_mut(document, path)?;
        let index = items.len();
        let item = match (item, list) {
            (Some(item), _) => item,
            (None, Some(list)) => list.default_item(index),
            (None, None) => return Err(ArrayError::UnknownList(path.to_string())),
        };
        items.push(item);
        self.renumber(path, items);
        Ok(index)
    }

    /// Delete the item at `index` and return it
    pub fn remove(
        &self,
        document: &mut ContentDocument,
        path: &str,
        index: usize,
    ) -> Result<Value, ArrayError> {
        let items = list_mut(document, path)?;
        if index >= items.len() {
            return Err(ArrayError::IndexOutOfBounds {
                path: path.to_string(),
                index,
                len: items.len(),
            });
        }
        let removed = items.remove(index);
        self.renumber(path, items);
        Ok(removed)
    }

    /// Swap the item at `index` with its neighbour. Returns `false`, leaving
    /// the list untouched, when the neighbour would fall off either end.
    pub fn move_item(
        &self,
        document: &mut ContentDocument,
        path: &str,
        index: usize,
        direction: Direction,
    ) -> Result<bool, ArrayError> {
        let items = list_mut(document, path)?;
        if index >= items.len() {
            return Err(ArrayError::IndexOutOfBounds {
                path: path.to_string(),
                index,
                len: items.len(),
            });
        }
        let target = match direction.target(index) {
            Some(target) if target < items.len() => target,
            _ => return Ok(false),
        };
        items.swap(index, target);
        self.renumber(path, items);
        Ok(true)
    }

    fn renumber(&self, path: &str, items: &mut [Value]) {
        if !self.ordered(path) {
            return;
        }
        for (index, item) in items.iter_mut().enumerate() {
            if let Value::Object(fields) = item {
                fields.insert("order".to_string(), json!(index));
            }
        }
    }
}

fn list_mut<'d>(document: &'d mut ContentDocument, path: &str) -> Result<&'d mut Vec<Value>, ArrayError> {
    match document.get_mut(path) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Err(ArrayError::IndexOutOfBounds {
            path: path.to_string(),
            index: 0,
            len: 0,
        }),
        Some(_) => Err(ArrayError::NotAList(path.to_string())),
    }
}
