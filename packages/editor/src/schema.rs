//! # Document Schema
//!
//! Declarative shape of the site content document. The validator, the
//! array editor and the section registry all read the same tree:
//!
//! - the validator walks it to collect per-field errors
//! - the array editor asks it whether a list tracks `order` and what an
//!   empty item looks like
//! - the registry resolves its field paths against it at startup

use crate::path::{FieldPath, Segment};
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// How a text field is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    Plain,
    /// Optional, but a present value must not be blank
    NotBlank,
    /// Required whenever the named sibling is filled in
    PairedWith(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextRule),
    Number,
    Flag,
    /// `{url, alt}` record
    Image,
    Object(Vec<Field>),
    List(ListShape),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListShape {
    pub item: Box<Shape>,
    /// Items carry an `order` property equal to their index
    pub ordered: bool,
    pub min_items: usize,
}

impl ListShape {
    /// Empty-shaped item for position `index`
    pub fn default_item(&self, index: usize) -> Value {
        let mut item = self.item.default_value();
        if self.ordered {
            if let Value::Object(map) = &mut item {
                map.insert("order".to_string(), json!(index));
            }
        }
        item
    }
}

impl Shape {
    /// Structurally valid empty value for this shape
    pub fn default_value(&self) -> Value {
        match self {
            Shape::Text(_) => json!(""),
            Shape::Number => json!(0),
            Shape::Flag => json!(false),
            Shape::Image => json!({ "url": "", "alt": "" }),
            Shape::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|field| (field.name.to_string(), field.shape.default_value()))
                    .collect::<Map<_, _>>(),
            ),
            Shape::List(_) => json!([]),
        }
    }

    fn child(&self, segment: &Segment) -> Option<&Shape> {
        match (self, segment) {
            (Shape::Object(fields), Segment::Key(key)) => fields
                .iter()
                .find(|field| field.name == key.as_str())
                .map(|field| &field.shape),
            (Shape::List(list), Segment::Index(_)) => Some(&list.item),
            (Shape::Image, Segment::Key(key)) if key == "url" || key == "alt" => {
                Some(&TEXT_PLAIN)
            }
            _ => None,
        }
    }
}

static TEXT_PLAIN: Shape = Shape::Text(TextRule::Plain);

/// Root of a document schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root: Shape,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            root: Shape::Object(fields),
        }
    }

    /// Schema of the bilingual site content
    pub fn site() -> &'static Schema {
        static SITE: OnceLock<Schema> = OnceLock::new();
        SITE.get_or_init(site_schema)
    }

    pub fn root(&self) -> &Shape {
        &self.root
    }

    /// Shape declared at `path`, if the path exists in the schema
    pub fn resolve(&self, path: &str) -> Option<&Shape> {
        let path = FieldPath::parse(path).ok()?;
        path.segments()
            .iter()
            .try_fold(&self.root, |shape, segment| shape.child(segment))
    }

    pub fn list_at(&self, path: &str) -> Option<&ListShape> {
        match self.resolve(path)? {
            Shape::List(list) => Some(list),
            _ => None,
        }
    }
}

fn required(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: true,
    }
}

fn optional(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: false,
    }
}

fn text() -> Shape {
    Shape::Text(TextRule::Plain)
}

fn list(item: Shape, ordered: bool, min_items: usize) -> Shape {
    Shape::List(ListShape {
        item: Box::new(item),
        ordered,
        min_items,
    })
}

fn nav_item() -> Shape {
    Shape::Object(vec![
        required("title", text()),
        required("path", text()),
        required("order", Shape::Number),
    ])
}

fn page(extra: Vec<Field>) -> Shape {
    let mut fields = vec![
        required("slug", text()),
        required("title", text()),
        optional("subtitle", text()),
        optional("body", text()),
        optional("hero", Shape::Image),
        optional("gallery", list(Shape::Image, false, 0)),
    ];
    fields.extend(extra);
    Shape::Object(fields)
}

fn site_schema() -> Schema {
    let cta = Shape::Object(vec![
        optional("primaryLabel", Shape::Text(TextRule::PairedWith("primaryHref"))),
        optional("primaryHref", Shape::Text(TextRule::PairedWith("primaryLabel"))),
        optional("secondaryLabel", Shape::Text(TextRule::PairedWith("secondaryHref"))),
        optional("secondaryHref", Shape::Text(TextRule::PairedWith("secondaryLabel"))),
    ]);

    let program = Shape::Object(vec![
        required("title", text()),
        optional("description", text()),
        optional("sessionsLabel", text()),
        optional("image", Shape::Image),
    ]);

    let contact_form = Shape::Object(vec![
        optional("enabled", Shape::Flag),
        optional("submitLabel", Shape::Text(TextRule::NotBlank)),
        optional("successMessage", Shape::Text(TextRule::NotBlank)),
    ]);

    Schema::new(vec![
        required("brandName", text()),
        required(
            "navigation",
            Shape::Object(vec![
                required("header", Shape::Object(vec![required("items", list(nav_item(), true, 1))])),
                required(
                    "footer",
                    Shape::Object(vec![
                        required("items", list(nav_item(), true, 0)),
                        optional("legal", text()),
                    ]),
                ),
            ]),
        ),
        optional(
            "meta",
            Shape::Object(vec![optional("titleTemplate", text()), optional("description", text())]),
        ),
        required(
            "pages",
            Shape::Object(vec![
                required("home", page(vec![optional("cta", cta)])),
                required("about", page(vec![])),
                required("academy", page(vec![optional("programs", list(program, false, 0))])),
                required("incubator", page(vec![])),
                required("placement", page(vec![])),
                required(
                    "contact",
                    page(vec![
                        optional("address", text()),
                        optional("phone", text()),
                        optional("email", text()),
                        optional("contactForm", contact_form),
                    ]),
                ),
            ]),
        ),
    ])
}
