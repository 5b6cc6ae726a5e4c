//! Compile-time schemas for generated documents.
//!
//! Validation walks fields in declared order and list items in order, and
//! stops at the first violation.

use crate::core::document::DocumentKind;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Len {
    AtLeast(usize),
    Exactly(usize),
}

#[derive(Debug, Clone, Copy)]
pub enum Item {
    Text,
    Any,
    Object(&'static ObjectSpec),
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Text,
    List { len: Len, item: Item },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
    /// Sibling list field whose strings must include this field's value.
    /// Checked right after this field's own shape.
    pub one_of: Option<&'static str>,
}

#[derive(Debug)]
pub struct ObjectSpec {
    pub fields: &'static [FieldSpec],
}

#[derive(Debug)]
pub struct SchemaDescriptor {
    pub kind: DocumentKind,
    pub root: ObjectSpec,
}

const fn required(name: &'static str, shape: Shape) -> FieldSpec {
    FieldSpec {
        name,
        shape,
        required: true,
        one_of: None,
    }
}

const fn optional(name: &'static str, shape: Shape) -> FieldSpec {
    FieldSpec {
        name,
        shape,
        required: false,
        one_of: None,
    }
}

const fn member_of(name: &'static str, among: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        shape: Shape::Text,
        required: true,
        one_of: Some(among),
    }
}

const fn non_empty(item: Item) -> Shape {
    Shape::List {
        len: Len::AtLeast(1),
        item,
    }
}

static MODULE: ObjectSpec = ObjectSpec {
    fields: &[
        required("module_title", Shape::Text),
        required("topics", Shape::List { len: Len::AtLeast(0), item: Item::Text }),
    ],
};

pub static ROADMAP: SchemaDescriptor = SchemaDescriptor {
    kind: DocumentKind::Roadmap,
    root: ObjectSpec {
        fields: &[
            required("course_title", Shape::Text),
            required("description", Shape::Text),
            required("level", Shape::Text),
            required("duration", Shape::Text),
            required("modules", non_empty(Item::Object(&MODULE))),
        ],
    },
};

static SECTION: ObjectSpec = ObjectSpec {
    fields: &[
        required("section_title", Shape::Text),
        required("content", Shape::Text),
        optional("code_example", Shape::Text),
    ],
};

static RESOURCE: ObjectSpec = ObjectSpec {
    fields: &[required("title", Shape::Text), required("url", Shape::Text)],
};

pub static TUTORIAL: SchemaDescriptor = SchemaDescriptor {
    kind: DocumentKind::Tutorial,
    root: ObjectSpec {
        fields: &[
            required("title", Shape::Text),
            required("estimated_time", Shape::Text),
            required("overview", Shape::Text),
            required("sections", non_empty(Item::Object(&SECTION))),
            required("practice_exercises", non_empty(Item::Any)),
            required(
                "additional_resources",
                Shape::List { len: Len::AtLeast(0), item: Item::Object(&RESOURCE) },
            ),
            optional("prerequisites", non_empty(Item::Text)),
        ],
    },
};

static QUESTION: ObjectSpec = ObjectSpec {
    fields: &[
        required("question", Shape::Text),
        required("options", Shape::List { len: Len::Exactly(4), item: Item::Text }),
        member_of("correct_answer", "options"),
        required("explanation", Shape::Text),
    ],
};

pub static QUIZ: SchemaDescriptor = SchemaDescriptor {
    kind: DocumentKind::Quiz,
    root: ObjectSpec {
        fields: &[
            required("title", Shape::Text),
            required("description", Shape::Text),
            required("questions", non_empty(Item::Object(&QUESTION))),
        ],
    },
};

pub fn schema_for(kind: DocumentKind) -> &'static SchemaDescriptor {
    match kind {
        DocumentKind::Roadmap => &ROADMAP,
        DocumentKind::Tutorial => &TUTORIAL,
        DocumentKind::Quiz => &QUIZ,
    }
}

pub fn validate(doc: &Value, schema: &SchemaDescriptor) -> ValidationResult {
    let Some(object) = doc.as_object() else {
        return ValidationResult::Invalid(format!("{} must be a JSON object", schema.kind));
    };
    match check_object(object, &schema.root, "") {
        Ok(()) => ValidationResult::Valid,
        Err(reason) => ValidationResult::Invalid(reason),
    }
}

fn check_object(object: &Map<String, Value>, spec: &ObjectSpec, path: &str) -> Result<(), String> {
    for field in spec.fields {
        let location = format!("{}{}", path, field.name);
        match object.get(field.name) {
            None if field.required => {
                return Err(format!("Missing required field: {}", location));
            }
            None => {}
            Some(value) => {
                check_shape(value, &field.shape, &location)?;
                if let Some(among) = field.one_of {
                    check_member(value, object.get(among), &location, &format!("{}{}", path, among))?;
                }
            }
        }
    }
    Ok(())
}

fn check_member(
    value: &Value,
    options: Option<&Value>,
    location: &str,
    options_location: &str,
) -> Result<(), String> {
    let options = options.and_then(Value::as_array);
    let found = options.map_or(false, |items| items.iter().any(|o| o.as_str() == value.as_str()));
    if found {
        Ok(())
    } else {
        Err(format!("Field '{}' must be one of '{}'", location, options_location))
    }
}

fn check_shape(value: &Value, shape: &Shape, location: &str) -> Result<(), String> {
    match shape {
        Shape::Text => {
            if !value.is_string() {
                return Err(format!("Field '{}' must be a string", location));
            }
        }
        Shape::List { len, item } => {
            let Some(items) = value.as_array() else {
                return Err(format!("Field '{}' must be a list", location));
            };
            match len {
                Len::AtLeast(min) if items.len() < *min => {
                    return Err(if *min == 1 {
                        format!("Field '{}' must be a non-empty list", location)
                    } else {
                        format!("Field '{}' must have at least {} items", location, min)
                    });
                }
                Len::Exactly(n) if items.len() != *n => {
                    return Err(format!("Field '{}' must have exactly {} items", location, n));
                }
                _ => {}
            }
            for (index, element) in items.iter().enumerate() {
                let element_location = format!("{}[{}]", location, index);
                match item {
                    Item::Any => {}
                    Item::Text => {
                        if !element.is_string() {
                            return Err(format!("Field '{}' must be a string", element_location));
                        }
                    }
                    Item::Object(spec) => {
                        let Some(object) = element.as_object() else {
                            return Err(format!("Field '{}' must be an object", element_location));
                        };
                        check_object(object, spec, &format!("{}.", element_location))?;
                    }
                }
            }
        }
    }
    Ok(())
}
