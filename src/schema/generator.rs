//! Derive object schemas from record descriptions.
//!
//! Types opt in by implementing [`DescribeRecord`], listing their fields with
//! [`FieldDescriptor`]s. There is no runtime reflection: the description is
//! written next to the type and the generator only walks it.
//!
//! ```
//! use cadre::schema::{schema_for, DescribeRecord, FieldDescriptor, RecordDescription};
//!
//! #[derive(serde::Deserialize)]
//! struct Forecast {
//!     city: String,
//!     days: Option<u32>,
//! }
//!
//! impl DescribeRecord for Forecast {
//!     fn describe() -> RecordDescription {
//!         RecordDescription::new("Forecast")
//!             .field(FieldDescriptor::of::<String>("city").describe("City name"))
//!             .field(FieldDescriptor::of::<Option<u32>>("days"))
//!     }
//! }
//!
//! let schema = schema_for::<Forecast>().unwrap();
//! assert!(schema.is_required("city"));
//! assert!(!schema.is_required("days"));
//! ```

use std::collections::HashMap;

use super::{Schema, SchemaKind};
use crate::error::{CadreError, Result};

/// Primitive kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Anything else; generation fails with `UnsupportedFieldType`.
    Unsupported(&'static str),
}

impl FieldKind {
    fn schema_kind(self) -> Option<SchemaKind> {
        match self {
            Self::String => Some(SchemaKind::String),
            Self::Integer => Some(SchemaKind::Integer),
            Self::Number => Some(SchemaKind::Number),
            Self::Boolean => Some(SchemaKind::Boolean),
            Self::Unsupported(_) => None,
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Unsupported(name) => name,
        }
    }
}

/// Maps a Rust type to its field kind and optionality.
pub trait FieldType {
    const KIND: FieldKind;
    const OPTIONAL: bool = false;
}

macro_rules! field_type {
    ($kind:ident => $($ty:ty),+) => {
        $(impl FieldType for $ty {
            const KIND: FieldKind = FieldKind::$kind;
        })+
    };
}

field_type!(String => String, &str, char);
field_type!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
field_type!(Number => f32, f64);
field_type!(Boolean => bool);

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = T::KIND;
    const OPTIONAL: bool = true;
}

impl<T> FieldType for Vec<T> {
    const KIND: FieldKind = FieldKind::Unsupported("array");
}

impl<K, V> FieldType for HashMap<K, V> {
    const KIND: FieldKind = FieldKind::Unsupported("map");
}

impl FieldType for serde_json::Value {
    const KIND: FieldKind = FieldKind::Unsupported("any");
}

/// Metadata for one field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    rename: Option<String>,
    description: Option<String>,
    optional: bool,
    skip: bool,
    kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            rename: None,
            description: None,
            optional: false,
            skip: false,
            kind,
        }
    }

    /// Kind and optionality taken from the Rust type (`Option<T>` is optional).
    pub fn of<T: FieldType>(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, T::KIND);
        field.optional = T::OPTIONAL;
        field
    }

    /// Override the name the model sees (serde `rename`).
    pub fn rename(mut self, wire_name: impl Into<String>) -> Self {
        self.rename = Some(wire_name.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Leave the field out of the schema entirely (serde `skip`).
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Name exposed to the model, or `None` when the field is not exposed.
    pub fn wire_name(&self) -> Option<&str> {
        if self.skip {
            return None;
        }
        let wire = self.rename.as_deref().unwrap_or(&self.name);
        (!wire.is_empty()).then_some(wire)
    }
}

/// Ordered field list of a record type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDescription {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Implemented by argument types that can describe their own fields.
pub trait DescribeRecord {
    fn describe() -> RecordDescription;
}

/// Build an object schema from a record description.
///
/// Properties follow field declaration order. Every exposed field not marked
/// optional lands in `required`.
pub fn generate_schema(record: &RecordDescription) -> Result<Schema> {
    let mut schema = Schema::empty();
    schema.description = record.description.clone();

    for field in &record.fields {
        let Some(wire_name) = field.wire_name() else {
            continue;
        };
        let kind = field
            .kind
            .schema_kind()
            .ok_or_else(|| CadreError::UnsupportedFieldType {
                field: format!("{}.{}", record.name, field.name),
                type_name: field.kind.type_name().to_string(),
            })?;
        if schema.property(wire_name).is_some() {
            return Err(CadreError::Configuration(format!(
                "{}: duplicate wire name '{}'",
                record.name, wire_name
            )));
        }

        let mut leaf = Schema::leaf(kind);
        leaf.description = field.description.clone();
        schema.insert_property(wire_name.to_string(), leaf, !field.optional);
    }

    Ok(schema)
}

/// Generate the schema for a [`DescribeRecord`] type.
pub fn schema_for<T: DescribeRecord>() -> Result<Schema> {
    generate_schema(&T::describe())
}
