//! Parameter schemas advertised to the model for each tool.
//!
//! A [`Schema`] is either a primitive leaf or an object whose properties keep
//! insertion order. The order survives serialization, so two identical tool
//! configurations always produce byte-identical tool menus.

pub mod generator;

pub use generator::{
    generate_schema, schema_for, DescribeRecord, FieldDescriptor, FieldKind, FieldType,
    RecordDescription,
};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// JSON Schema type of a [`Schema`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchemaKind {
    Object,
    String,
    Integer,
    Number,
    Boolean,
}

/// Structural description of a tool's arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    properties: Vec<(String, Schema)>,
    required: Vec<String>,
    description: Option<String>,
}

impl Schema {
    /// A primitive (or empty object) node.
    pub fn leaf(kind: SchemaKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            required: Vec::new(),
            description: None,
        }
    }

    /// An object schema with no properties.
    pub fn empty() -> Self {
        Self::leaf(SchemaKind::Object)
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            schema: Self::empty(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Properties in declaration order (empty for leaves).
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.properties.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, schema)| schema)
    }

    /// Required property names in declaration order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Insert or replace a property, keeping the original position on replace.
    pub(crate) fn insert_property(&mut self, name: String, schema: Schema, required: bool) {
        match self.properties.iter_mut().find(|(prop, _)| *prop == name) {
            Some(slot) => slot.1 = schema,
            None => self.properties.push((name.clone(), schema)),
        }
        self.required.retain(|r| *r != name);
        if required {
            self.required.push(name);
        }
    }

    /// Render as a JSON Schema value.
    ///
    /// `serde_json::Map` sorts keys, so prefer `serde_json::to_string` on the
    /// schema itself when property order matters.
    pub fn to_json(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.kind)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if self.kind == SchemaKind::Object {
            map.serialize_entry("properties", &OrderedProperties(&self.properties))?;
            map.serialize_entry("required", &self.required)?;
        }
        map.end()
    }
}

struct OrderedProperties<'a>(&'a [(String, Schema)]);

impl Serialize for OrderedProperties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

/// Builder for constructing tool parameter schemas by hand.
pub struct ParameterBuilder {
    schema: Schema,
}

impl ParameterBuilder {
    fn property(
        mut self,
        kind: SchemaKind,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let leaf = Schema::leaf(kind).with_description(description);
        self.schema.insert_property(name.into(), leaf, required);
        self
    }

    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(SchemaKind::String, name, description, required)
    }

    /// Add an integer property.
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(SchemaKind::Integer, name, description, required)
    }

    /// Add a number property.
    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(SchemaKind::Number, name, description, required)
    }

    /// Add a boolean property.
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(SchemaKind::Boolean, name, description, required)
    }

    /// Describe the object itself.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.schema.description = Some(description.into());
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}
