//! Validate tool call arguments against a tool's schema before execution.

use crate::schema::{Schema, SchemaKind};

/// Validate decoded arguments against a [`Schema`].
///
/// Checks the top-level shape, required field presence, and the primitive
/// type of every declared property. Undeclared properties pass through.
/// Returns `Err(message)` describing the first violation found.
pub fn validate_arguments(args: &serde_json::Value, schema: &Schema) -> Result<(), String> {
    if !value_matches_kind(args, schema.kind()) {
        return Err(format!(
            "expected {} arguments, got {}",
            schema.kind(),
            json_type_name(args)
        ));
    }

    let Some(obj) = args.as_object() else {
        return Ok(());
    };

    for name in schema.required() {
        match obj.get(name) {
            None | Some(serde_json::Value::Null) => {
                return Err(format!("missing required field '{name}'"));
            }
            Some(_) => {}
        }
    }

    for (key, prop_schema) in schema.properties() {
        let Some(value) = obj.get(key) else {
            continue;
        };
        if value.is_null() && !schema.is_required(key) {
            continue;
        }
        if !value_matches_kind(value, prop_schema.kind()) {
            return Err(format!(
                "field '{}' expected type '{}', got {}",
                key,
                prop_schema.kind(),
                json_type_name(value)
            ));
        }
    }

    Ok(())
}

fn value_matches_kind(value: &serde_json::Value, expected: SchemaKind) -> bool {
    match expected {
        SchemaKind::String => value.is_string(),
        SchemaKind::Number => value.is_number(),
        SchemaKind::Integer => value.is_i64() || value.is_u64(),
        SchemaKind::Boolean => value.is_boolean(),
        SchemaKind::Object => value.is_object(),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
