//! Argument validation and coercion against a tool's input schema
//!
//! Models are loose with primitive types (`"5"` for an integer, `42` for a
//! string). Arguments are coerced toward the declared type before the tool
//! sees them; anything that cannot be coerced is an invalid argument.

use serde_json::{Map, Number, Value};
use tracing::debug;

use super::ToolError;

/// Validate `input` against `schema`, returning the coerced argument object
pub fn coerce_arguments(schema: &Value, input: Value) -> Result<Value, ToolError> {
    let mut args = match input {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(ToolError::InvalidArgument(format!(
                "arguments must be a JSON object, got {}",
                type_name(&other)
            )));
        }
    };

    // null for an optional parameter means "not given"
    args.retain(|_, v| !v.is_null());

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(name) {
                debug!(%name, "coerce_arguments: missing required parameter");
                return Err(ToolError::InvalidArgument(format!("missing required parameter '{}'", name)));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let Some(declared) = property.get("type").and_then(Value::as_str) else {
                continue;
            };
            if let Some(value) = args.remove(name) {
                let coerced = coerce_value(value, declared)
                    .map_err(|got| ToolError::InvalidArgument(format!("'{}' must be {}, got {}", name, declared, got)))?;
                args.insert(name.clone(), coerced);
            }
        }
    }

    Ok(Value::Object(args))
}

/// Coerce one value toward `declared`; on failure returns the offending type name
fn coerce_value(value: Value, declared: &str) -> Result<Value, &'static str> {
    match (declared, value) {
        ("string", Value::String(s)) => Ok(Value::String(s)),
        ("string", Value::Number(n)) => Ok(Value::String(n.to_string())),
        ("string", Value::Bool(b)) => Ok(Value::String(b.to_string())),

        ("integer", Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
        ("integer", Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
            _ => Err("a fractional number"),
        },
        ("integer", Value::String(s)) => s.trim().parse::<i64>().map(Value::from).map_err(|_| "a string"),

        ("number", Value::Number(n)) => Ok(Value::Number(n)),
        ("number", Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or("a string"),

        ("boolean", Value::Bool(b)) => Ok(Value::Bool(b)),
        ("boolean", Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err("a string"),
        },

        ("string" | "integer" | "number" | "boolean", other) => Err(type_name(&other)),
        (_, other) => Ok(other),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
