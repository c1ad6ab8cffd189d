//! Tool input schemas: generated from argument types, checked with Draft 7.

use jsonschema::{Draft, JSONSchema};
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::Value;

use crate::{Error, ErrorContext, Result};

/// Inline JSON schema for `T`, shaped for a tool's `parameters` field.
///
/// Subschemas are inlined; `Option` fields are left out of `required`
/// without a `null` type.
pub fn tool_parameters_for<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.option_add_null_type = false;
        s.option_nullable = false;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    value
}

/// Compiled argument validator for one tool.
pub struct ArgumentValidator {
    schema: JSONSchema,
}

impl ArgumentValidator {
    pub fn compile(schema: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| {
                Error::configuration_with_context(
                    "failed to compile tool schema",
                    ErrorContext::new().with_details(e.to_string()),
                )
            })?;
        Ok(Self { schema })
    }

    /// Check `arguments`; all violations are joined into one validation error.
    pub fn validate(&self, tool_name: &str, arguments: &Value) -> Result<()> {
        if let Err(errors) = self.schema.validate(arguments) {
            let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
            return Err(Error::validation_with_context(
                format!("invalid arguments for {}", tool_name),
                ErrorContext::new()
                    .with_details(messages.join("; "))
                    .with_source("tool_dispatch"),
            ));
        }
        Ok(())
    }
}
