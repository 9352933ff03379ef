use jsonschema::validator_for;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("Instance validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),
}

/// Successful JSON-RPC response envelope as written by the bridge.
pub const SUCCESS_ENVELOPE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["jsonrpc", "id", "result"],
  "additionalProperties": false,
  "properties": {
    "jsonrpc": { "const": "2.0" },
    "id": { "type": ["number", "string"] },
    "result": { "type": "object" }
  }
}"#;

/// Error envelope; `code` is limited to the three codes the bridge emits.
pub const ERROR_ENVELOPE_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["jsonrpc", "id", "error"],
  "additionalProperties": false,
  "properties": {
    "jsonrpc": { "const": "2.0" },
    "id": { "type": ["number", "string", "null"] },
    "error": {
      "type": "object",
      "required": ["code", "message"],
      "additionalProperties": false,
      "properties": {
        "code": { "enum": [-32700, -32601, -32603] },
        "message": { "type": "string", "minLength": 1 }
      }
    }
  }
}"#;

/// The unsolicited `initialize` notification sent at startup.
pub const INITIALIZE_NOTIFICATION_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["jsonrpc", "method", "params"],
  "not": { "required": ["id"] },
  "properties": {
    "jsonrpc": { "const": "2.0" },
    "method": { "const": "initialize" },
    "params": {
      "type": "object",
      "required": ["protocolVersion", "capabilities", "serverInfo"],
      "properties": {
        "capabilities": {
          "type": "object",
          "required": ["tools", "resources", "prompts"]
        },
        "serverInfo": {
          "type": "object",
          "required": ["name", "version"]
        }
      }
    }
  }
}"#;

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
/// Returns Ok(()) if valid, Err otherwise.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let instance_json: Value = serde_json::from_str(instance_str)?;
    validate_value(schema_str, &instance_json)
}

/// Same as [`validate_json`] for an already parsed instance. Every
/// violation is reported, not just the first.
pub fn validate_value(schema_str: &str, instance: &Value) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;

    let validator = validator_for(&schema_json)
        .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;

    let errors: Vec<String> = validator.iter_errors(instance).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError::ValidationFailed(errors))
    }
}
