//! # Schema Validation
//!
//! Default [`SchemaEngine`] backed by the `jsonschema` crate.
//!
//! ## Draft and Formats
//!
//! Schemas compile as Draft 7 unless [`JsonSchemaEngine::with_draft`]
//! overrides it. `format` keywords are asserted, so a `date-time` field
//! holding `"yesterday"` is a violation rather than an annotation.
//!
//! ## Schema Resolution
//!
//! [`JsonSchemaEngine::with_schema_dir`] indexes every schema file
//! (`*.schema.json` or `*.schema.<version>.json`) in a directory.
//! Cross-schema `$ref`s are resolved against that index by `$id`, then
//! by trailing filename. A reference that matches nothing
//! fails compilation; the engine never fetches over the network.
//! Sibling files that do not parse are skipped with a warning, so only a
//! schema that is actually referenced can fail a run.

use std::collections::HashMap;
use std::path::Path;

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::{CompiledSchema, SchemaEngine, SchemaError, ValidationViolations, Violation};

/// Resolves `$ref` URIs against schemas already loaded in memory.
struct LocalSchemaRetriever {
    /// Map from URI string (or bare filename) to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Relative refs from a root without `$id` arrive as
        // `json-schema:///<filename>`; fall back to the last path segment.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("unresolved schema reference '{uri_str}' (network retrieval disabled)").into())
    }
}

/// Read a schema document from disk and parse it as JSON.
///
/// # Errors
///
/// Returns [`SchemaError::Load`] if the file cannot be read or is not
/// valid JSON.
pub fn load_schema_document(path: &Path) -> Result<Value, SchemaError> {
    let schema_name = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::Load {
        schema_name: schema_name.clone(),
        reason: format!("cannot read file: {e}"),
    })?;
    serde_json::from_str(&content).map_err(|e| SchemaError::Load {
        schema_name,
        reason: format!("invalid JSON: {e}"),
    })
}

fn is_schema_file(name: &str) -> bool {
    name.ends_with(".json") && name.contains(".schema.")
}

/// A [`SchemaEngine`] built on the `jsonschema` crate.
#[derive(Debug, Clone)]
pub struct JsonSchemaEngine {
    draft: Draft,
    validate_formats: bool,
    /// Name used in error messages.
    schema_name: String,
    /// Sibling schemas by `$id` and filename, for `$ref` resolution.
    resources: HashMap<String, Value>,
}

impl Default for JsonSchemaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchemaEngine {
    /// Draft 7, format assertions on, no sibling schemas.
    pub fn new() -> Self {
        Self {
            draft: Draft::Draft7,
            validate_formats: true,
            schema_name: "schema".to_string(),
            resources: HashMap::new(),
        }
    }

    /// Index every schema file in `schema_dir` for `$ref` resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the directory cannot be listed.
    /// Unreadable or malformed schema files are skipped.
    pub fn with_schema_dir(mut self, schema_dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let schema_dir = schema_dir.as_ref();
        let entries = std::fs::read_dir(schema_dir).map_err(|e| SchemaError::Load {
            schema_name: schema_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_schema_file(name) {
                continue;
            }
            let value = match load_schema_document(&path) {
                Ok(value) => value,
                Err(e) => {
                    warn!("skipping sibling schema: {e}");
                    continue;
                }
            };
            if let Some(id) = value.get("$id").and_then(|v| v.as_str()) {
                self.resources.insert(id.to_string(), value.clone());
            }
            self.resources.insert(name.to_string(), value);
        }

        debug!(
            dir = %schema_dir.display(),
            resources = self.resources.len(),
            "indexed sibling schemas"
        );
        Ok(self)
    }

    /// Compile against a different draft.
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = draft;
        self
    }

    /// Toggle `format` assertions.
    pub fn with_format_validation(mut self, enabled: bool) -> Self {
        self.validate_formats = enabled;
        self
    }

    /// Name reported in compile errors (typically the schema path).
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = name.into();
        self
    }

    /// Number of indexed `$ref` targets.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}

impl SchemaEngine for JsonSchemaEngine {
    type Compiled = JsonSchemaValidator;

    fn compile(&self, document: &Value) -> Result<JsonSchemaValidator, SchemaError> {
        let retriever = LocalSchemaRetriever {
            schemas_by_uri: self.resources.clone(),
        };

        let validator = jsonschema::options()
            .with_draft(self.draft)
            .should_validate_formats(self.validate_formats)
            .with_retriever(retriever)
            .build(document)
            .map_err(|e| SchemaError::Compile {
                schema_name: self.schema_name.clone(),
                reason: e.to_string(),
            })?;

        debug!(schema = %self.schema_name, draft = ?self.draft, "compiled schema");
        Ok(JsonSchemaValidator { validator })
    }
}

/// A compiled `jsonschema` validator.
pub struct JsonSchemaValidator {
    validator: Validator,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

impl CompiledSchema for JsonSchemaValidator {
    fn validate(&self, instance: &Value) -> Result<(), ValidationViolations> {
        let errors: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        match ValidationViolations::new(errors) {
            None => Ok(()),
            Some(violations) => Err(violations),
        }
    }
}
