//! # ctxb-schema — Schema Conformance Capability
//!
//! The packet validator does not implement JSON Schema. It consumes a
//! schema engine through two traits defined in [`engine`]:
//!
//! - [`SchemaEngine::compile`] turns a schema document into an executable
//!   [`CompiledSchema`].
//! - [`CompiledSchema::validate`] checks one JSON value and returns either
//!   success or the engine's list of violations.
//!
//! ## Default Engine (`validate`)
//!
//! [`JsonSchemaEngine`] implements the traits on top of the `jsonschema`
//! crate, pinned to Draft 7 with `format` assertions enabled. Cross-schema
//! `$ref`s resolve only against documents loaded from the schema's own
//! directory; the engine never touches the network.
//!
//! ## Crate Policy
//!
//! - Depends only on `ctxb-core` internally.
//! - Violation messages are the engine's own text and are passed through
//!   verbatim; nothing downstream parses them.
//! - Compiled schemas are `Send + Sync` and immutable, so one compiled
//!   schema can serve concurrent validations.

pub mod engine;
pub mod validate;

pub use engine::{CompiledSchema, SchemaEngine, SchemaError, ValidationViolations, Violation};
pub use validate::{load_schema_document, JsonSchemaEngine, JsonSchemaValidator};
