//! # Schema Engine Interface
//!
//! The seam between the packet validator and whatever implements JSON
//! Schema semantics. The validator is generic over [`SchemaEngine`] so
//! tests and embedders can inject an engine of their own.

use std::fmt;

use ctxb_core::IssueCode;
use serde_json::Value;
use thiserror::Error;

/// Failure to obtain an executable schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema document could not be read or is not JSON.
    #[error("schema load error for '{schema_name}': {reason}")]
    Load {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The document is JSON but the engine rejected it as a schema.
    #[error("schema compile error for '{schema_name}': {reason}")]
    Compile {
        /// Schema filename or identifier.
        schema_name: String,
        /// Engine diagnostic.
        reason: String,
    },

    /// IO error while scanning a schema directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// The verdict code this error surfaces as.
    pub fn issue_code(&self) -> IssueCode {
        match self {
            Self::Load { .. } | Self::Io(_) => IssueCode::SchemaLoadError,
            Self::Compile { .. } => IssueCode::SchemaCompileError,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Engine description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty collection of violations, in engine order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations. Returns `None` for an empty list, since
    /// an empty violation set means the instance is valid.
    pub fn new(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the collection holds no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The first violation the engine reported.
    pub fn first(&self) -> &Violation {
        &self.violations[0]
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// An executable schema.
///
/// Implementations must be safe for concurrent read-only use.
pub trait CompiledSchema: Send + Sync {
    /// Check `instance` against the schema.
    ///
    /// # Errors
    ///
    /// Returns every violation the engine found.
    fn validate(&self, instance: &Value) -> Result<(), ValidationViolations>;
}

/// Turns schema documents into [`CompiledSchema`]s.
pub trait SchemaEngine {
    /// The executable form this engine produces.
    type Compiled: CompiledSchema;

    /// Compile a parsed schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] if the document is not a valid
    /// schema for this engine.
    fn compile(&self, document: &Value) -> Result<Self::Compiled, SchemaError>;
}
