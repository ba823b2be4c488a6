//! # Issue Taxonomy
//!
//! The flat set of codes a validation call can report, and the [`Issue`]
//! record that pairs a code with a human-readable message.
//!
//! Codes split into two classes. Environment codes (schema could not be
//! loaded or compiled, packet file could not be read) describe a problem
//! with the caller's setup. Every other code describes a defect in the
//! packet itself. Both surface through the same verdict shape; the class
//! only decides the process exit status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable reason a packet was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Schema document missing, unreadable, or not JSON.
    SchemaLoadError,
    /// Schema document is JSON but not a valid schema.
    SchemaCompileError,
    /// Packet file could not be read.
    PacketReadError,
    /// Packet bytes are not a JSON object.
    PacketParseError,
    /// Packet does not conform to the schema.
    SchemaViolation,
    /// `created_at` absent, not a string, or not RFC 3339.
    TimeInvalidCreatedAt,
    /// `expires_at` absent, not a string, or not RFC 3339.
    TimeInvalidExpiresAt,
    /// `ttl` absent, not a string, or not a valid duration.
    TimeInvalidTtl,
    /// `expires_at` disagrees with `created_at + ttl`.
    TimeMismatch,
    /// `created_at` is too far ahead of the validator clock.
    TimeCreatedAtInFuture,
    /// The packet has expired.
    TimeExpired,
}

/// Which kind of failure a code represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitClass {
    /// The packet was rejected on its merits.
    Invalid,
    /// The validator could not run against the packet.
    Environment,
}

impl ExitClass {
    /// Process exit status for this class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Invalid => 1,
            Self::Environment => 2,
        }
    }
}

impl IssueCode {
    /// All codes, in pipeline order.
    pub const ALL: [IssueCode; 11] = [
        Self::SchemaLoadError,
        Self::SchemaCompileError,
        Self::PacketReadError,
        Self::PacketParseError,
        Self::SchemaViolation,
        Self::TimeInvalidCreatedAt,
        Self::TimeInvalidExpiresAt,
        Self::TimeInvalidTtl,
        Self::TimeMismatch,
        Self::TimeCreatedAtInFuture,
        Self::TimeExpired,
    ];

    /// The wire identifier, e.g. `"TIME_EXPIRED"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaLoadError => "SCHEMA_LOAD_ERROR",
            Self::SchemaCompileError => "SCHEMA_COMPILE_ERROR",
            Self::PacketReadError => "PACKET_READ_ERROR",
            Self::PacketParseError => "PACKET_PARSE_ERROR",
            Self::SchemaViolation => "SCHEMA_VIOLATION",
            Self::TimeInvalidCreatedAt => "TIME_INVALID_CREATED_AT",
            Self::TimeInvalidExpiresAt => "TIME_INVALID_EXPIRES_AT",
            Self::TimeInvalidTtl => "TIME_INVALID_TTL",
            Self::TimeMismatch => "TIME_MISMATCH",
            Self::TimeCreatedAtInFuture => "TIME_CREATED_AT_IN_FUTURE",
            Self::TimeExpired => "TIME_EXPIRED",
        }
    }

    /// Whether the code blames the environment or the packet.
    pub fn exit_class(&self) -> ExitClass {
        match self {
            Self::SchemaLoadError | Self::SchemaCompileError | Self::PacketReadError => {
                ExitClass::Environment
            }
            Self::PacketParseError
            | Self::SchemaViolation
            | Self::TimeInvalidCreatedAt
            | Self::TimeInvalidExpiresAt
            | Self::TimeInvalidTtl
            | Self::TimeMismatch
            | Self::TimeCreatedAtInFuture
            | Self::TimeExpired => ExitClass::Invalid,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Taxonomy code.
    pub code: IssueCode,
    /// Free-text explanation. For schema violations this is the schema
    /// engine's own description, passed through verbatim.
    pub message: String,
    /// Field the issue concerns, when one can be named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Issue {
    /// An issue not tied to a particular field.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Attach the field path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} ({}): {}", self.code, path, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}
