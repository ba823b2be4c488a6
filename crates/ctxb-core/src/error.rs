//! # Error Types
//!
//! Parse errors for the core primitives. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Packet-level failures are not errors at all: they are classified into
//! an [`IssueCode`](crate::IssueCode) and returned inside a
//! [`Verdict`](crate::Verdict). The types here describe why a single
//! value failed to parse, and their `Display` text becomes the issue
//! message.

use thiserror::Error;

/// A duration string could not be parsed.
///
/// Every variant's message begins with the caller-supplied label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Input is not exactly `<int><unit>` with unit in `s`, `m`, `h`, `d`.
    #[error("{label} must match <int><s|m|h|d> (e.g. '30m', '2h'), got {input:?}")]
    FormatInvalid {
        /// Which input was being parsed.
        label: String,
        /// The raw input as received.
        input: String,
    },

    /// The integer part is zero.
    #[error("{label} must be positive")]
    NotPositive {
        /// Which input was being parsed.
        label: String,
    },

    /// The interval is too large to represent.
    #[error("{label} is out of range: {input:?}")]
    OutOfRange {
        /// Which input was being parsed.
        label: String,
        /// The raw input as received.
        input: String,
    },
}

/// Coarse classification of a [`DurationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationErrorKind {
    /// Shape mismatch.
    FormatInvalid,
    /// Zero value.
    NotPositive,
    /// Overflow.
    OutOfRange,
}

impl DurationErrorKind {
    /// Stable identifier for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormatInvalid => "FORMAT_INVALID",
            Self::NotPositive => "NOT_POSITIVE",
            Self::OutOfRange => "OUT_OF_RANGE",
        }
    }
}

impl DurationError {
    /// The kind of failure, independent of label and input.
    pub fn kind(&self) -> DurationErrorKind {
        match self {
            Self::FormatInvalid { .. } => DurationErrorKind::FormatInvalid,
            Self::NotPositive { .. } => DurationErrorKind::NotPositive,
            Self::OutOfRange { .. } => DurationErrorKind::OutOfRange,
        }
    }

    /// The label the parser was invoked with.
    pub fn label(&self) -> &str {
        match self {
            Self::FormatInvalid { label, .. }
            | Self::NotPositive { label }
            | Self::OutOfRange { label, .. } => label,
        }
    }
}

/// A timestamp string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Not a valid RFC 3339 date-time (including a missing offset).
    #[error("{field} is not a valid RFC 3339 date-time {input:?}: {reason}")]
    InvalidFormat {
        /// Packet field the value came from.
        field: String,
        /// The raw input as received.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },
}
