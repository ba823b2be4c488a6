//! # Temporal Types — UTC Packet Timestamps
//!
//! Defines `PacketTimestamp`, the instant type behind a packet's
//! `created_at` and `expires_at` fields.
//!
//! ## Parsing
//!
//! Inputs follow RFC 3339 with optional fractional seconds (up to
//! nanoseconds). An explicit offset is mandatory: `Z`, `+00:00`, or any
//! other offset is accepted and converted to UTC. Naive date-times and
//! bare dates are rejected. The date and time must be joined by an
//! uppercase `T`, and the UTC designator must be an uppercase `Z`; the
//! space and lowercase forms chrono tolerates are refused.
//!
//! Sub-second precision is preserved. Tolerance checks compare instants
//! exactly, so truncating here would shift a boundary case by up to one
//! second.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::error::TimestampError;

/// A UTC instant parsed from a packet field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PacketTimestamp(DateTime<Utc>);

impl PacketTimestamp {
    /// Wrap a `chrono::DateTime<Utc>` as-is.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 date-time, converting any offset to UTC.
    ///
    /// `field` names the packet field and is carried into the error.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::InvalidFormat`] if `s` is not a complete
    /// RFC 3339 date-time with offset.
    pub fn parse(s: &str, field: &str) -> Result<Self, TimestampError> {
        let invalid = |reason: String| TimestampError::InvalidFormat {
            field: field.to_string(),
            input: s.to_string(),
            reason,
        };
        if let Some(reason) = non_canonical_form(s) {
            return Err(invalid(reason.to_string()));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| invalid(e.to_string()))?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// `self + duration`, or `None` if the result leaves chrono's range.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.0.checked_add_signed(duration.to_time_delta()).map(Self)
    }

    /// Signed interval `self - earlier`.
    pub fn since(&self, earlier: &Self) -> TimeDelta {
        self.0.signed_duration_since(earlier.0)
    }

    /// Render as RFC 3339 with `Z` suffix, with fractional seconds only
    /// when non-zero (e.g. `2025-01-01T02:00:00Z`).
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Separator and designator forms `parse_from_rfc3339` accepts but the
/// packet grammar does not.
fn non_canonical_form(s: &str) -> Option<&'static str> {
    if s.as_bytes().get(10) != Some(&b'T') {
        return Some("date and time must be separated by 'T'");
    }
    if s.ends_with('z') {
        return Some("UTC designator must be 'Z'");
    }
    None
}

impl std::fmt::Display for PacketTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}
