//! # Temporal Checks
//!
//! Extraction of the three temporal fields and the checks over them.
//! Each function returns the first [`Issue`] it finds so the pipeline can
//! short-circuit with `?`.

use chrono::{DateTime, TimeDelta, Utc};
use ctxb_core::{Duration, Issue, IssueCode, PacketTimestamp};
use serde_json::{Map, Value};

use crate::config::{TemporalPolicy, ValidatorConfig};

/// The parsed temporal fields of a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFields {
    /// When the packet was created.
    pub created_at: PacketTimestamp,
    /// When the packet stops being valid.
    pub expires_at: PacketTimestamp,
    /// Declared lifetime.
    pub ttl: Duration,
}

fn string_field<'a>(
    packet: &'a Map<String, Value>,
    field: &str,
    code: IssueCode,
) -> Result<&'a str, Issue> {
    packet
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Issue::new(code, format!("{field} must be a string")).at(field))
}

fn timestamp_field(
    packet: &Map<String, Value>,
    field: &str,
    code: IssueCode,
) -> Result<PacketTimestamp, Issue> {
    let raw = string_field(packet, field, code)?;
    PacketTimestamp::parse(raw, field).map_err(|e| Issue::new(code, e.to_string()).at(field))
}

impl TemporalFields {
    /// Extract and parse `created_at`, `expires_at`, then `ttl`.
    ///
    /// # Errors
    ///
    /// - `TIME_INVALID_CREATED_AT` / `TIME_INVALID_EXPIRES_AT` if the field
    ///   is absent, not a string, or not RFC 3339.
    /// - `TIME_INVALID_TTL` if `ttl` is absent, not a string, or rejected
    ///   by the duration parser.
    pub fn extract(packet: &Map<String, Value>) -> Result<Self, Issue> {
        let created_at = timestamp_field(packet, "created_at", IssueCode::TimeInvalidCreatedAt)?;
        let expires_at = timestamp_field(packet, "expires_at", IssueCode::TimeInvalidExpiresAt)?;
        let raw_ttl = string_field(packet, "ttl", IssueCode::TimeInvalidTtl)?;
        let ttl = Duration::parse(raw_ttl, "ttl")
            .map_err(|e| Issue::new(IssueCode::TimeInvalidTtl, e.to_string()).at("ttl"))?;

        Ok(Self {
            created_at,
            expires_at,
            ttl,
        })
    }

    /// `created_at + ttl`.
    ///
    /// # Errors
    ///
    /// `TIME_INVALID_TTL` if the sum leaves the representable range.
    pub fn expected_expiry(&self) -> Result<PacketTimestamp, Issue> {
        self.created_at.checked_add(self.ttl).ok_or_else(|| {
            Issue::new(
                IssueCode::TimeInvalidTtl,
                format!("ttl {} added to created_at {} is out of range", self.ttl, self.created_at),
            )
            .at("ttl")
        })
    }

    /// `expires_at` must match `created_at + ttl` under the configured policy.
    ///
    /// # Errors
    ///
    /// `TIME_MISMATCH` when the drift exceeds the allowed tolerance.
    pub fn check_consistency(&self, config: &ValidatorConfig) -> Result<(), Issue> {
        let expected = self.expected_expiry()?;
        let diff = self.expires_at.since(&expected).abs();
        let tolerance = match config.policy {
            TemporalPolicy::Tolerant => config
                .clock_skew_tolerance
                .to_time_delta()
                .max(TimeDelta::seconds(1)),
            TemporalPolicy::Exact => TimeDelta::zero(),
        };

        if diff > tolerance {
            return Err(Issue::new(
                IssueCode::TimeMismatch,
                format!(
                    "expires_at does not match created_at + ttl within allowed tolerance \
                     (expected={expected}, got={}, tolerance={})",
                    self.expires_at,
                    describe(tolerance),
                ),
            )
            .at("expires_at"));
        }
        Ok(())
    }

    /// `created_at` may not lead `now` by more than the allowance.
    ///
    /// # Errors
    ///
    /// `TIME_CREATED_AT_IN_FUTURE` when it does.
    pub fn check_created_at(&self, now: DateTime<Utc>, config: &ValidatorConfig) -> Result<(), Issue> {
        let now = PacketTimestamp::from_utc(now);
        let lead = self.created_at.since(&now);
        let allowance = match config.policy {
            TemporalPolicy::Tolerant => config.allow_future_created_at.to_time_delta(),
            TemporalPolicy::Exact => TimeDelta::zero(),
        };

        if lead > allowance {
            return Err(Issue::new(
                IssueCode::TimeCreatedAtInFuture,
                format!(
                    "created_at is too far in the future (created_at={}, now={now}, allowance={})",
                    self.created_at,
                    describe(allowance),
                ),
            )
            .at("created_at"));
        }
        Ok(())
    }

    /// `now` may not trail `expires_at` by more than the skew tolerance.
    ///
    /// # Errors
    ///
    /// `TIME_EXPIRED` when it does.
    pub fn check_expiry(&self, now: DateTime<Utc>, config: &ValidatorConfig) -> Result<(), Issue> {
        let now = PacketTimestamp::from_utc(now);
        let overdue = now.since(&self.expires_at);
        let grace = match config.policy {
            TemporalPolicy::Tolerant => config.clock_skew_tolerance.to_time_delta(),
            TemporalPolicy::Exact => TimeDelta::zero(),
        };

        if overdue > grace {
            return Err(Issue::new(
                IssueCode::TimeExpired,
                format!(
                    "context packet is expired (expires_at={}, now={now}, skew={})",
                    self.expires_at,
                    describe(grace),
                ),
            )
            .at("expires_at"));
        }
        Ok(())
    }
}

/// Render a non-negative interval as whole seconds.
fn describe(delta: TimeDelta) -> String {
    format!("{}s", delta.num_seconds())
}
