//! # Packet Validator
//!
//! Orchestrates schema conformance and the temporal checks into a single
//! verdict. See the crate documentation for the step order.

use chrono::{DateTime, Utc};
use ctxb_core::{Issue, IssueCode, ValidationReport, Verdict};
use ctxb_schema::{CompiledSchema, SchemaEngine, SchemaError};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::ValidatorConfig;
use crate::temporal::TemporalFields;

/// A compiled schema plus the configuration to validate packets with.
#[derive(Debug)]
pub struct PacketValidator<S> {
    schema: S,
    config: ValidatorConfig,
}

impl<S: CompiledSchema> PacketValidator<S> {
    /// Wrap an already-compiled schema.
    pub fn new(schema: S, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    /// Compile `schema_document` with `engine` and wrap the result.
    ///
    /// # Errors
    ///
    /// Propagates the engine's [`SchemaError`].
    pub fn compile<E>(engine: &E, schema_document: &Value, config: ValidatorConfig) -> Result<Self, SchemaError>
    where
        E: SchemaEngine<Compiled = S>,
    {
        Ok(Self::new(engine.compile(schema_document)?, config))
    }

    /// The configuration in effect.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate raw packet bytes as of `now`.
    pub fn validate(&self, packet_bytes: &[u8], now: DateTime<Utc>) -> ValidationReport {
        match serde_json::from_slice::<Value>(packet_bytes) {
            Ok(packet) => self.validate_value(&packet, now),
            Err(e) => reject(
                None,
                Issue::new(IssueCode::PacketParseError, format!("invalid JSON: {e}")),
            ),
        }
    }

    /// Validate raw packet bytes against a single read of the system clock.
    pub fn validate_now(&self, packet_bytes: &[u8]) -> ValidationReport {
        self.validate(packet_bytes, Utc::now())
    }

    /// Validate an already-decoded packet as of `now`.
    ///
    /// Anything other than a JSON object is rejected with
    /// `PACKET_PARSE_ERROR`.
    pub fn validate_value(&self, packet: &Value, now: DateTime<Utc>) -> ValidationReport {
        let Some(fields) = packet.as_object() else {
            return reject(None, not_an_object(packet));
        };

        let schema_version = fields
            .get("schema_version")
            .and_then(Value::as_str)
            .map(str::to_string);

        match self.check(packet, fields, now) {
            Ok(()) => {
                debug!(schema_version = ?schema_version, "packet accepted");
                ValidationReport {
                    schema_version,
                    verdict: Verdict::Valid,
                }
            }
            Err(issue) => reject(schema_version, issue),
        }
    }

    /// Steps 3 through 8. The first failure wins.
    fn check(&self, instance: &Value, packet: &Map<String, Value>, now: DateTime<Utc>) -> Result<(), Issue> {
        self.schema.validate(instance).map_err(|violations| {
            let first = violations.first();
            let issue = Issue::new(IssueCode::SchemaViolation, violations.to_string());
            if first.instance_path.is_empty() {
                issue
            } else {
                issue.at(first.instance_path.clone())
            }
        })?;
        debug!("schema conformance passed");

        let fields = TemporalFields::extract(packet)?;
        debug!(
            created_at = %fields.created_at,
            expires_at = %fields.expires_at,
            ttl = %fields.ttl,
            "temporal fields parsed"
        );

        fields.check_consistency(&self.config)?;
        fields.check_created_at(now, &self.config)?;
        fields.check_expiry(now, &self.config)?;
        Ok(())
    }
}

/// Full pipeline including schema compilation.
///
/// A schema the engine cannot compile yields a `SCHEMA_COMPILE_ERROR` (or
/// `SCHEMA_LOAD_ERROR`) verdict rather than an `Err`, so every outcome
/// shares the verdict shape.
pub fn validate_packet<E: SchemaEngine>(
    engine: &E,
    packet_bytes: &[u8],
    schema_document: &Value,
    now: DateTime<Utc>,
    config: ValidatorConfig,
) -> ValidationReport {
    match PacketValidator::compile(engine, schema_document, config) {
        Ok(validator) => validator.validate(packet_bytes, now),
        Err(e) => reject(None, Issue::new(e.issue_code(), e.to_string())),
    }
}

fn not_an_object(value: &Value) -> Issue {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    Issue::new(
        IssueCode::PacketParseError,
        format!("packet JSON must be an object, got {kind}"),
    )
}

fn reject(schema_version: Option<String>, issue: Issue) -> ValidationReport {
    info!(code = %issue.code, path = ?issue.path, "packet rejected: {}", issue.message);
    ValidationReport {
        schema_version,
        verdict: Verdict::Invalid(issue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxb_core::Duration;
    use ctxb_schema::JsonSchemaEngine;
    use serde_json::json;

    use crate::config::TemporalPolicy;

    fn now(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    /// Minimal schema: the three temporal fields required as strings.
    fn strict_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["context_id", "created_at", "ttl", "expires_at"],
            "properties": {
                "context_id": {"type": "string"},
                "created_at": {"type": "string"},
                "ttl": {"type": "string"},
                "expires_at": {"type": "string"}
            }
        })
    }

    /// Same shape, but `expires_at` optional.
    fn lax_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["context_id", "created_at", "ttl"],
            "properties": {
                "context_id": {"type": "string"},
                "created_at": {"type": "string"},
                "ttl": {"type": "string"}
            }
        })
    }

    fn validator(schema: Value, config: ValidatorConfig) -> PacketValidator<ctxb_schema::JsonSchemaValidator> {
        PacketValidator::compile(&JsonSchemaEngine::new(), &schema, config).unwrap()
    }

    fn packet(created: &str, ttl: &str, expires: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "schema_version": "1.0.0",
            "context_id": "ctx-1",
            "created_at": created,
            "ttl": ttl,
            "expires_at": expires,
        }))
        .unwrap()
    }

    fn scenario_packet() -> Vec<u8> {
        packet("2025-01-01T00:00:00Z", "2h", "2025-01-01T02:00:00Z")
    }

    #[test]
    fn test_scenario_a_valid() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let report = v.validate(&scenario_packet(), now("2025-01-01T01:00:00Z"));
        assert_eq!(report.verdict, Verdict::Valid);
        assert_eq!(report.schema_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_scenario_b_expired() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let report = v.validate(&scenario_packet(), now("2025-01-01T03:05:00Z"));
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeExpired));
    }

    #[test]
    fn test_scenario_c_zero_ttl() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let report = v.validate(
            &packet("2025-01-01T00:00:00Z", "0h", "2025-01-01T00:00:00Z"),
            now("2025-01-01T00:00:00Z"),
        );
        let issue = report.verdict.issue().unwrap();
        assert_eq!(issue.code, IssueCode::TimeInvalidTtl);
        assert_eq!(issue.message, "ttl must be positive");
    }

    #[test]
    fn test_scenario_d_created_in_future() {
        let cfg = ValidatorConfig::default()
            .with_allow_future_created_at(Duration::parse("5m", "allow-future-created-at").unwrap());
        let v = validator(strict_schema(), cfg);
        let report = v.validate(
            &packet("2025-01-01T00:10:00Z", "2h", "2025-01-01T02:10:00Z"),
            now("2025-01-01T00:00:00Z"),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeCreatedAtInFuture));
    }

    #[test]
    fn test_lenient_timestamp_forms_rejected() {
        let v = validator(lax_schema(), ValidatorConfig::default());
        let report = v.validate(
            &packet("2025-01-01 00:00:00Z", "2h", "2025-01-01t02:00:00z"),
            now("2025-01-01T01:00:00Z"),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeInvalidCreatedAt));

        let report = v.validate(
            &packet("2025-01-01T00:00:00Z", "2h", "2025-01-01t02:00:00z"),
            now("2025-01-01T01:00:00Z"),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeInvalidExpiresAt));
    }

    #[test]
    fn test_scenario_e_missing_expires_at() {
        let v = validator(lax_schema(), ValidatorConfig::default());
        let bytes = serde_json::to_vec(&json!({
            "context_id": "ctx-1",
            "created_at": "2025-01-01T00:00:00Z",
            "ttl": "2h",
        }))
        .unwrap();
        let report = v.validate(&bytes, now("2025-01-01T01:00:00Z"));
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeInvalidExpiresAt));
        assert_eq!(report.schema_version, None);
    }

    #[test]
    fn test_schema_violation_precedes_temporal_checks() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        // Expired and missing context_id: the schema step reports first.
        let bytes = serde_json::to_vec(&json!({
            "created_at": "2020-01-01T00:00:00Z",
            "ttl": "1s",
            "expires_at": "2020-01-01T00:00:01Z",
        }))
        .unwrap();
        let report = v.validate(&bytes, now("2025-01-01T00:00:00Z"));
        let issue = report.verdict.issue().unwrap();
        assert_eq!(issue.code, IssueCode::SchemaViolation);
        assert!(issue.message.contains("context_id"), "{}", issue.message);
    }

    #[test]
    fn test_schema_violation_path() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let bytes = serde_json::to_vec(&json!({
            "context_id": 7,
            "created_at": "2025-01-01T00:00:00Z",
            "ttl": "2h",
            "expires_at": "2025-01-01T02:00:00Z",
        }))
        .unwrap();
        let issue = v
            .validate(&bytes, now("2025-01-01T01:00:00Z"))
            .verdict
            .issue()
            .cloned()
            .unwrap();
        assert_eq!(issue.code, IssueCode::SchemaViolation);
        assert_eq!(issue.path.as_deref(), Some("/context_id"));
    }

    #[test]
    fn test_mismatch_before_expiry() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        // Both inconsistent and long expired: consistency is step 6, expiry step 8.
        let report = v.validate(
            &packet("2020-01-01T00:00:00Z", "2h", "2020-01-01T05:00:00Z"),
            now("2025-01-01T00:00:00Z"),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeMismatch));
    }

    #[test]
    fn test_future_before_expiry() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        // A 1s ttl created far in the future; step 7 fires before step 8 is reached.
        let report = v.validate(
            &packet("2030-01-01T00:00:00Z", "1s", "2030-01-01T00:00:01Z"),
            now("2025-01-01T00:00:00Z"),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeCreatedAtInFuture));
    }

    #[test]
    fn test_unparseable_bytes() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let report = v.validate(b"{\"context_id\": ", now("2025-01-01T00:00:00Z"));
        assert_eq!(report.verdict.code(), Some(IssueCode::PacketParseError));
    }

    #[test]
    fn test_non_object_packet() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        for bytes in [&b"[]"[..], b"null", b"\"packet\"", b"42"] {
            let report = v.validate(bytes, now("2025-01-01T00:00:00Z"));
            let issue = report.verdict.issue().unwrap();
            assert_eq!(issue.code, IssueCode::PacketParseError);
            assert!(issue.message.starts_with("packet JSON must be an object"));
        }
        let report = v.validate_value(&json!([1, 2]), now("2025-01-01T00:00:00Z"));
        assert_eq!(report.verdict.code(), Some(IssueCode::PacketParseError));
    }

    #[test]
    fn test_compile_error_verdict() {
        let report = validate_packet(
            &JsonSchemaEngine::new(),
            &scenario_packet(),
            &json!({"type": "not-a-type"}),
            now("2025-01-01T01:00:00Z"),
            ValidatorConfig::default(),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::SchemaCompileError));
        assert_eq!(report.verdict.exit_code(), 2);
    }

    #[test]
    fn test_validate_packet_full_pipeline() {
        let report = validate_packet(
            &JsonSchemaEngine::new(),
            &scenario_packet(),
            &strict_schema(),
            now("2025-01-01T01:00:00Z"),
            ValidatorConfig::default(),
        );
        assert!(report.verdict.is_valid());
    }

    #[test]
    fn test_exact_policy_pipeline() {
        let v = validator(
            strict_schema(),
            ValidatorConfig::default().with_policy(TemporalPolicy::Exact),
        );
        let report = v.validate(
            &packet("2025-01-01T00:00:00Z", "2h", "2025-01-01T02:00:30Z"),
            now("2025-01-01T01:00:00Z"),
        );
        assert_eq!(report.verdict.code(), Some(IssueCode::TimeMismatch));

        let tolerant = validator(strict_schema(), ValidatorConfig::default());
        let report = tolerant.validate(
            &packet("2025-01-01T00:00:00Z", "2h", "2025-01-01T02:00:30Z"),
            now("2025-01-01T01:00:00Z"),
        );
        assert!(report.verdict.is_valid());
    }

    #[test]
    fn test_idempotent() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let t = now("2025-01-01T02:00:30Z");
        let a = v.validate(&scenario_packet(), t);
        let b = v.validate(&scenario_packet(), t);
        assert_eq!(a, b);
    }

    #[test]
    fn test_input_untouched() {
        let v = validator(strict_schema(), ValidatorConfig::default());
        let value: Value = serde_json::from_slice(&scenario_packet()).unwrap();
        let before = value.clone();
        v.validate_value(&value, now("2025-01-01T01:00:00Z"));
        assert_eq!(value, before);
    }

    #[test]
    fn test_shared_across_threads() {
        let v = std::sync::Arc::new(validator(strict_schema(), ValidatorConfig::default()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let v = std::sync::Arc::clone(&v);
                std::thread::spawn(move || v.validate(&scenario_packet(), now("2025-01-01T01:00:00Z")))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().verdict.is_valid());
        }
    }
}
