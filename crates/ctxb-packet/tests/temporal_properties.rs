//! Property tests over the validation pipeline's clock-dependent behavior.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ctxb_core::{Duration, IssueCode};
use ctxb_packet::{PacketValidator, ValidatorConfig};
use ctxb_schema::{JsonSchemaEngine, JsonSchemaValidator};
use proptest::prelude::*;
use serde_json::json;

fn validator(config: ValidatorConfig) -> PacketValidator<JsonSchemaValidator> {
    let schema = json!({
        "type": "object",
        "required": ["created_at", "ttl", "expires_at"]
    });
    PacketValidator::compile(&JsonSchemaEngine::new(), &schema, config).unwrap()
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn packet(created_at: DateTime<Utc>, ttl_secs: i64, expires_at: DateTime<Utc>) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "created_at": created_at.to_rfc3339(),
        "ttl": format!("{ttl_secs}s"),
        "expires_at": expires_at.to_rfc3339(),
    }))
    .unwrap()
}

proptest! {
    /// Once `now` passes `expires_at + skew` the verdict is TIME_EXPIRED and
    /// stays that way for every later `now`.
    #[test]
    fn expiry_is_monotonic(
        ttl_secs in 1i64..86_400,
        skew_secs in 1i64..600,
        offsets in prop::collection::vec(0i64..172_800, 1..24),
    ) {
        let skew = Duration::parse(&format!("{skew_secs}s"), "clock-skew").unwrap();
        let v = validator(ValidatorConfig::default().with_clock_skew_tolerance(skew));
        let created = base();
        let expires = created + TimeDelta::seconds(ttl_secs);
        let bytes = packet(created, ttl_secs, expires);

        let mut offsets = offsets;
        offsets.sort_unstable();
        let mut seen_expired = false;
        for off in offsets {
            // `now` at or after creation, so step 7 never fires.
            let now = created + TimeDelta::seconds(off);
            let code = v.validate(&bytes, now).verdict.code();
            let should_expire = now - expires > TimeDelta::seconds(skew_secs);
            if should_expire {
                prop_assert_eq!(code, Some(IssueCode::TimeExpired));
            } else {
                prop_assert!(!seen_expired, "verdict reverted from expired");
                prop_assert_eq!(code, None);
            }
            seen_expired |= code == Some(IssueCode::TimeExpired);
        }
    }

    /// Same packet, same `now`: same report.
    #[test]
    fn validation_is_idempotent(
        ttl_secs in 1i64..86_400,
        drift in -300i64..300,
        now_off in -3_600i64..200_000,
    ) {
        let v = validator(ValidatorConfig::default());
        let created = base();
        let expires = created + TimeDelta::seconds(ttl_secs + drift);
        let bytes = packet(created, ttl_secs, expires);
        let now = created + TimeDelta::seconds(now_off);
        prop_assert_eq!(v.validate(&bytes, now), v.validate(&bytes, now));
    }

    /// Drift up to the tolerance is accepted at step 6; beyond it is TIME_MISMATCH.
    #[test]
    fn drift_boundary(ttl_secs in 1i64..86_400, skew_secs in 1i64..600, extra in 0i64..600) {
        let skew = Duration::parse(&format!("{skew_secs}s"), "clock-skew").unwrap();
        let v = validator(ValidatorConfig::default().with_clock_skew_tolerance(skew));
        let created = base();
        let now = created;

        let at_edge = created + TimeDelta::seconds(ttl_secs + skew_secs);
        let code = v.validate(&packet(created, ttl_secs, at_edge), now).verdict.code();
        prop_assert_ne!(code, Some(IssueCode::TimeMismatch));

        let beyond = created + TimeDelta::seconds(ttl_secs + skew_secs + 1 + extra);
        let code = v.validate(&packet(created, ttl_secs, beyond), now).verdict.code();
        prop_assert_eq!(code, Some(IssueCode::TimeMismatch));
    }
}
