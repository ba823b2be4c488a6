//! # Validator Configuration
//!
//! Tolerances and the temporal policy a [`PacketValidator`] applies.
//!
//! ## Temporal Policies
//!
//! Two schema generations disagree on how strictly the temporal fields
//! must line up. The policy is chosen explicitly; it is never inferred
//! from the packet.
//!
//! - [`TemporalPolicy::Tolerant`] (current): `expires_at` may drift from
//!   `created_at + ttl` by up to `max(clock_skew_tolerance, 1s)`,
//!   `created_at` may lead `now` by up to `allow_future_created_at`, and
//!   a packet stays valid for `clock_skew_tolerance` past `expires_at`.
//! - [`TemporalPolicy::Exact`] (legacy): no drift, no lead, no grace.
//!   Both tolerances are ignored.
//!
//! [`PacketValidator`]: crate::PacketValidator

use std::fmt;
use std::str::FromStr;

use ctxb_core::{Duration, DEFAULT_ALLOW_FUTURE_CREATED_AT, DEFAULT_CLOCK_SKEW};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How strictly the temporal fields are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalPolicy {
    /// Bounded tolerance for clock drift.
    #[default]
    Tolerant,
    /// Exact equality, zero tolerance.
    Exact,
}

impl TemporalPolicy {
    /// Lower-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tolerant => "tolerant",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for TemporalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised temporal policy name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown time policy {0:?} (expected 'tolerant' or 'exact')")]
pub struct UnknownPolicy(pub String);

impl FromStr for TemporalPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tolerant" => Ok(Self::Tolerant),
            "exact" => Ok(Self::Exact),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Settings for one [`PacketValidator`](crate::PacketValidator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Permitted disagreement between producer and validator clocks.
    pub clock_skew_tolerance: Duration,
    /// How far `created_at` may lead the validator clock.
    pub allow_future_created_at: Duration,
    /// Which temporal policy to apply.
    pub policy: TemporalPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            clock_skew_tolerance: DEFAULT_CLOCK_SKEW,
            allow_future_created_at: DEFAULT_ALLOW_FUTURE_CREATED_AT,
            policy: TemporalPolicy::Tolerant,
        }
    }
}

impl ValidatorConfig {
    /// Replace the clock skew tolerance.
    pub fn with_clock_skew_tolerance(mut self, tolerance: Duration) -> Self {
        self.clock_skew_tolerance = tolerance;
        self
    }

    /// Replace the future-creation allowance.
    pub fn with_allow_future_created_at(mut self, allowance: Duration) -> Self {
        self.allow_future_created_at = allowance;
        self
    }

    /// Replace the temporal policy.
    pub fn with_policy(mut self, policy: TemporalPolicy) -> Self {
        self.policy = policy;
        self
    }
}
