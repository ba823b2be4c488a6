//! # ctxb-packet — Context Packet Validator
//!
//! Classifies a context packet as accepted or rejected. Each call runs a
//! stateless, short-circuiting pipeline; the first failing step decides
//! the verdict.
//!
//! 1. Compile the schema (environment failure if it does not).
//! 2. Decode the packet bytes as a JSON object.
//! 3. Check schema conformance.
//! 4. Extract `created_at`, `expires_at`, `ttl` as strings and parse the
//!    two timestamps.
//! 5. Parse `ttl` as a duration.
//! 6. Check `expires_at` against `created_at + ttl`.
//! 7. Check `created_at` is not too far ahead of `now`.
//! 8. Check the packet has not expired.
//!
//! The packet is only read, never repaired or mutated.
//!
//! ## Clock
//!
//! `now` is a parameter, read by the caller once per call and used for
//! both clock-relative checks. [`PacketValidator::validate_now`] reads the
//! system clock exactly once on the caller's behalf.
//!
//! ## Crate Policy
//!
//! - Malformed input never panics; it is classified into an
//!   [`IssueCode`](ctxb_core::IssueCode).
//! - A [`PacketValidator`] is immutable after construction and may be
//!   shared across threads when its compiled schema is.

pub mod config;
pub mod temporal;
pub mod validator;

pub use config::{TemporalPolicy, UnknownPolicy, ValidatorConfig};
pub use temporal::TemporalFields;
pub use validator::{validate_packet, PacketValidator};
