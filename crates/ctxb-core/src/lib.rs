//! # ctxb-core — Foundational Types for the Context Broker
//!
//! Leaf crate of the workspace. Defines the primitives the packet validator
//! composes: TTL durations, UTC timestamps, the issue taxonomy, and the
//! verdict a validation call produces.
//!
//! ## Key Design Principles
//!
//! 1. **Durations only come from the parser.** [`Duration`] has no public
//!    constructor besides [`Duration::parse`] and the named defaults. A
//!    zero or negative interval cannot exist.
//!
//! 2. **UTC-only instants.** [`PacketTimestamp`] accepts any RFC 3339 offset
//!    on input and normalizes to UTC, keeping nanosecond precision so the
//!    temporal arithmetic is exact.
//!
//! 3. **Flat issue taxonomy.** [`IssueCode`] is a closed enum. Adding a code
//!    forces every `match` over it to be revisited.
//!
//! 4. **One issue per verdict.** [`Verdict::Invalid`] carries a single
//!    [`Issue`]; the wire shape still serializes it as a list.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ctxb-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests; the one `expect` is on a
//!   constant regex.

pub mod duration;
pub mod error;
pub mod issue;
pub mod temporal;
pub mod verdict;

// Re-export primary types for ergonomic imports.
pub use duration::{Duration, DEFAULT_ALLOW_FUTURE_CREATED_AT, DEFAULT_CLOCK_SKEW};
pub use error::{DurationError, DurationErrorKind, TimestampError};
pub use issue::{ExitClass, Issue, IssueCode};
pub use temporal::PacketTimestamp;
pub use verdict::{ValidationReport, Verdict};
