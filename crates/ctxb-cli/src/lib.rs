//! # ctxb-cli — Context Packet Validator CLI
//!
//! Thin shell around [`ctxb_packet`]: resolves settings from flags and an
//! optional YAML config file, reads the schema and packet from disk, runs
//! one validation against a single clock read, and prints the verdict.
//!
//! ## Exit Status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | packet valid |
//! | 1    | packet invalid |
//! | 2    | usage or environment error (bad flag, unreadable schema or packet) |
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - No validation logic lives here; handlers delegate to domain crates.
//! - stdout carries only the verdict; logs go to stderr.

pub mod config;
pub mod output;
pub mod validate;
