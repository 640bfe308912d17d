//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `compare.rs` — end-to-end environment comparison.
//! - `team.rs` — team mapping decode + record filtering.
//! - `diff.rs` — key-indexed diff of two environments.
//! - `policy.rs` — per environment pair comparison rules.
//! - `changes.rs` — commit range (change manifest) fetch + persistence.
//! - `report.rs` — HTML table rendering.
//! - `github.rs` — hosting API client.
//! - `storage.rs` — working directory layout and file writes.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod changes;
pub mod compare;
pub mod diff;
pub mod github;
pub mod output;
pub mod policy;
pub mod report;
pub mod storage;
pub mod team;
