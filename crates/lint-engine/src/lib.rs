//! Linting with an effective policy
//!
//! Takes a [`Configuration`](lint_config::Configuration) produced by
//! `lint-config` and applies it to source files:
//!
//! - [`suppression`] - inline `lint:` commands and the regions they disable
//! - [`Linter`] - parallel collect and validate passes over files
//! - [`LinterCache`] - results persisted per policy fingerprint and file
//! - [`Baseline`] - previously accepted violations
//! - [`rules`] - the built-in rules and [`builtin_catalog`]

pub mod baseline;
pub mod cache;
pub mod error;
pub mod files;
pub mod linter;
pub mod report;
pub mod rules;
pub mod suppression;

pub use baseline::{Baseline, BaselineViolation};
pub use cache::{CacheEntry, CollectedInfo, LinterCache, Timestamp};
pub use error::{Error, Result};
pub use files::{collect_files, read_source_files};
pub use linter::Linter;
pub use report::{Report, ReportFormat};
pub use rules::builtin_catalog;
pub use suppression::{Command, Region, Suppressions};
