//! Shared test utilities for the lint workspace.
//!
//! A dev-dependency only, never published. It depends on nothing above
//! `lint-rules` so every crate can use it in its own unit tests.
//!
//! # Modules
//!
//! - [`catalog`] - a small rule catalog of marker rules with an invocation counter
//! - [`tree`] - [`ConfigTree`](tree::ConfigTree) builder for temporary project trees

pub mod catalog;
pub mod tree;
