//! Persists and restores the state of a test-run report.
//!
//! A [`suite::Suite`] aggregates run metadata and per-test summary records;
//! a [`mixin::Test`] carries the detailed outcome sets recorded while one
//! test ran. The [`reporter`] adapters map both onto documents under a
//! caller-supplied directory and read the summary state back on the next run.

#[macro_use]
extern crate derive_builder;

#[macro_use]
extern crate log;

pub mod mixin;
pub mod reporter;
pub mod suite;
