//! Shared test utilities used across the rmodularity crates.
//!
//! [`tracing::RecordingLayer`] captures spans and events for instrumentation
//! assertions; [`proptest_config::suite_config`] builds the proptest
//! configuration every property suite runs with.

pub mod proptest_config;
pub mod tracing;
