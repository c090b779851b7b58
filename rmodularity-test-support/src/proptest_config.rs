//! Proptest configuration shared by every property suite.
//!
//! `PROGTEST_CASES` overrides the case count and `RMODULARITY_PBT_FORK`
//! switches forked execution on or off. Malformed values are logged and
//! ignored.

use std::env;

use proptest::test_runner::Config;

/// Environment variable overriding the number of cases per property.
pub const CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable enabling forked execution.
pub const FORK_ENV_KEY: &str = "RMODULARITY_PBT_FORK";

/// Configuration for a suite that normally runs `default_cases` cases per
/// property without forking.
///
/// # Examples
///
/// ```
/// use rmodularity_test_support::proptest_config::suite_config;
///
/// assert!(suite_config(64).cases > 0);
/// ```
#[must_use]
pub fn suite_config(default_cases: u32) -> Config {
    Config {
        cases: read(CASES_ENV_KEY, parse_cases).unwrap_or(default_cases),
        fork: read(FORK_ENV_KEY, parse_switch).unwrap_or(false),
        ..Config::default()
    }
}

fn read<T>(key: &'static str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = env::var(key).ok()?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        tracing::warn!(env = key, raw = %raw, "ignoring malformed property-test override");
    }
    parsed
}

fn parse_cases(raw: &str) -> Option<u32> {
    raw.trim().parse().ok().filter(|&cases| cases > 0)
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
