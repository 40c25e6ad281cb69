//! Deduplicating result accumulator
//!
//! Append-only sink shared by the schema validator and every profile check.
//! Duplicate findings (same code, value and message) are collapsed
//! silently; iteration order is insertion order after deduplication, which
//! keeps result sequences byte-identical across runs.

use std::collections::{BTreeSet, HashSet};

use super::types::RdapValidationResult;

/// Per-run accumulator of validation results.
///
/// One accumulator per validated target; accumulators are never shared
/// between runs.
#[derive(Debug, Default)]
pub struct RdapValidatorResults {
    results: Vec<RdapValidationResult>,
    seen: HashSet<RdapValidationResult>,
    groups: BTreeSet<String>,
    group_errors: BTreeSet<String>,
}

impl RdapValidatorResults {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result unless an equal one was already recorded.
    pub fn add(&mut self, result: RdapValidationResult) {
        if self.seen.insert(result.clone()) {
            self.results.push(result);
        }
    }

    /// Records that a profile check group was launched.
    pub fn add_group(&mut self, group: &str) {
        self.groups.insert(group.to_string());
    }

    /// Records that a launched group produced at least one finding.
    pub fn add_group_error(&mut self, group: &str) {
        self.group_errors.insert(group.to_string());
    }

    /// All results, in insertion order.
    pub fn all(&self) -> &[RdapValidationResult] {
        &self.results
    }

    /// Iterates results in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RdapValidationResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Launched profile check groups, sorted.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Groups that produced findings, sorted.
    pub fn group_errors(&self) -> impl Iterator<Item = &str> {
        self.group_errors.iter().map(String::as_str)
    }

    /// True iff some recorded result carries `code`.
    pub fn contains_code(&self, code: i32) -> bool {
        self.results.iter().any(|r| r.code == code)
    }
}
