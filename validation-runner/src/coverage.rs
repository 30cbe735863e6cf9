// Copyright (c) The validation-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instruction hit-count maps and their text log form.
//!
//! A [`CoverageMap`] maps an instruction identifier to the number of times it was hit. Run-level
//! records store these maps as a text log so the persistence schema doesn't need to know about
//! variable-length coverage data. The log has one `instruction:count` pair per line.
//!
//! # Log format
//!
//! * Lines are separated by `\n`. Ordering is not significant.
//! * Each line is split on its *last* `:`. Counts are decimal integers, so instruction
//!   identifiers may themselves contain `:`.
//! * Within identifiers, `\` is written as `\\`, a line feed as `\n` and a carriage return as
//!   `\r`.
//! * Lines without a `:` or with a count that isn't a non-negative integer are skipped while
//!   decoding. If an identifier appears more than once, the last occurrence wins.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};
use swrite::{SWrite, swriteln};
use tracing::debug;

/// The separator between an instruction identifier and its count in a coverage log.
pub const LOG_DELIMITER: char = ':';

/// A map from instruction identifier to hit count.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CoverageMap(BTreeMap<String, u64>);

impl CoverageMap {
    /// Creates a new, empty `CoverageMap`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct instructions in this map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no instructions have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the hit count for an instruction, if it was recorded.
    pub fn get(&self, instr: &str) -> Option<u64> {
        self.0.get(instr).copied()
    }

    /// Iterates over `(instruction, count)` pairs in identifier order.
    pub fn iter(&self) -> CoverageIter<'_> {
        CoverageIter {
            inner: self.0.iter(),
        }
    }

    /// Adds `count` hits for `instr`, summing with any existing count.
    pub fn record(&mut self, instr: impl Into<String>, count: u64) {
        let entry = self.0.entry(instr.into()).or_default();
        *entry = entry.saturating_add(count);
    }

    /// Merges another map into this one, summing counts for instructions present in both.
    pub fn merge(&mut self, other: &CoverageMap) {
        for (instr, count) in other.iter() {
            self.record(instr, count);
        }
    }

    /// Serializes this map to its text log form.
    pub fn to_log(&self) -> String {
        let mut out = String::new();
        for (instr, count) in &self.0 {
            escape_instr(instr, &mut out);
            swriteln!(out, "{LOG_DELIMITER}{count}");
        }
        out
    }

    /// Parses a text log back into a map.
    ///
    /// Malformed lines are skipped rather than treated as errors.
    pub fn from_log(log: &str) -> Self {
        let mut map = BTreeMap::new();
        for (line_no, line) in log.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some((instr, count)) = line.rsplit_once(LOG_DELIMITER) else {
                debug!(
                    "skipping coverage log line {}: no `{LOG_DELIMITER}` separator",
                    line_no + 1,
                );
                continue;
            };
            let count = match count.trim().parse::<u64>() {
                Ok(count) => count,
                Err(error) => {
                    debug!(
                        "skipping coverage log line {}: invalid count `{count}`: {error}",
                        line_no + 1,
                    );
                    continue;
                }
            };
            map.insert(unescape_instr(instr), count);
        }
        Self(map)
    }
}

impl FromIterator<(String, u64)> for CoverageMap {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (instr, count) in iter {
            map.record(instr, count);
        }
        map
    }
}

impl<'a> IntoIterator for &'a CoverageMap {
    type Item = (&'a str, u64);
    type IntoIter = CoverageIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`CoverageMap`].
///
/// Returned by [`CoverageMap::iter`].
#[derive(Clone, Debug)]
pub struct CoverageIter<'a> {
    inner: btree_map::Iter<'a, String, u64>,
}

impl<'a> Iterator for CoverageIter<'a> {
    type Item = (&'a str, u64);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(instr, count)| (instr.as_str(), *count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

fn escape_instr(instr: &str, out: &mut String) {
    for c in instr.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

fn unescape_instr(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            // Unknown escapes are kept verbatim.
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
