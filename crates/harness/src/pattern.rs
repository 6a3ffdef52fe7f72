// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Expect patterns.
//!
//! A pattern is either a literal substring or a regular expression. Both
//! search raw output bytes, so a match never depends on where the child's
//! writes happened to split a UTF-8 sequence.

use std::fmt;
use std::ops::Range;

use memchr::memmem;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Debug)]
pub enum Pattern {
    /// Match this exact text anywhere in the stream.
    Literal(String),
    /// Match a regular expression.
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Compile a regular expression pattern.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    /// Byte range of the first match in `haystack`.
    pub fn find(&self, haystack: &[u8]) -> Option<Range<usize>> {
        self.find_from(haystack, 0)
    }

    /// Like [`find`](Self::find) for a haystack whose first `scanned` bytes
    /// were already searched without a match. Only the region a new match
    /// can touch is searched again.
    ///
    /// A regex restarts at the start of the line holding `scanned`, looking
    /// back at most [`REGEX_LOOKBACK`] bytes.
    pub fn find_from(&self, haystack: &[u8], scanned: usize) -> Option<Range<usize>> {
        let scanned = scanned.min(haystack.len());
        match self {
            Self::Literal(text) => {
                let needle = text.as_bytes();
                let from = scanned.saturating_sub(needle.len().saturating_sub(1));
                memmem::find(&haystack[from..], needle)
                    .map(|at| from + at..from + at + needle.len())
            }
            Self::Regex(re) => re
                .find_at(haystack, regex_restart(haystack, scanned))
                .map(|m| m.range()),
        }
    }
}

/// Furthest a regex search backs up into already-scanned output.
pub const REGEX_LOOKBACK: usize = 16 * 1024;

fn regex_restart(haystack: &[u8], scanned: usize) -> usize {
    let floor = scanned.saturating_sub(REGEX_LOOKBACK);
    memchr::memrchr(b'\n', &haystack[floor..scanned]).map_or(floor, |nl| floor + nl + 1)
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text:?}"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

impl From<&Pattern> for Pattern {
    fn from(pattern: &Pattern) -> Self {
        pattern.clone()
    }
}

/// Pattern as written in scenario files: a bare string is a literal.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PatternSpec {
    Text(String),
    Tagged(TaggedPattern),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum TaggedPattern {
    /// Contains substring
    Contains { text: String },
    /// Regex pattern
    Regex { pattern: String },
}

impl PatternSpec {
    pub fn compile(&self) -> Result<Pattern> {
        match self {
            Self::Text(text) | Self::Tagged(TaggedPattern::Contains { text }) => {
                Ok(Pattern::literal(text.clone()))
            }
            Self::Tagged(TaggedPattern::Regex { pattern }) => Pattern::regex(pattern),
        }
    }
}

/// Earliest match among `patterns`; ties go to the lower index.
///
/// `scanned` is the prefix of `haystack` already searched with no match.
pub(crate) fn earliest(
    patterns: &[Pattern],
    haystack: &[u8],
    scanned: usize,
) -> Option<(usize, Range<usize>)> {
    patterns
        .iter()
        .enumerate()
        .filter_map(|(index, pattern)| {
            pattern
                .find_from(haystack, scanned)
                .map(|range| (index, range))
        })
        .min_by_key(|(index, range)| (range.start, *index))
}

/// Human-readable form of a pattern set for error messages.
pub(crate) fn describe(patterns: &[Pattern]) -> String {
    match patterns {
        [single] => single.to_string(),
        many => {
            let parts: Vec<String> = many.iter().map(Pattern::to_string).collect();
            format!("any of [{}]", parts.join(", "))
        }
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
