// src/pattern/mod.rs

//! Segment-wise wildcard matching of declared event vocabularies.
//!
//! A package declares patterns such as `message/*` or `guild/**`. Concrete
//! handler folders (`functions/<package>/message/create`) are checked against
//! them with [`matches`]:
//!
//! - `*` matches exactly one segment.
//! - A trailing `**` matches any candidate that starts with the segments in
//!   front of the pattern's first `**`, whatever its remaining length.
//! - An interior `**` skips candidate segments up to the first one matched by
//!   the following pattern segment, then matching resumes after it.
//! - Only the first `**` of a pattern is special. Later `**` segments are
//!   compared literally.
//! - The trailing-`**` prefix is compared literally, so a `*` in front of a
//!   trailing `**` (e.g. `message/*/**`) only matches a literal `*` segment.

use std::fmt;

/// Identifier contribution of a matched `*`.
pub const SINGLE_PLACEHOLDER: &str = "X";
/// Identifier contribution of a matched `**`.
pub const DOUBLE_PLACEHOLDER: &str = "XX";

const SINGLE: &str = "*";
const DOUBLE: &str = "**";

/// Split user input into event segments.
///
/// Input is trimmed and lower-cased; `/`, `.`, `\` and `_` all separate
/// segments. Empty segments are dropped.
pub fn split_event(input: &str) -> Vec<String> {
    input
        .trim()
        .to_lowercase()
        .split(['/', '.', '\\', '_'])
        .filter(|seg| !seg.is_empty())
        .map(str::to_string)
        .collect()
}

/// Does `pattern` sanction `candidate`?
pub fn matches<P, C>(pattern: &[P], candidate: &[C]) -> bool
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let pattern: Vec<&str> = pattern.iter().map(AsRef::as_ref).collect();
    let candidate: Vec<&str> = candidate.iter().map(AsRef::as_ref).collect();

    let first_double = pattern.iter().position(|seg| *seg == DOUBLE);

    if let Some(idx) = first_double {
        if pattern.last() == Some(&DOUBLE) {
            let prefix = &pattern[..idx];
            if candidate.len() >= prefix.len() && candidate[..prefix.len()] == *prefix {
                return true;
            }
        }
    }

    let mut pi = 0;
    let mut ci = 0;

    while pi < pattern.len() && ci < candidate.len() {
        let seg = pattern[pi];

        if seg == DOUBLE && Some(pi) == first_double {
            pi += 1;
            let Some(&next) = pattern.get(pi) else {
                // Trailing `**` whose prefix did not match.
                return false;
            };
            while ci < candidate.len() && !segment_matches(next, candidate[ci]) {
                ci += 1;
            }
            if ci == candidate.len() {
                return false;
            }
            pi += 1;
            ci += 1;
        } else if segment_matches(seg, candidate[ci]) {
            pi += 1;
            ci += 1;
        } else {
            return false;
        }
    }

    pi == pattern.len() && ci == candidate.len()
}

fn segment_matches(pattern_seg: &str, candidate_seg: &str) -> bool {
    pattern_seg == SINGLE || pattern_seg == candidate_seg
}

/// Capitalise the first character of a segment.
pub fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `["message", "create"]` → `MessageCreate`.
pub fn event_identifier<S: AsRef<str>>(event: &[S]) -> String {
    event.iter().map(|seg| capitalize(seg.as_ref())).collect()
}

/// A parsed event pattern such as `message/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPattern {
    segments: Vec<String>,
}

impl EventPattern {
    pub fn parse(pattern: &str) -> Self {
        Self {
            segments: split_event(pattern),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_literal(&self) -> bool {
        !self.segments.iter().any(|seg| seg == SINGLE || seg == DOUBLE)
    }

    pub fn matches<C: AsRef<str>>(&self, candidate: &[C]) -> bool {
        matches(&self.segments, candidate)
    }

    /// Identifier used in generated code: concrete segments capitalised,
    /// `*` as `X`, `**` as `XX`.
    pub fn identifier(&self) -> String {
        self.segments
            .iter()
            .map(|seg| match seg.as_str() {
                DOUBLE => DOUBLE_PLACEHOLDER.to_string(),
                SINGLE => SINGLE_PLACEHOLDER.to_string(),
                other => capitalize(other),
            })
            .collect()
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Identifier for `event` if one of `patterns` sanctions it.
///
/// An exact literal match names the event itself; otherwise the first
/// matching pattern names it. `None` means the folder is not a valid event of
/// the package.
pub fn resolve_identifier<P, C>(patterns: &[P], event: &[C]) -> Option<String>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let parsed: Vec<EventPattern> = patterns
        .iter()
        .map(|p| EventPattern::parse(p.as_ref()))
        .collect();

    let exact = parsed.iter().any(|p| {
        p.is_literal()
            && p.segments().len() == event.len()
            && p.segments().iter().zip(event).all(|(a, b)| a == b.as_ref())
    });
    if exact {
        return Some(event_identifier(event));
    }

    parsed
        .iter()
        .find(|p| p.matches(event))
        .map(EventPattern::identifier)
}
