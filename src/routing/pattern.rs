//! Pattern compilation.
//!
//! # Responsibilities
//! - Parse one textual route pattern into an ordered segment chain
//! - Split capture prefixes (`{name}` / `<name>`) from the match body
//! - Anchor and compile regex bodies
//! - Assign the priority class that drives sibling ordering
//!
//! # Design Decisions
//! - Only the `{}` capture form may carry regex text; `<>` stays literal
//! - Regex bodies are implicitly anchored with `^`/`$`
//! - The trailing empty part after a final `/` is kept as an explicit
//!   slash-tail segment; empty interior parts are rejected
//! - Compilation is pure: no locks, no shared state

use std::collections::HashSet;

use regex::Regex;

use crate::routing::error::RouteError;

/// Match priority of one segment. Siblings are attempted in descending
/// class order, so literals shadow regexes, which shadow bare captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum PriorityClass {
    /// Bare `{name}` / `<name>`: accepts any non-empty segment.
    AnyNonEmpty,
    /// `{name}` followed by regex text.
    Regex,
    /// Exact, case-sensitive text (includes the empty slash tail).
    Literal,
}

/// One `/`-delimited part of a compiled pattern.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    /// Capture name, or empty when the segment binds nothing.
    pub name: String,
    /// Literal text, or the anchored regex source for regex segments.
    pub pattern: String,
    /// Compiled matcher, present only for `PriorityClass::Regex`.
    pub regex: Option<Regex>,
    /// Position in the pattern; -1 is reserved for the virtual root.
    pub ordinal: i32,
    pub class: PriorityClass,
    /// Remaining depth from this segment down to the pattern tail.
    pub depth: usize,
}

impl Segment {
    fn root() -> Self {
        Segment {
            name: String::new(),
            pattern: String::new(),
            regex: None,
            ordinal: -1,
            class: PriorityClass::Literal,
            depth: 0,
        }
    }
}

/// Compile a route pattern into its segment chain.
pub(crate) fn compile(pattern: &str) -> Result<Vec<Segment>, RouteError> {
    let pattern = pattern.trim();

    if pattern.is_empty() {
        return Err(RouteError::EmptyPattern);
    }
    if !pattern.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash(pattern.to_owned()));
    }
    if pattern == "/" {
        return Ok(vec![Segment::root()]);
    }

    let parts: Vec<&str> = pattern[1..].split('/').collect();
    let depth = parts.len();
    let mut seen = HashSet::new();
    let mut segments = Vec::with_capacity(depth);

    for (i, part) in parts.iter().enumerate() {
        // Only the final part may be empty (the explicit slash tail).
        if part.is_empty() && i != depth - 1 {
            return Err(RouteError::EmptySegment(pattern.to_owned()));
        }

        let (name, body, is_regex) = split_capture(part);
        if !name.is_empty() && !seen.insert(name.clone()) {
            return Err(RouteError::DuplicateName {
                pattern: pattern.to_owned(),
                name,
            });
        }

        let regex = if is_regex {
            if body == "^$" {
                return Err(RouteError::EmptyRegex(pattern.to_owned()));
            }
            Some(Regex::new(&body).map_err(|source| RouteError::InvalidRegex {
                pattern: pattern.to_owned(),
                segment: (*part).to_owned(),
                source,
            })?)
        } else {
            None
        };

        let class = if body.is_empty() && !name.is_empty() {
            PriorityClass::AnyNonEmpty
        } else if regex.is_some() {
            PriorityClass::Regex
        } else {
            PriorityClass::Literal
        };

        segments.push(Segment {
            name,
            pattern: body,
            regex,
            ordinal: i as i32,
            class,
            depth: depth - i,
        });
    }

    Ok(segments)
}

/// Split one pattern part into `(name, body, is_regex)`.
///
/// The capture name is enclosed in `{}` or `<>` as a prefix and may be
/// empty. The body is whatever follows the prefix; it is regex text only
/// when the `{}` form was used and the body is non-empty, in which case
/// it comes back anchored.
pub(crate) fn split_capture(part: &str) -> (String, String, bool) {
    if part.is_empty() {
        return (String::new(), String::new(), false);
    }

    let close = match part.as_bytes()[0] {
        b'{' => '}',
        b'<' => '>',
        _ => return (String::new(), part.to_owned(), false),
    };

    let Some(idx) = part.find(close) else {
        // No closing brace: the whole part is literal text.
        return (String::new(), part.to_owned(), false);
    };

    let name = part[1..idx].to_owned();
    let rest = &part[idx + 1..];

    if close == '}' && !rest.is_empty() {
        let mut body = String::with_capacity(rest.len() + 2);
        if !rest.starts_with('^') {
            body.push('^');
        }
        body.push_str(rest);
        if !rest.ends_with('$') {
            body.push('$');
        }
        return (name, body, true);
    }

    (name, rest.to_owned(), false)
}
