//! Routing error taxonomy.

use thiserror::Error;

/// Errors surfaced by route registration. Lookup never errors: an
/// unmatched path yields an absent handler plus whatever fallback chain
/// could be assembled.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Pattern is empty or all whitespace.
    #[error("empty pattern")]
    EmptyPattern,

    /// Pattern does not start with '/'.
    #[error("pattern {0:?} must start with \"/\"")]
    MissingLeadingSlash(String),

    /// Empty interior segment, e.g. a doubled '/'.
    #[error("empty route (or duplicated '/') in pattern {0:?}")]
    EmptySegment(String),

    /// The same capture name appears twice in one pattern.
    #[error("duplicated route name {name:?} in pattern {pattern:?}")]
    DuplicateName { pattern: String, name: String },

    /// A regex segment reduced to `^$`.
    #[error("empty regex segment in pattern {0:?}")]
    EmptyRegex(String),

    /// A regex segment failed to compile.
    #[error("unable to compile route {segment:?} in pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        segment: String,
        #[source]
        source: regex::Error,
    },

    /// An exact match for the pattern already terminates at a node with a
    /// handler.
    #[error("pattern {0:?} already exists")]
    DuplicatePattern(String),
}

impl RouteError {
    /// True for the malformed-pattern class of failures, as opposed to a
    /// duplicate registration.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, RouteError::DuplicatePattern(_))
    }
}
