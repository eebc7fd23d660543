//! URL-pattern routing engine.
//!
//! Maps normalized request paths to registered handlers through a
//! priority-ordered tree of path segments: literal, regex and
//! named-wildcard segments, a backtracking lookup, and a fallback chain
//! for trailing-slash redirects and nearest-ancestor handlers.

pub mod routing;

pub use routing::{FallbackEntry, Resolution, RouteError, RouteMatch, RouteVars, Router};
