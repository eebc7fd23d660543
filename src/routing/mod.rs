//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     pattern string
//!         → pattern.rs (compile into a segment chain)
//!         → tree.rs (merge into the route tree, re-sort each level)  [write lock]
//!
//! Lookup:
//!     normalized path
//!         → matcher.rs (priority-ordered backtracking walk)          [read lock]
//!         → RouteMatch { handler, route variables, fallback chain }
//! ```
//!
//! # Design Decisions
//! - Literal > Regex > AnyNonEmpty priority disambiguates overlapping
//!   patterns independent of registration order
//! - The tree is append-only; registration is expected at startup
//! - Lookup never errors; partial matches surface a fallback chain

mod error;
mod matcher;
mod pattern;
mod router;
mod tree;

pub use error::RouteError;
pub use matcher::{FallbackEntry, RouteMatch, RouteVars};
pub use router::{Resolution, Router};
