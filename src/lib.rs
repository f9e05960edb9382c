#![forbid(missing_docs)]
//! # `descan`
//! The `descan` crate is a multi-pattern text scanner built on Brzozowski-style regular
//! expression derivatives.
//! From a vector of named patterns it compiles a single deterministic finite automaton whose
//! states are equivalence classes of derivatives, then streams input characters through that
//! automaton and reports the longest match at each position, with ties broken in favour of the
//! earliest-declared pattern.
//! A compiled [`ScannerCtxt`] is immutable and reusable: build it once, share it, and create as
//! many [`Scanner`] instances from it as needed. Patterns can be defined programmatically or
//! loaded from a JSON definition file, and a compiled context can be serialized for reuse.

/// Module with error definitions
mod errors;
pub use errors::{DescanError, DescanErrorKind, Result};

/// The module with internal implementation details.
mod internal;

/// Module that provides a Match type
mod match_type;
pub use match_type::Match;

/// Module that provides the Pattern and PatternId types
mod pattern;
pub use pattern::{Pattern, PatternId};

/// The module with the scanner context.
mod context;
pub use context::ScannerCtxt;

/// The module with the streaming scanner.
mod scanner;
pub use scanner::Scanner;

/// Module that provides the pattern definition file reader
mod pattern_file;
pub use pattern_file::{load_patterns, parse_patterns};
