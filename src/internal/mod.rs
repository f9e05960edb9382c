/// Module that provides interval-based character sets.
mod char_set;

/// Module that provides the DFA compiler.
mod compiler;
pub(crate) use compiler::compile;

/// Module that provides partitioned derivatives.
mod derivation_map;

/// Module that provides the DFA runtime.
mod dfa;
pub(crate) use dfa::Dfa;

/// Module with conversion to graphviz dot format.
#[cfg(feature = "dot_writer")]
pub(crate) mod dot;

/// Module that provides the expression algebra.
mod expression;
pub(crate) use expression::ExprPool;

/// Module that provides expression vectors.
mod expr_vec;
pub(crate) use expr_vec::ExprVec;

/// Module for several ID types.
mod ids;
pub(crate) use ids::{ExprID, PatternID, StateID};

/// Module that provides the surface-syntax parser.
mod parser;
pub(crate) use parser::parse_pattern;
