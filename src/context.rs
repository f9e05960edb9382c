//! The scanner context: the compiled automaton paired with the state→pattern index. A context
//! is created once from a pattern list and can then back any number of scanner instances; it is
//! deeply immutable and safe to share across threads.

use log::error;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::internal::{compile, parse_pattern, Dfa, ExprPool, ExprVec, PatternID, StateID};
use crate::{DescanError, DescanErrorKind, Pattern, Result};

/// The schema id of the serialized context format. Bumped whenever the encoding of the context
/// changes incompatibly; blobs with a different schema are rejected on restore.
const SCHEMA_VERSION: u32 = 1;

/// A compiled scanner context.
///
/// Construction parses every pattern, bundles the surviving expressions into one vector and
/// compiles it to a DFA. Patterns whose regex fails to parse are logged and skipped; the
/// remaining patterns keep their relative order, which determines match priority.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScannerCtxt {
    dfa: Dfa,
    patterns: Vec<Pattern>,
    state_patterns: FxHashMap<StateID, Vec<PatternID>>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema: u32,
    ctxt: &'a ScannerCtxt,
}

#[derive(Deserialize)]
struct Envelope {
    schema: u32,
    ctxt: ScannerCtxt,
}

impl ScannerCtxt {
    /// Build a context from a pattern list.
    ///
    /// Patterns with a malformed regex are reported to the log and excluded; they do not abort
    /// the construction. An empty pattern list yields a context whose scanner never reports a
    /// match.
    pub fn new(patterns: Vec<Pattern>) -> Self {
        let mut pool = ExprPool::new();
        let mut survivors = Vec::with_capacity(patterns.len());
        let mut exprs = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            match parse_pattern(&mut pool, pattern.regex()) {
                Ok(expr) => {
                    exprs.push(expr);
                    survivors.push(pattern);
                }
                Err(err) => error!("skipping pattern {}: {}", pattern, err),
            }
        }
        let mut state_patterns: FxHashMap<StateID, Vec<PatternID>> = FxHashMap::default();
        let (dfa, _stats) = compile(&mut pool, ExprVec::new(exprs), |pool, state_id, vector| {
            // Record which coordinates accept at this state, in declaration order.
            let accepting: Vec<PatternID> = vector
                .coordinates()
                .iter()
                .enumerate()
                .filter(|(_, &expr)| pool.nullable(expr))
                .map(|(i, _)| PatternID::new(i))
                .collect();
            if !accepting.is_empty() {
                state_patterns.insert(state_id, accepting);
            }
        });
        Self {
            dfa,
            patterns: survivors,
            state_patterns,
        }
    }

    /// The patterns that survived construction, in declaration order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Check whether the whole input is matched by any pattern of the context.
    pub fn matches(&self, input: &str) -> bool {
        self.dfa.matches(input)
    }

    /// Serialize the context into a versioned binary blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(&EnvelopeRef {
            schema: SCHEMA_VERSION,
            ctxt: self,
        })
        .map_err(|err| DescanError::new(DescanErrorKind::Deserialization(err.to_string())))
    }

    /// Restore a context from a blob produced by [`ScannerCtxt::to_bytes`].
    ///
    /// A corrupted blob or a schema mismatch yields an error; no partial context is returned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Envelope = bincode::deserialize(bytes)
            .map_err(|err| DescanError::new(DescanErrorKind::Deserialization(err.to_string())))?;
        if envelope.schema != SCHEMA_VERSION {
            return Err(DescanError::new(DescanErrorKind::Deserialization(format!(
                "unsupported schema version {} (expected {})",
                envelope.schema, SCHEMA_VERSION
            ))));
        }
        Ok(envelope.ctxt)
    }

    /// Render the automaton in graphviz dot format.
    #[cfg(feature = "dot_writer")]
    pub fn render_dot<W: std::io::Write>(&self, label: &str, output: &mut W) {
        crate::internal::dot::dfa_render(self, label, output);
    }

    pub(crate) fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// The patterns accepting at the given state, earliest-declared first. `None` means the
    /// state is not in the index at all.
    pub(crate) fn patterns_at(&self, state: StateID) -> Option<&[PatternID]> {
        self.state_patterns.get(&state).map(|v| v.as_slice())
    }

    pub(crate) fn pattern(&self, id: PatternID) -> &Pattern {
        &self.patterns[id]
    }

    #[cfg(feature = "dot_writer")]
    pub(crate) fn state_patterns(&self) -> &FxHashMap<StateID, Vec<PatternID>> {
        &self.state_patterns
    }
}
