//! The DFA compiler. It closes an expression vector under partitioned derivation with an
//! explicit worklist, interning every distinct successor vector as a new state. Because the
//! smart constructors keep expressions canonical, equivalent successors are id-equal and the
//! state table stays finite.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::{
    dfa::{Dfa, DfaState},
    expr_vec::ExprVec,
    expression::ExprPool,
    StateID,
};

/// Counters reported after compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CompileStats {
    pub(crate) states: usize,
    pub(crate) accepting: usize,
    pub(crate) finals: usize,
}

struct Compiler<'p, F> {
    pool: &'p mut ExprPool,
    states: Vec<DfaState>,
    vectors: Vec<ExprVec>,
    ids: FxHashMap<ExprVec, StateID>,
    on_state: F,
}

impl<F> Compiler<'_, F>
where
    F: FnMut(&ExprPool, StateID, &ExprVec),
{
    /// Look up the state for a vector or create it. The notification callback fires exactly
    /// once per state, at the moment its id is assigned and before any of its transitions are
    /// filled in; a re-encountered vector is never notified again.
    fn add_state_if_new(&mut self, vector: ExprVec) -> StateID {
        if let Some(&id) = self.ids.get(&vector) {
            return id;
        }
        let id = StateID::new(self.states.len() as u32);
        self.states.push(DfaState {
            id,
            accepting: vector.nullable(self.pool),
            is_final: vector.is_final(self.pool),
            transitions: Vec::new(),
            default: id,
        });
        (self.on_state)(self.pool, id, &vector);
        self.ids.insert(vector.clone(), id);
        self.vectors.push(vector);
        id
    }

    fn run(mut self, start: ExprVec) -> Dfa {
        self.add_state_if_new(start);
        let mut next = 0;
        while next < self.vectors.len() {
            let state_id = StateID::new(next as u32);
            let map = self.vectors[next].clone().derive_map(self.pool);
            trace!(
                "state {} has {} exceptional classes",
                state_id,
                map.classes().len()
            );
            let mut transitions = Vec::with_capacity(map.classes().len());
            for (succ, set) in map.classes() {
                let target = self.add_state_if_new(succ.clone());
                transitions.push((set.clone(), target));
            }
            let default = self.add_state_if_new(map.default_successor().clone());
            let state = &mut self.states[state_id];
            state.transitions = transitions;
            state.default = default;
            next += 1;
        }
        Dfa::new(self.states)
    }
}

/// Compile an expression vector into a DFA. `on_state` is invoked for every freshly created
/// state with the pool, the assigned id and the source vector.
pub(crate) fn compile<F>(pool: &mut ExprPool, start: ExprVec, on_state: F) -> (Dfa, CompileStats)
where
    F: FnMut(&ExprPool, StateID, &ExprVec),
{
    let compiler = Compiler {
        pool,
        states: Vec::new(),
        vectors: Vec::new(),
        ids: FxHashMap::default(),
        on_state,
    };
    let dfa = compiler.run(start);
    let stats = CompileStats {
        states: dfa.states().len(),
        accepting: dfa.states().iter().filter(|s| s.accepting).count(),
        finals: dfa.states().iter().filter(|s| s.is_final).count(),
    };
    debug!(
        "compiled {} states ({} accepting, {} final)",
        stats.states, stats.accepting, stats.finals
    );
    (dfa, stats)
}
