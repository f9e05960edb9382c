//! The regular expression algebra. Expressions are immutable nodes held in an arena
//! (`ExprPool`) and referred to by `ExprID`. The pool hash-conses every node after the smart
//! constructors have applied the normalization laws, so algebraic equivalence (including
//! commutativity and associativity of union and intersection and associativity of
//! concatenation) is plain id equality, and hashing is hashing of the id. That property is
//! what keeps the derivative-based DFA construction finite.

use rustc_hash::FxHashMap;

use super::{char_set::CharSet, derivation_map::PartitionMap, ExprID};

/// A node of the expression algebra. Binary operators hold interned children; `Or` and `And`
/// chains are kept right-nested with operands sorted by id, `Concat` chains right-nested in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ExprNode {
    /// Matches no string at all.
    EmptySet,
    /// Matches exactly the empty string.
    EmptyString,
    /// Matches any single character.
    Any,
    /// Matches exactly one specific character.
    Symbol(char),
    /// Concatenation.
    Concat(ExprID, ExprID),
    /// Alternation.
    Or(ExprID, ExprID),
    /// Intersection.
    And(ExprID, ExprID),
    /// Kleene closure.
    Star(ExprID),
    /// Complement.
    Not(ExprID),
}

/// The arena of interned expressions with their cached nullability and finality.
#[derive(Debug)]
pub(crate) struct ExprPool {
    nodes: Vec<ExprNode>,
    nullable: Vec<bool>,
    finals: Vec<bool>,
    interned: FxHashMap<ExprNode, ExprID>,
}

impl ExprPool {
    /// The `∅` sentinel.
    pub(crate) const EMPTY_SET: ExprID = ExprID::new(0);
    /// The `ε` sentinel.
    pub(crate) const EMPTY_STRING: ExprID = ExprID::new(1);
    /// The `.` sentinel.
    pub(crate) const ANY: ExprID = ExprID::new(2);

    pub(crate) fn new() -> Self {
        let mut pool = ExprPool {
            nodes: Vec::new(),
            nullable: Vec::new(),
            finals: Vec::new(),
            interned: FxHashMap::default(),
        };
        // Intern the sentinels at their fixed ids.
        let empty_set = pool.intern(ExprNode::EmptySet);
        let empty_string = pool.intern(ExprNode::EmptyString);
        let any = pool.intern(ExprNode::Any);
        debug_assert_eq!(empty_set, Self::EMPTY_SET);
        debug_assert_eq!(empty_string, Self::EMPTY_STRING);
        debug_assert_eq!(any, Self::ANY);
        pool
    }

    fn intern(&mut self, node: ExprNode) -> ExprID {
        if let Some(&id) = self.interned.get(&node) {
            return id;
        }
        let id = ExprID::new(self.nodes.len() as u32);
        let (nullable, final_) = self.properties(&node);
        self.nodes.push(node.clone());
        self.nullable.push(nullable);
        self.finals.push(final_);
        self.interned.insert(node, id);
        id
    }

    /// Compute nullability and finality of a node whose children are already interned.
    /// An expression is final when no further input can change its acceptance decision.
    fn properties(&self, node: &ExprNode) -> (bool, bool) {
        match *node {
            ExprNode::EmptySet => (false, true),
            ExprNode::EmptyString => (true, false),
            ExprNode::Any => (false, false),
            ExprNode::Symbol(_) => (false, false),
            ExprNode::Concat(r, s) | ExprNode::And(r, s) => (
                self.nullable(r) && self.nullable(s),
                self.is_final(r) && self.is_final(s),
            ),
            ExprNode::Or(r, s) => (
                self.nullable(r) || self.nullable(s),
                self.is_final(r) && self.is_final(s),
            ),
            // A final but non-nullable body denotes the empty language, whose closure is ε and
            // not final; hence the nullability guard.
            ExprNode::Star(r) => (true, self.is_final(r) && self.nullable(r)),
            ExprNode::Not(r) => (!self.nullable(r), self.is_final(r)),
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: ExprID) -> &ExprNode {
        &self.nodes[id]
    }

    /// Does the expression match the empty string?
    #[inline]
    pub(crate) fn nullable(&self, id: ExprID) -> bool {
        self.nullable[id]
    }

    /// Is the expression permanently committed to its acceptance decision?
    #[inline]
    pub(crate) fn is_final(&self, id: ExprID) -> bool {
        self.finals[id]
    }

    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `¬∅`, the universal language.
    pub(crate) fn universal(&mut self) -> ExprID {
        self.not(Self::EMPTY_SET)
    }

    fn is_universal(&self, id: ExprID) -> bool {
        matches!(self.node(id), ExprNode::Not(r) if *r == Self::EMPTY_SET)
    }

    pub(crate) fn symbol(&mut self, c: char) -> ExprID {
        self.intern(ExprNode::Symbol(c))
    }

    /// `r · s` with the unit and zero laws applied, chains right-associated.
    pub(crate) fn concat(&mut self, r: ExprID, s: ExprID) -> ExprID {
        if r == Self::EMPTY_SET || s == Self::EMPTY_SET {
            return Self::EMPTY_SET;
        }
        if r == Self::EMPTY_STRING {
            return s;
        }
        if s == Self::EMPTY_STRING {
            return r;
        }
        if let ExprNode::Concat(a, b) = self.node(r).clone() {
            let rest = self.concat(b, s);
            return self.concat(a, rest);
        }
        self.intern(ExprNode::Concat(r, s))
    }

    /// `r ∨ s`. Operand chains are flattened, deduplicated and sorted by id before re-nesting,
    /// which makes the constructor commutative, associative and idempotent by construction.
    pub(crate) fn or(&mut self, r: ExprID, s: ExprID) -> ExprID {
        let mut ops = Vec::new();
        self.flatten(r, &mut ops, |node| match node {
            ExprNode::Or(a, b) => Some((*a, *b)),
            _ => None,
        });
        self.flatten(s, &mut ops, |node| match node {
            ExprNode::Or(a, b) => Some((*a, *b)),
            _ => None,
        });
        if ops.iter().any(|&op| self.is_universal(op)) {
            return self.universal();
        }
        ops.retain(|&op| op != Self::EMPTY_SET);
        ops.sort_unstable();
        ops.dedup();
        match ops.len() {
            0 => Self::EMPTY_SET,
            _ => self.fold_chain(ops, ExprNode::Or),
        }
    }

    /// `r ∧ s`, normalized like `or`.
    pub(crate) fn and(&mut self, r: ExprID, s: ExprID) -> ExprID {
        let mut ops = Vec::new();
        self.flatten(r, &mut ops, |node| match node {
            ExprNode::And(a, b) => Some((*a, *b)),
            _ => None,
        });
        self.flatten(s, &mut ops, |node| match node {
            ExprNode::And(a, b) => Some((*a, *b)),
            _ => None,
        });
        if ops.contains(&Self::EMPTY_SET) {
            return Self::EMPTY_SET;
        }
        let universal = self.universal();
        ops.retain(|&op| op != universal);
        ops.sort_unstable();
        ops.dedup();
        match ops.len() {
            0 => universal,
            _ => self.fold_chain(ops, ExprNode::And),
        }
    }

    /// `r*` with `(r*)* = r*` and `ε* = ∅* = ε`.
    pub(crate) fn star(&mut self, r: ExprID) -> ExprID {
        if r == Self::EMPTY_SET || r == Self::EMPTY_STRING {
            return Self::EMPTY_STRING;
        }
        if matches!(self.node(r), ExprNode::Star(_)) {
            return r;
        }
        self.intern(ExprNode::Star(r))
    }

    /// `¬r` with double negation collapsed.
    pub(crate) fn not(&mut self, r: ExprID) -> ExprID {
        if let ExprNode::Not(inner) = *self.node(r) {
            return inner;
        }
        self.intern(ExprNode::Not(r))
    }

    fn flatten<F>(&self, id: ExprID, out: &mut Vec<ExprID>, split: F)
    where
        F: Fn(&ExprNode) -> Option<(ExprID, ExprID)> + Copy,
    {
        match split(self.node(id)) {
            Some((a, b)) => {
                self.flatten(a, out, split);
                self.flatten(b, out, split);
            }
            None => out.push(id),
        }
    }

    fn fold_chain<F>(&mut self, ops: Vec<ExprID>, make: F) -> ExprID
    where
        F: Fn(ExprID, ExprID) -> ExprNode,
    {
        let mut iter = ops.into_iter().rev();
        let mut acc = iter.next().expect("operand chain is never empty");
        for op in iter {
            acc = self.intern(make(op, acc));
        }
        acc
    }

    /// The Brzozowski derivative of `r` with respect to `c`.
    pub(crate) fn derive(&mut self, r: ExprID, c: char) -> ExprID {
        match self.node(r).clone() {
            ExprNode::EmptySet | ExprNode::EmptyString => Self::EMPTY_SET,
            ExprNode::Any => Self::EMPTY_STRING,
            ExprNode::Symbol(a) => {
                if a == c {
                    Self::EMPTY_STRING
                } else {
                    Self::EMPTY_SET
                }
            }
            ExprNode::Concat(a, b) => {
                let da = self.derive(a, c);
                let left = self.concat(da, b);
                if self.nullable(a) {
                    let db = self.derive(b, c);
                    self.or(left, db)
                } else {
                    left
                }
            }
            ExprNode::Or(a, b) => {
                let da = self.derive(a, c);
                let db = self.derive(b, c);
                self.or(da, db)
            }
            ExprNode::And(a, b) => {
                let da = self.derive(a, c);
                let db = self.derive(b, c);
                self.and(da, db)
            }
            ExprNode::Star(a) => {
                let da = self.derive(a, c);
                self.concat(da, r)
            }
            ExprNode::Not(a) => {
                let da = self.derive(a, c);
                self.not(da)
            }
        }
    }

    /// The partitioned derivative of `r`: a classification of the whole alphabet into finitely
    /// many classes with distinct successors. `derive_map(r).lookup(c)` agrees with
    /// `derive(r, c)` for every character.
    pub(crate) fn derive_map(&mut self, r: ExprID) -> PartitionMap<ExprID> {
        match self.node(r).clone() {
            ExprNode::EmptySet | ExprNode::EmptyString => PartitionMap::uniform(Self::EMPTY_SET),
            ExprNode::Any => PartitionMap::uniform(Self::EMPTY_STRING),
            ExprNode::Symbol(a) => PartitionMap::new(
                vec![(Self::EMPTY_STRING, CharSet::single(a))],
                Self::EMPTY_SET,
            ),
            ExprNode::Concat(a, b) => {
                let ma = self.derive_map(a);
                let nullable_a = self.nullable(a);
                let mb = self.derive_map(b);
                ma.combined(&mb, nullable_a, |&da, &db| {
                    let left = self.concat(da, b);
                    if nullable_a {
                        self.or(left, db)
                    } else {
                        left
                    }
                })
            }
            ExprNode::Or(a, b) => {
                let ma = self.derive_map(a);
                let mb = self.derive_map(b);
                ma.combined(&mb, true, |&da, &db| self.or(da, db))
            }
            ExprNode::And(a, b) => {
                let ma = self.derive_map(a);
                let mb = self.derive_map(b);
                ma.combined(&mb, true, |&da, &db| self.and(da, db))
            }
            ExprNode::Star(a) => {
                let ma = self.derive_map(a);
                ma.map(|&da| self.concat(da, r))
            }
            ExprNode::Not(a) => {
                let ma = self.derive_map(a);
                ma.map(|&da| self.not(da))
            }
        }
    }

    /// Render an expression for diagnostics.
    #[allow(dead_code)]
    pub(crate) fn display(&self, id: ExprID) -> String {
        match *self.node(id) {
            ExprNode::EmptySet => "∅".to_string(),
            ExprNode::EmptyString => "ε".to_string(),
            ExprNode::Any => ".".to_string(),
            ExprNode::Symbol(c) => c.escape_default().to_string(),
            ExprNode::Concat(a, b) => format!("({}{})", self.display(a), self.display(b)),
            ExprNode::Or(a, b) => format!("({}|{})", self.display(a), self.display(b)),
            ExprNode::And(a, b) => format!("({}&{})", self.display(a), self.display(b)),
            ExprNode::Star(a) => format!("{}*", self.display(a)),
            ExprNode::Not(a) => format!("¬{}", self.display(a)),
        }
    }
}
