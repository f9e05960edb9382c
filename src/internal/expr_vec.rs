//! Expression vectors. A vector tracks one expression per pattern so that a single DFA can
//! follow all patterns in lockstep. Element order is semantically significant: it is the
//! pattern declaration order and determines match attribution.

use super::{derivation_map::PartitionMap, expression::ExprPool, ExprID};

/// An ordered sequence of expressions. Two vectors are equal only when they are coordinate-wise
/// equal in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ExprVec(Vec<ExprID>);

impl ExprVec {
    pub(crate) fn new(exprs: Vec<ExprID>) -> Self {
        ExprVec(exprs)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn coordinates(&self) -> &[ExprID] {
        &self.0
    }

    /// A vector is nullable when any coordinate is nullable.
    pub(crate) fn nullable(&self, pool: &ExprPool) -> bool {
        self.0.iter().any(|&e| pool.nullable(e))
    }

    /// A vector is final when every coordinate is final. The empty vector is vacuously final
    /// and not nullable, which gives the empty context its non-accepting final start state.
    pub(crate) fn is_final(&self, pool: &ExprPool) -> bool {
        self.0.iter().all(|&e| pool.is_final(e))
    }

    /// The coordinate-wise derivative.
    #[allow(dead_code)]
    pub(crate) fn derive(&self, pool: &mut ExprPool, c: char) -> ExprVec {
        ExprVec(self.0.iter().map(|&e| pool.derive(e, c)).collect())
    }

    /// The vector derivation map: the cross-combination of the coordinate maps, built by folding
    /// the intersect-then-difference combinator over all coordinates.
    pub(crate) fn derive_map(&self, pool: &mut ExprPool) -> PartitionMap<ExprVec> {
        let mut acc = PartitionMap::uniform(ExprVec(Vec::with_capacity(self.len())));
        for &expr in &self.0 {
            let map = pool.derive_map(expr);
            acc = acc.combined(&map, true, |vector, &succ| {
                let mut vector = vector.clone();
                vector.0.push(succ);
                vector
            });
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_nullable_and_final() {
        let mut pool = ExprPool::new();
        let a = pool.symbol('a');
        let star = pool.star(a);
        let v = ExprVec::new(vec![a, star]);
        assert!(v.nullable(&pool));
        assert!(!v.is_final(&pool));
        let dead = ExprVec::new(vec![ExprPool::EMPTY_SET, ExprPool::EMPTY_SET]);
        assert!(!dead.nullable(&pool));
        assert!(dead.is_final(&pool));
        let empty = ExprVec::new(Vec::new());
        assert!(!empty.nullable(&pool));
        assert!(empty.is_final(&pool));
    }

    #[test]
    fn test_vector_equality_is_positional() {
        let mut pool = ExprPool::new();
        let a = pool.symbol('a');
        let b = pool.symbol('b');
        assert_ne!(ExprVec::new(vec![a, b]), ExprVec::new(vec![b, a]));
        assert_eq!(ExprVec::new(vec![a, b]), ExprVec::new(vec![a, b]));
    }

    #[test]
    fn test_vector_derive_map_agrees_with_coordinatewise_derive() {
        let mut pool = ExprPool::new();
        let a = pool.symbol('a');
        let b = pool.symbol('b');
        let ab = pool.concat(a, b);
        let star_b = pool.star(b);
        let v = ExprVec::new(vec![ab, star_b, ExprPool::ANY]);
        let map = v.derive_map(&mut pool);
        for c in "abx0".chars() {
            let expected = v.derive(&mut pool, c);
            assert_eq!(*map.lookup(c), expected, "vector map disagrees at {:?}", c);
        }
    }

    #[test]
    fn test_empty_vector_derive_map_is_self() {
        let mut pool = ExprPool::new();
        let v = ExprVec::new(Vec::new());
        let map = v.derive_map(&mut pool);
        assert!(map.classes().is_empty());
        assert_eq!(*map.default_successor(), v);
    }
}
