//! Partitioned derivatives. A `PartitionMap` classifies the whole alphabet into finitely many
//! character classes, each tagged with a successor, plus a default successor for every character
//! not covered by a class. The map is generic over the successor type so the same combination
//! algorithm serves single expressions and expression vectors.

use super::char_set::CharSet;

/// A finite partition of the alphabet. `classes` holds pairwise-disjoint character sets with
/// their successors; `default` is the successor of every other character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartitionMap<T> {
    classes: Vec<(T, CharSet)>,
    default: T,
}

impl<T: Clone + PartialEq> PartitionMap<T> {
    /// A map that sends every character to `default`.
    pub(crate) fn uniform(default: T) -> Self {
        PartitionMap {
            classes: Vec::new(),
            default,
        }
    }

    /// Create a map from raw classes, merging classes with equal successors and dropping classes
    /// that are empty or indistinguishable from the default.
    pub(crate) fn new(classes: Vec<(T, CharSet)>, default: T) -> Self {
        let mut normalized: Vec<(T, CharSet)> = Vec::with_capacity(classes.len());
        for (succ, set) in classes {
            if set.is_empty() || succ == default {
                continue;
            }
            if let Some(existing) = normalized.iter_mut().find(|(s, _)| *s == succ) {
                existing.1 = existing.1.union(&set);
            } else {
                normalized.push((succ, set));
            }
        }
        PartitionMap {
            classes: normalized,
            default,
        }
    }

    pub(crate) fn classes(&self) -> &[(T, CharSet)] {
        &self.classes
    }

    pub(crate) fn default_successor(&self) -> &T {
        &self.default
    }

    /// The successor for character `c`.
    pub(crate) fn lookup(&self, c: char) -> &T {
        self.classes
            .iter()
            .find(|(_, set)| set.contains(c))
            .map(|(succ, _)| succ)
            .unwrap_or(&self.default)
    }

    /// Apply `f` to every successor, preserving the partition.
    pub(crate) fn map<U, F>(self, mut f: F) -> PartitionMap<U>
    where
        U: Clone + PartialEq,
        F: FnMut(&T) -> U,
    {
        let default = f(&self.default);
        let classes = self
            .classes
            .iter()
            .map(|(succ, set)| (f(succ), set.clone()))
            .collect();
        PartitionMap::new(classes, default)
    }

    /// Combine two maps by the pairwise intersect-then-difference algorithm:
    ///
    /// 1. For each class pair with a non-empty intersection, emit the merged successor on the
    ///    intersection and accumulate the covered set.
    /// 2. Characters of a left class not covered in step 1 meet the right default.
    /// 3. Characters of a right class not covered in step 1 meet the left default. This branch is
    ///    dropped when `rhs_alone` is false; those characters then fall through to the default.
    /// 4. The default is the merge of both defaults.
    pub(crate) fn combined<B, C, F>(
        &self,
        other: &PartitionMap<B>,
        rhs_alone: bool,
        mut merge: F,
    ) -> PartitionMap<C>
    where
        B: Clone + PartialEq,
        C: Clone + PartialEq,
        F: FnMut(&T, &B) -> C,
    {
        let mut classes: Vec<(C, CharSet)> = Vec::new();
        let mut common = CharSet::empty();
        for (a, set_a) in &self.classes {
            for (b, set_b) in &other.classes {
                let isect = set_a.intersection(set_b);
                if !isect.is_empty() {
                    common = common.union(&isect);
                    classes.push((merge(a, b), isect));
                }
            }
        }
        for (a, set_a) in &self.classes {
            let rest = set_a.difference(&common);
            if !rest.is_empty() {
                classes.push((merge(a, &other.default), rest));
            }
        }
        if rhs_alone {
            for (b, set_b) in &other.classes {
                let rest = set_b.difference(&common);
                if !rest.is_empty() {
                    classes.push((merge(&self.default, b), rest));
                }
            }
        }
        let default = merge(&self.default, &other.default);
        PartitionMap::new(classes, default)
    }
}
