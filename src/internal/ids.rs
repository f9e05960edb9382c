//! Typed indices for the engine's dense tables. Expressions, automaton states and patterns all
//! live in flat vectors and refer to each other by position; a newtype per index space keeps
//! the different kinds of index from being mixed up and lets those vectors be indexed by the
//! typed value directly.

use serde::{Deserialize, Serialize};

macro_rules! index_type {
    ($(#[$docs:meta])+ $name:ident($tp:ty)) => {
        $(#[$docs])+
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default,
            Serialize,
            Deserialize,
        )]
        pub(crate) struct $name($tp);

        impl $name {
            /// Wrap a raw index.
            #[inline]
            pub(crate) const fn new(value: $tp) -> Self {
                $name(value)
            }

            /// The position this id stands for, as a plain `usize`.
            #[allow(dead_code)]
            #[inline]
            pub(crate) fn as_usize(&self) -> usize {
                self.0 as usize
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.0 as usize]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_type!(
    /// A state of the compiled automaton. State 0 is always the start state; the worklist
    /// assigns ids in creation order, so they are dense.
    StateID(u32)
);

index_type!(
    /// A handle to an interned expression in the pool. The smart constructors normalize before
    /// interning, so two expressions are algebraically equal exactly when their handles are
    /// equal, and hashing a handle hashes the expression.
    ExprID(u32)
);

index_type!(
    /// The position of a pattern in the context's pattern vector, which is also its coordinate
    /// in the compiled expression vector. Declaration order doubles as match priority: of two
    /// equally long matches, the lower index wins.
    PatternID(usize)
);
