//! Character sets represented as sorted lists of inclusive char ranges.
//! A contiguous-range representation keeps derivation maps small even for wide classes; all set
//! operations are merges of sorted interval lists.

use serde::{Deserialize, Serialize};

/// The character immediately after `c`, skipping the surrogate gap.
fn next_char(c: char) -> Option<char> {
    let mut u = c as u32 + 1;
    if u == 0xD800 {
        u = 0xE000;
    }
    char::from_u32(u)
}

/// A set of characters, kept as sorted, disjoint, non-adjacent inclusive ranges.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub(crate) struct CharSet {
    ranges: Vec<(char, char)>,
}

impl CharSet {
    /// Create an empty set.
    pub(crate) fn empty() -> Self {
        CharSet { ranges: Vec::new() }
    }

    /// Create a set containing a single character.
    pub(crate) fn single(c: char) -> Self {
        CharSet {
            ranges: vec![(c, c)],
        }
    }

    /// Create a set containing the inclusive range `lo..=hi`.
    /// The caller must ensure `lo <= hi`.
    pub(crate) fn range(lo: char, hi: char) -> Self {
        debug_assert!(lo <= hi);
        CharSet {
            ranges: vec![(lo, hi)],
        }
    }

    /// Build a set from arbitrary inclusive ranges.
    pub(crate) fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (char, char)>,
    {
        ranges
            .into_iter()
            .fold(CharSet::empty(), |acc, (lo, hi)| {
                acc.union(&CharSet::range(lo, hi))
            })
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Check membership by binary search on the range starts.
    pub(crate) fn contains(&self, c: char) -> bool {
        match self.ranges.binary_search_by(|&(lo, _)| lo.cmp(&c)) {
            Ok(_) => true,
            Err(0) => false,
            Err(i) => self.ranges[i - 1].1 >= c,
        }
    }

    /// Iterate over all characters in the set in ascending order.
    pub(crate) fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.ranges.iter().flat_map(|&(lo, hi)| {
            std::iter::successors(Some(lo), move |&c| {
                if c < hi {
                    next_char(c)
                } else {
                    None
                }
            })
        })
    }

    /// Set union as a merge of the two sorted range lists.
    pub(crate) fn union(&self, other: &CharSet) -> CharSet {
        let mut merged: Vec<(char, char)> =
            Vec::with_capacity(self.ranges.len() + other.ranges.len());
        let mut a = self.ranges.iter().peekable();
        let mut b = other.ranges.iter().peekable();
        loop {
            let next = match (a.peek(), b.peek()) {
                (Some(&&ra), Some(&&rb)) => {
                    if ra.0 <= rb.0 {
                        a.next();
                        ra
                    } else {
                        b.next();
                        rb
                    }
                }
                (Some(&&ra), None) => {
                    a.next();
                    ra
                }
                (None, Some(&&rb)) => {
                    b.next();
                    rb
                }
                (None, None) => break,
            };
            match merged.last_mut() {
                // Overlapping or adjacent ranges collapse into one.
                Some(last) if next_char(last.1).map_or(true, |c| c >= next.0) => {
                    last.1 = last.1.max(next.1);
                }
                _ => merged.push(next),
            }
        }
        CharSet { ranges: merged }
    }

    /// Set intersection by advancing two cursors over the sorted range lists.
    pub(crate) fn intersection(&self, other: &CharSet) -> CharSet {
        let mut out = Vec::new();
        let mut i = 0;
        let mut j = 0;
        while i < self.ranges.len() && j < other.ranges.len() {
            let (alo, ahi) = self.ranges[i];
            let (blo, bhi) = other.ranges[j];
            let lo = alo.max(blo);
            let hi = ahi.min(bhi);
            if lo <= hi {
                out.push((lo, hi));
            }
            if ahi <= bhi {
                i += 1;
            } else {
                j += 1;
            }
        }
        CharSet { ranges: out }
    }

    /// Set difference `self \ other`.
    pub(crate) fn difference(&self, other: &CharSet) -> CharSet {
        let mut out = Vec::new();
        let mut j = 0;
        for &(lo, hi) in &self.ranges {
            let mut lo = lo;
            while j < other.ranges.len() && other.ranges[j].1 < lo {
                j += 1;
            }
            let mut k = j;
            let mut dead = false;
            while k < other.ranges.len() && other.ranges[k].0 <= hi {
                let (blo, bhi) = other.ranges[k];
                if blo > lo {
                    // The prefix before the overlapping range survives.
                    let prev = char::from_u32(blo as u32 - 1)
                        .or_else(|| char::from_u32(0xD7FF))
                        .unwrap();
                    out.push((lo, prev.min(hi)));
                }
                if bhi >= hi {
                    dead = true;
                    break;
                }
                match next_char(bhi) {
                    Some(c) => lo = c.max(lo),
                    None => {
                        dead = true;
                        break;
                    }
                }
                k += 1;
            }
            if !dead && lo <= hi {
                out.push((lo, hi));
            }
        }
        CharSet { ranges: out }
    }
}

impl std::fmt::Display for CharSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for &(lo, hi) in &self.ranges {
            if lo == hi {
                write!(f, "{}", lo.escape_default())?;
            } else {
                write!(f, "{}-{}", lo.escape_default(), hi.escape_default())?;
            }
        }
        write!(f, "]")
    }
}
