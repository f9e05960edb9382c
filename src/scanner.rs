//! The streaming scanner. A scanner owns the live DFA state, a scan buffer of the characters
//! consumed since the last advance point and a stack of match candidates; it consumes one
//! character at a time and reports the longest, earliest-declared match at each scan position.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{error, trace};

use crate::internal::StateID;
use crate::{Match, ScannerCtxt};

/// The outcome of resolving the match buffer. An ignore pattern produces a match that is
/// consumed but not reported.
#[derive(Debug)]
enum Resolved {
    Emit(Match),
    Ignore(Match),
}

/// A scanner instance.
///
/// Scanners are cheap to create from a shared [`ScannerCtxt`] and own their mutable buffers
/// exclusively; one scanner must not be used from multiple threads, but any number of scanners
/// over the same context may run concurrently.
///
/// Matches are reported incrementally from [`Scanner::update`]. Once the input is exhausted the
/// caller must invoke [`Scanner::complete`] to flush matches still pending in the buffer.
#[derive(Debug)]
pub struct Scanner {
    ctxt: Arc<ScannerCtxt>,
    /// The live DFA state; always equal to running the DFA from start over `scan_buffer`.
    current_state: StateID,
    /// The characters consumed since the last advance point.
    scan_buffer: VecDeque<char>,
    /// Match candidates of the current pass, longest on top.
    match_buffer: Vec<(StateID, String)>,
    /// The absolute character offset of the first buffered character.
    pos: usize,
}

impl Scanner {
    /// Create a scanner over a shared context.
    pub fn new(ctxt: Arc<ScannerCtxt>) -> Self {
        let start = ctxt.dfa().start();
        Self {
            ctxt,
            current_state: start,
            scan_buffer: VecDeque::new(),
            match_buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Feed a single character and collect the matches it completes.
    pub fn update_char(&mut self, c: char) -> Vec<Match> {
        let mut out = Vec::new();
        self.scan_char(c, &mut out);
        out
    }

    /// Feed a string; equivalent to feeding every character in order.
    pub fn update(&mut self, input: &str) -> Vec<Match> {
        let mut out = Vec::new();
        for c in input.chars() {
            self.scan_char(c, &mut out);
        }
        out
    }

    /// Signal the end of the input and drain all residual matches.
    ///
    /// Idempotent: a second call without further input reports nothing.
    pub fn complete(&mut self) -> Vec<Match> {
        let mut out = Vec::new();
        // The pass that ran so far is replayed by the rescan loop, so the live state and the
        // candidates of the unfinished pass are dropped, not lost.
        self.current_state = self.ctxt.dfa().start();
        self.match_buffer.clear();
        self.rescan(true, &mut out);
        out
    }

    /// Restore the scanner to its initial state.
    pub fn reset(&mut self) {
        self.current_state = self.ctxt.dfa().start();
        self.scan_buffer.clear();
        self.match_buffer.clear();
        self.pos = 0;
    }

    /// The absolute character offset of the next unconsumed position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume one character of live input.
    fn scan_char(&mut self, c: char, out: &mut Vec<Match>) {
        self.scan_buffer.push_back(c);
        self.current_state = self.ctxt.dfa().step(self.current_state, c);
        let state = self.ctxt.dfa().state(self.current_state);
        if state.accepting {
            self.match_buffer
                .push((self.current_state, self.scan_buffer.iter().collect()));
        }
        if !state.is_final {
            return;
        }
        // The DFA cannot change its acceptance anymore: resolve what is buffered, or skip one
        // character if nothing usable is buffered, then rescan the remaining tail.
        if !self.match_buffer.is_empty() {
            if let Some(resolved) = self.resolve_match() {
                self.commit(resolved, out);
                self.rescan(false, out);
                return;
            }
        }
        self.advance(1);
        self.rescan(false, out);
    }

    /// Re-feed the scan buffer from the start state until it either pauses on a live state
    /// (awaiting more input) or, with `complete` set, until the buffer is drained.
    fn rescan(&mut self, complete: bool, out: &mut Vec<Match>) {
        'pass: loop {
            let mut consumed = 0;
            while consumed < self.scan_buffer.len() {
                let c = self.scan_buffer[consumed];
                self.current_state = self.ctxt.dfa().step(self.current_state, c);
                consumed += 1;
                let state = self.ctxt.dfa().state(self.current_state);
                if state.accepting {
                    self.match_buffer.push((
                        self.current_state,
                        self.scan_buffer.iter().take(consumed).collect(),
                    ));
                }
                if state.is_final {
                    if !self.match_buffer.is_empty() {
                        if let Some(resolved) = self.resolve_match() {
                            self.commit(resolved, out);
                            continue 'pass;
                        }
                    }
                    self.advance(1);
                    continue 'pass;
                }
            }
            // Buffer exhausted with the DFA still live.
            if !complete || self.scan_buffer.is_empty() {
                return;
            }
            if !self.match_buffer.is_empty() {
                if let Some(resolved) = self.resolve_match() {
                    self.commit(resolved, out);
                    continue;
                }
            }
            self.advance(1);
        }
    }

    /// Resolve the match buffer from the longest candidate downward: the first candidate whose
    /// state has a non-empty pattern list wins, and within it the earliest-declared pattern.
    fn resolve_match(&mut self) -> Option<Resolved> {
        while let Some((state, text)) = self.match_buffer.last() {
            match self.ctxt.patterns_at(*state) {
                Some(patterns) if !patterns.is_empty() => {
                    let pattern = self.ctxt.pattern(patterns[0]);
                    let matched =
                        Match::new(pattern.id(), pattern.name(), self.pos, text.clone());
                    return Some(if pattern.is_ignore() {
                        Resolved::Ignore(matched)
                    } else {
                        Resolved::Emit(matched)
                    });
                }
                Some(_) => {
                    // No pattern accepts here; fall back to the next shorter candidate.
                    self.match_buffer.pop();
                }
                None => {
                    error!(
                        "accepting state {} missing from the pattern index; dropping match",
                        state
                    );
                    return None;
                }
            }
        }
        None
    }

    /// Emit (or swallow) a resolved match and advance past its text.
    fn commit(&mut self, resolved: Resolved, out: &mut Vec<Match>) {
        let (matched, suppress) = match resolved {
            Resolved::Emit(m) => (m, false),
            Resolved::Ignore(m) => (m, true),
        };
        let len = matched.len();
        if suppress {
            trace!("suppressing ignore match {}", matched);
        } else {
            out.push(matched);
        }
        self.advance(len);
    }

    /// Trim `count` characters from the left of the scan buffer, commit them to `pos` and
    /// restart the DFA.
    fn advance(&mut self, count: usize) {
        debug_assert!(count >= 1, "the scanner must always advance");
        self.scan_buffer.drain(..count.min(self.scan_buffer.len()));
        self.match_buffer.clear();
        self.current_state = self.ctxt.dfa().start();
        self.pos += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pattern, PatternId};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ctxt_of(patterns: Vec<Pattern>) -> Arc<ScannerCtxt> {
        Arc::new(ScannerCtxt::new(patterns))
    }

    fn scan_all(scanner: &mut Scanner, input: &str) -> Vec<Match> {
        let mut matches = scanner.update(input);
        matches.extend(scanner.complete());
        matches
    }

    fn expect(matches: &[Match], expected: &[(PatternId, &str, usize, &str)]) {
        let actual: Vec<(PatternId, &str, usize, &str)> = matches
            .iter()
            .map(|m| (m.id(), m.name(), m.pos(), m.text()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_single_pattern_stream() {
        init();
        let ctxt = ctxt_of(vec![Pattern::new(PatternId::new(4, 1), "digit", "1[^13]")]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "12 ");
        expect(&matches, &[(PatternId::new(4, 1), "digit", 0, "12")]);
    }

    #[test]
    fn test_match_is_reported_as_soon_as_it_is_sealed() {
        init();
        let ctxt = ctxt_of(vec![Pattern::new(PatternId::new(1, 0), "ab", "ab")]);
        let mut scanner = Scanner::new(ctxt);
        assert!(scanner.update("a").is_empty());
        assert!(scanner.update("b").is_empty());
        // 'x' kills every pattern, which seals the buffered "ab".
        let matches = scanner.update("x");
        expect(&matches, &[(PatternId::new(1, 0), "ab", 0, "ab")]);
        assert!(scanner.complete().is_empty());
    }

    #[test]
    fn test_longest_match_wins() {
        init();
        let ctxt = ctxt_of(vec![
            Pattern::new(PatternId::new(1, 0), "short", "ab"),
            Pattern::new(PatternId::new(2, 0), "long", "abab"),
        ]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "abab");
        expect(&matches, &[(PatternId::new(2, 0), "long", 0, "abab")]);
    }

    #[test]
    fn test_shorter_match_reemerges_after_backtracking() {
        init();
        let ctxt = ctxt_of(vec![
            Pattern::new(PatternId::new(1, 0), "short", "ab"),
            Pattern::new(PatternId::new(2, 0), "long", "abab"),
        ]);
        let mut scanner = Scanner::new(ctxt);
        // "abac": "abab" dies at the 'c'; the buffered "ab" wins, then "ac" yields nothing.
        let matches = scan_all(&mut scanner, "abac");
        expect(&matches, &[(PatternId::new(1, 0), "short", 0, "ab")]);
    }

    #[test]
    fn test_earliest_pattern_wins_on_equal_length() {
        init();
        let ctxt = ctxt_of(vec![
            Pattern::new(PatternId::new(1, 0), "first", "a[ab]"),
            Pattern::new(PatternId::new(2, 0), "second", "[ab]b"),
        ]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "ab");
        expect(&matches, &[(PatternId::new(1, 0), "first", 0, "ab")]);
    }

    #[test]
    fn test_ignore_pattern_consumes_silently() {
        init();
        // The ignore pattern masks numbers that are too long for the digit rule.
        let ctxt = ctxt_of(vec![
            Pattern::new(PatternId::new(1, 0), "pair", "[[:digit:]]{2}"),
            Pattern::new(PatternId::new(2, 0), "triple", "[[:digit:]]{3}").with_ignore(),
        ]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "123 45");
        expect(&matches, &[(PatternId::new(1, 0), "pair", 4, "45")]);
    }

    #[test]
    fn test_consecutive_matches_and_positions() {
        init();
        let ctxt = ctxt_of(vec![Pattern::new(PatternId::new(1, 0), "word", "[a-z]+")]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "foo bar  baz");
        expect(
            &matches,
            &[
                (PatternId::new(1, 0), "word", 0, "foo"),
                (PatternId::new(1, 0), "word", 4, "bar"),
                (PatternId::new(1, 0), "word", 9, "baz"),
            ],
        );
    }

    #[test]
    fn test_streaming_determinism() {
        init();
        let patterns = vec![
            Pattern::new(PatternId::new(1, 0), "word", "[a-z]+"),
            Pattern::new(PatternId::new(2, 0), "number", "[0-9]+"),
        ];
        let input = "abc 123 look4 42words";
        let ctxt = ctxt_of(patterns);

        let mut whole = Scanner::new(ctxt.clone());
        let expected = scan_all(&mut whole, input);

        // Any chunking of the input must produce the same match sequence.
        for split in 0..input.len() {
            if !input.is_char_boundary(split) {
                continue;
            }
            let mut chunked = Scanner::new(ctxt.clone());
            let mut matches = chunked.update(&input[..split]);
            matches.extend(chunked.update(&input[split..]));
            matches.extend(chunked.complete());
            assert_eq!(matches, expected, "split at byte {}", split);
        }

        // Character-at-a-time must agree as well.
        let mut stepwise = Scanner::new(ctxt);
        let mut matches = Vec::new();
        for c in input.chars() {
            matches.extend(stepwise.update_char(c));
        }
        matches.extend(stepwise.complete());
        assert_eq!(matches, expected);
    }

    #[test]
    fn test_scanner_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Scanner>();
    }

    #[test]
    fn test_empty_context_reports_nothing() {
        init();
        let ctxt = ctxt_of(Vec::new());
        let mut scanner = Scanner::new(ctxt);
        assert!(scan_all(&mut scanner, "no pattern can match 123").is_empty());
    }

    #[test]
    fn test_complete_is_idempotent() {
        init();
        let ctxt = ctxt_of(vec![Pattern::new(PatternId::new(1, 0), "word", "[a-z]+")]);
        let mut scanner = Scanner::new(ctxt);
        assert!(scanner.update("abc").is_empty());
        let first = scanner.complete();
        assert_eq!(first.len(), 1);
        assert!(scanner.complete().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        init();
        let ctxt = ctxt_of(vec![Pattern::new(PatternId::new(1, 0), "word", "[a-z]+")]);
        let mut scanner = Scanner::new(ctxt);
        scanner.update("abc def");
        scanner.reset();
        assert_eq!(scanner.position(), 0);
        let matches = scan_all(&mut scanner, "xyz");
        expect(&matches, &[(PatternId::new(1, 0), "word", 0, "xyz")]);
    }

    #[test]
    fn test_position_accounting_across_skips() {
        init();
        let ctxt = ctxt_of(vec![Pattern::new(PatternId::new(1, 0), "num", "[0-9]+")]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "--7--42");
        expect(
            &matches,
            &[
                (PatternId::new(1, 0), "num", 2, "7"),
                (PatternId::new(1, 0), "num", 5, "42"),
            ],
        );
    }

    #[test]
    fn test_overlapping_candidates_resolve_to_longest_then_rescan() {
        init();
        // After "aaa" is consumed for the long pattern, the tail must be rescanned from
        // scratch so that a fresh "a" still matches.
        let ctxt = ctxt_of(vec![
            Pattern::new(PatternId::new(1, 0), "one", "a"),
            Pattern::new(PatternId::new(2, 0), "three", "aaa"),
        ]);
        let mut scanner = Scanner::new(ctxt);
        let matches = scan_all(&mut scanner, "aaaa");
        expect(
            &matches,
            &[
                (PatternId::new(2, 0), "three", 0, "aaa"),
                (PatternId::new(1, 0), "one", 3, "a"),
            ],
        );
    }
}
