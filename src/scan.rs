// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use log::debug;

use crate::dfa::core::{Match, DFA};

/// Iterator over the non-overlapping matches of an automaton in a token
/// sequence, from left to right.
///
/// Every position not covered by a previous match is tried in turn: a
/// match moves the cursor right after it, a failure moves it by one token.
/// Each item is the offset of the match in the sequence and the match.
///
/// # Examples
///
/// ```
/// use fsa::dfa::core::DFA;
/// use fsa::scan::Scanner;
///
/// let dfa = DFA::build(
///     "ab",
///     ["S0", "S1", "S2"],
///     ["S2"],
///     [("S0", "a", "S1"), ("S1", "b", "S2")],
/// )
/// .unwrap();
/// let tokens = ["x", "a", "b", "a", "a", "b"];
/// let offsets: Vec<usize> = Scanner::new(&dfa, &tokens).map(|(at, _)| at).collect();
/// assert_eq!(offsets, vec![1, 4]);
/// ```
#[derive(Debug)]
pub struct Scanner<'a, T> {
    dfa: &'a DFA<T>,
    tokens: &'a [T],
    cursor: usize,
}

impl<'a, T> Scanner<'a, T> {
    /// Creates a scanner starting at the first token.
    pub fn new(dfa: &'a DFA<T>, tokens: &'a [T]) -> Scanner<'a, T> {
        Scanner { dfa, tokens, cursor: 0 }
    }
}

impl<'a, T: Eq + Hash + Clone + fmt::Debug> Iterator for Scanner<'a, T> {
    type Item = (usize, Match<T>);

    fn next(&mut self) -> Option<(usize, Match<T>)> {
        while self.cursor < self.tokens.len() {
            let at = self.cursor;
            match self.dfa.consume(&self.tokens[at..]) {
                Some(found) => {
                    self.cursor += found.len();
                    debug!("{}: match of {} tokens at {}", self.dfa.name(), found.len(), at);
                    return Some((at, found));
                }
                None => self.cursor += 1,
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.tokens.len() - self.cursor))
    }
}

impl<'a, T: Eq + Hash + Clone + fmt::Debug> FusedIterator for Scanner<'a, T> {}

impl<T: Eq + Hash + Clone + fmt::Debug> DFA<T> {
    /// Lazily scans `tokens`, see `Scanner`.
    pub fn scan_iter<'a>(&'a self, tokens: &'a [T]) -> Scanner<'a, T> {
        Scanner::new(self, tokens)
    }
}

/// Collects every match of `dfa` in `tokens` with its offset, in increasing
/// offset order. Matches never overlap.
pub fn scan<T: Eq + Hash + Clone + fmt::Debug>(dfa: &DFA<T>, tokens: &[T]) -> Vec<(usize, Match<T>)> {
    Scanner::new(dfa, tokens).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> DFA<char> {
        DFA::build(
            "test",
            ["S0", "S1", "S2"],
            ["S2"],
            [("S0", 'a', "S1"), ("S1", 'b', "S1"), ("S1", 'c', "S2")],
        )
        .unwrap()
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn spans(found: &[(usize, Match<char>)]) -> Vec<(usize, usize)> {
        found.iter().map(|(at, m)| (*at, m.len())).collect()
    }

    #[test]
    fn test_scan_abbcd() {
        let found = scan(&abc(), &chars("abbcd"));
        assert_eq!(spans(&found), vec![(0, 4)]);
        assert_eq!(found[0].1.symbols(), &['a', 'b', 'b', 'c']);
    }

    #[test]
    fn test_scan_skips_failed_positions() {
        // the attempt at 0 dies at the second 'a', the one at 1 succeeds
        let found = scan(&abc(), &chars("aabcxabcabbbc"));
        assert_eq!(spans(&found), vec![(1, 3), (5, 3), (8, 5)]);
    }

    #[test]
    fn test_scan_no_match() {
        assert!(scan(&abc(), &chars("xyzab")).is_empty());
        assert!(scan(&abc(), &[]).is_empty());
    }

    #[test]
    fn test_scan_adjacent_matches() {
        let found = scan(&abc(), &chars("acacac"));
        assert_eq!(spans(&found), vec![(0, 2), (2, 2), (4, 2)]);
    }

    #[test]
    fn test_scan_words() {
        let dfa = DFA::build(
            "np",
            ["S0", "S1", "S2"],
            ["S2"],
            [("S0", "the", "S1"), ("S1", "old", "S1"), ("S1", "man", "S2"), ("S1", "sea", "S2")],
        )
        .unwrap();
        let tokens: Vec<&str> = "the old man and the sea and the the old man".split(' ').collect();
        let found = dfa.scan_iter(&tokens).map(|(at, m)| (at, m.symbols().join(" "))).collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![
                (0, "the old man".to_owned()),
                (4, "the sea".to_owned()),
                (8, "the old man".to_owned()),
            ]
        );
    }

    #[test]
    fn test_scan_iter_is_fused() {
        let dfa = abc();
        let tokens = chars("abc");
        let mut scanner = dfa.scan_iter(&tokens);
        assert_eq!(scanner.next().map(|(at, m)| (at, m.len())), Some((0, 3)));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
