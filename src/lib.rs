// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

#![deny(warnings, missing_docs)]

//! Deterministic finite automata over sequences of tokens.
//!
//! An automaton is built once from an explicit table of states and
//! transitions, then used to find the longest prefix of a sequence that
//! ends in a final state (`dfa::core::DFA::consume`) or, through the
//! scanner, every non-overlapping match in a whole sequence.

/// dfa api
pub mod dfa;
/// scanner api
pub mod scan;
