// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::error;
use std::fmt; // Formatter, format!, Display, Debug, write!
use std::hash::Hash;
use std::result;

use itertools::Itertools; // format, sorted
use log::{debug, log_enabled, trace, Level};

/// Name of the state every run starts from, unless the builder designates
/// another one with `add_start`.
pub const DEFAULT_START: &str = "S0";

/// Maximum number of upcoming symbols handed to a `RunObserver` at each step.
pub const LOOKAHEAD: usize = 5;

/// The `DFAError` type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DFAError {
    /// A final state or a transition refers to a state that was never declared.
    UnknownState(String),
    /// The transition from `state` with `symbol` is defined twice.
    DuplicatedTransition {
        /// Source state of the transition.
        state: String,
        /// Debug rendering of the symbol.
        symbol: String,
    },
    /// The designated starting state is not among the declared states.
    MissingStartingState(String),
}

impl fmt::Display for DFAError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DFAError::UnknownState(ref name) => write!(f, "Unknown state {}.", name),
            DFAError::DuplicatedTransition { ref state, ref symbol } => {
                write!(f, "Duplicated transition ({},{}).", state, symbol)
            }
            DFAError::MissingStartingState(ref name) => {
                write!(f, "Missing starting state {}.", name)
            }
        }
    }
}

impl error::Error for DFAError {}

/// Alias for result::Result<T,DFAError>.
pub type Result<T> = result::Result<T, DFAError>;

/// Dense index of a state inside the automaton that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    /// Position of the state in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the automaton: a name, the outgoing transitions and a finality flag.
#[derive(Debug, Clone)]
pub struct State<T> {
    name: String,
    transitions: HashMap<T, StateId>,
    is_final: bool,
}

impl<T: Eq + Hash> State<T> {
    fn new(name: &str) -> State<T> {
        State { name: name.to_owned(), transitions: HashMap::new(), is_final: false }
    }

    /// The name the state was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether reaching this state completes a match.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// The state reached from this one with `symbol`, if any.
    pub fn target(&self, symbol: &T) -> Option<StateId> {
        self.transitions.get(symbol).copied()
    }

    /// The outgoing transitions, in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = (&T, StateId)> + '_ {
        self.transitions.iter().map(|(symbol, target)| (symbol, *target))
    }
}

impl<T> fmt::Display for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let finality = if self.is_final { " f" } else { "" };
        write!(f, "<State {}{}>", self.name, finality)
    }
}

/// The symbols consumed by a run up to the last final state it reached.
///
/// A `Match` owns its symbols: it stays valid whatever happens to the input
/// or to the automaton afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match<T> {
    consumed: Vec<T>,
}

impl<T> Match<T> {
    /// The matched symbols, in input order.
    pub fn symbols(&self) -> &[T] {
        &self.consumed
    }

    /// Number of symbols matched.
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    /// Whether the match is empty. A match produced by `consume` never is.
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    /// Consumes the match and returns its symbols.
    pub fn into_symbols(self) -> Vec<T> {
        self.consumed
    }
}

impl<T: fmt::Display> fmt::Display for Match<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.consumed.iter().format(" "))
    }
}

/// Receives every step of a run started by `DFA::consume_with`.
///
/// `step` is called once before the first symbol is read and once after
/// each consumed symbol, never after the symbol that stopped the run.
pub trait RunObserver<T> {
    /// `state` is the current state, `consumed` the symbols read so far and
    /// `lookahead` at most `LOOKAHEAD` of the symbols still to come.
    fn step(&mut self, state: &State<T>, consumed: &[T], lookahead: &[T]);
}

impl<T, F> RunObserver<T> for F
where
    F: FnMut(&State<T>, &[T], &[T]),
{
    fn step(&mut self, state: &State<T>, consumed: &[T], lookahead: &[T]) {
        self(state, consumed, lookahead)
    }
}

/// Renders one step of a run: the state, the consumed symbols, a dot and
/// the lookahead, e.g. `<State S1> a b . b c d`.
pub fn step_line<T: fmt::Display>(state: &State<T>, consumed: &[T], lookahead: &[T]) -> String {
    format!("{} {} . {}", state, consumed.iter().format(" "), lookahead.iter().format(" "))
}

/// Observer reporting each step of a run as a `trace` record.
///
/// # Examples
///
/// ```
/// use fsa::dfa::core::*;
///
/// let dfa = DFA::build("ab", ["S0", "S1"], ["S1"], [("S0", 'a', "S1")]).unwrap();
/// assert!(dfa.consume_with(&['a', 'b'], &mut TraceLog).is_some());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceLog;

impl<T: fmt::Display> RunObserver<T> for TraceLog {
    fn step(&mut self, state: &State<T>, consumed: &[T], lookahead: &[T]) {
        if log_enabled!(Level::Trace) {
            trace!("{}", step_line(state, consumed, lookahead));
        }
    }
}

// observer of the plain `consume`
struct Quiet;

impl<T> RunObserver<T> for Quiet {
    fn step(&mut self, _: &State<T>, _: &[T], _: &[T]) {}
}

/// The type `DFA` represents a Deterministic Finite Automaton over symbols
/// of type `T`. States live in a single vector and refer to each other by
/// index; names are only resolved while building.
///
/// A built `DFA` is never modified: `consume`, `accept` and the scanner only
/// borrow it, so one automaton can serve any number of runs, from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct DFA<T> {
    name: String,
    states: Vec<State<T>>,
    index: HashMap<String, StateId>,
    start: StateId,
}

/// The `DFABuilder` follows the builder pattern and allows to create a Deterministic
/// Finite Automaton. The builder is moved at each call so it is necessary to bind
/// to a new variable the return value for each function of the builder.
///
/// States must be declared with `add_state` before they are marked final or
/// used by a transition. The starting state defaults to `S0`.
///
/// # Errors
///
/// Return an error if a final state or a transition refers to an undeclared state.
///
/// Return an error if a transition is defined twice.
///
/// Return an error if the starting state is not declared.
///
/// # Examples
///
/// ```
/// use fsa::dfa::core::*;
///
/// // a b* c
/// let dfa = DFABuilder::new("abc")
///     .add_state("S0")
///     .add_state("S1")
///     .add_state("S2")
///     .add_final("S2")
///     .add_transition("S0", 'a', "S1")
///     .add_transition("S1", 'b', "S1")
///     .add_transition("S1", 'c', "S2")
///     .finalize()
///     .unwrap();
/// assert_eq!(dfa.num_states(), 3);
/// ```
///
/// ```
/// use fsa::dfa::core::*;
///
/// let dfa = DFABuilder::new("abc")
///     .add_state("S0")
///     .add_state("S1")
///     .add_transition("S0", 'a', "S1")
///     .add_transition("S0", 'a', "S0")
///     .finalize();
/// match dfa {
///     Err(DFAError::DuplicatedTransition { state, .. }) => assert_eq!(state, "S0"),
///     _ => panic!("DuplicatedTransition expected."),
/// }
/// ```
///
/// ```
/// use fsa::dfa::core::*;
///
/// let dfa = DFABuilder::new("empty")
///     .add_state("S1")
///     .add_transition("S1", 'a', "S1")
///     .finalize();
/// assert_eq!(dfa.unwrap_err(), DFAError::MissingStartingState("S0".to_owned()));
/// ```
#[derive(Debug)]
pub struct DFABuilder<T> {
    name: String,
    states: Vec<State<T>>,
    index: HashMap<String, StateId>,
    start: String,
}

/// DFABuilding is the trait assiociated to the DFABuilder type.
///
/// It is implemented both by `DFABuilder` and by `Result<DFABuilder>`, so the
/// calls chain without unwrapping at each stage. Once an error occurred, every
/// later call transfers it untouched up to `finalize`.
pub trait DFABuilding<T> {
    /// Declare a state. Declaring a name twice has no effect.
    fn add_state(self, name: &str) -> Result<DFABuilder<T>>;

    /// Mark a declared state as final.
    ///
    /// # Errors
    ///
    /// Return a DFAError::UnknownState if the state is not declared.
    fn add_final(self, name: &str) -> Result<DFABuilder<T>>;

    /// Designate the starting state. It is only checked by `finalize`.
    fn add_start(self, name: &str) -> Result<DFABuilder<T>>;

    /// Add the transition `src --symb--> dest`.
    ///
    /// # Errors
    ///
    /// Return a DFAError::UnknownState if `src` or `dest` is not declared.
    ///
    /// Return a DFAError::DuplicatedTransition if a transition with the same
    /// `src` and `symb` has already been inserted, even if the destination
    /// state is the same.
    fn add_transition(self, src: &str, symb: T, dest: &str) -> Result<DFABuilder<T>>;

    /// Finalize the building of the DFA.
    ///
    /// # Errors
    ///
    /// Return a DFAError::MissingStartingState if the starting state is not declared.
    fn finalize(self) -> Result<DFA<T>>;
}

impl<T: Eq + Hash + fmt::Debug> DFABuilder<T> {
    /// Creates a new DFABuilder for an automaton called `name`.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: &str) -> Result<DFABuilder<T>> {
        Ok(DFABuilder {
            name: name.to_owned(),
            states: Vec::new(),
            index: HashMap::new(),
            start: DEFAULT_START.to_owned(),
        })
    }

    fn lookup(&self, name: &str) -> Result<StateId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| DFAError::UnknownState(name.to_owned()))
    }
}

impl<T: Eq + Hash + fmt::Debug> DFABuilding<T> for DFABuilder<T> {
    fn add_state(self, name: &str) -> Result<DFABuilder<T>> {
        Ok(self).add_state(name)
    }

    fn add_final(self, name: &str) -> Result<DFABuilder<T>> {
        Ok(self).add_final(name)
    }

    fn add_start(self, name: &str) -> Result<DFABuilder<T>> {
        Ok(self).add_start(name)
    }

    fn add_transition(self, src: &str, symb: T, dest: &str) -> Result<DFABuilder<T>> {
        Ok(self).add_transition(src, symb, dest)
    }

    fn finalize(self) -> Result<DFA<T>> {
        Ok(self).finalize()
    }
}

/// Implementing DFABuilding trait for Result<DFABuilder> allows
/// to chain the return value of the DFABuilder instead of unwrapping them
/// at each stage of the building process.
impl<T: Eq + Hash + fmt::Debug> DFABuilding<T> for Result<DFABuilder<T>> {
    fn add_state(self, name: &str) -> Result<DFABuilder<T>> {
        self.map(|mut dfa| {
            if !dfa.index.contains_key(name) {
                let id = StateId(dfa.states.len());
                dfa.states.push(State::new(name));
                dfa.index.insert(name.to_owned(), id);
            }
            dfa
        })
    }

    fn add_final(self, name: &str) -> Result<DFABuilder<T>> {
        self.and_then(|mut dfa| {
            let id = dfa.lookup(name)?;
            dfa.states[id.0].is_final = true;
            Ok(dfa)
        })
    }

    fn add_start(self, name: &str) -> Result<DFABuilder<T>> {
        self.map(|mut dfa| {
            dfa.start = name.to_owned();
            dfa
        })
    }

    fn add_transition(self, src: &str, symb: T, dest: &str) -> Result<DFABuilder<T>> {
        self.and_then(|mut dfa| {
            let from = dfa.lookup(src)?;
            let to = dfa.lookup(dest)?;
            match dfa.states[from.0].transitions.entry(symb) {
                Entry::Occupied(e) => {
                    return Err(DFAError::DuplicatedTransition {
                        state: src.to_owned(),
                        symbol: format!("{:?}", e.key()),
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(to);
                }
            }
            Ok(dfa)
        })
    }

    fn finalize(self) -> Result<DFA<T>> {
        self.and_then(|dfa| {
            let start = dfa
                .index
                .get(&dfa.start)
                .copied()
                .ok_or_else(|| DFAError::MissingStartingState(dfa.start.clone()))?;
            debug!(
                "built automaton {:?}: {} states, {} final, {} transitions",
                dfa.name,
                dfa.states.len(),
                dfa.states.iter().filter(|s| s.is_final).count(),
                dfa.states.iter().map(|s| s.transitions.len()).sum::<usize>()
            );
            Ok(DFA { name: dfa.name, states: dfa.states, index: dfa.index, start })
        })
    }
}

impl<T: Eq + Hash + fmt::Debug> DFA<T> {
    /// Builds an automaton from the list of its states, the names of its
    /// final states and its transitions `(src, symbol, dest)`. The starting
    /// state is `S0`.
    ///
    /// # Errors
    ///
    /// Same as `DFABuilder`: unknown states, duplicated transitions and a
    /// missing `S0` are all reported, the first one found wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsa::dfa::core::*;
    ///
    /// let dfa = DFA::build(
    ///     "det",
    ///     ["S0", "S1", "S2"],
    ///     ["S2"],
    ///     [("S0", "the", "S1"), ("S1", "big", "S1"), ("S1", "dog", "S2")],
    /// )
    /// .unwrap();
    /// assert!(dfa.accept(&["the", "big", "big", "dog"]));
    /// assert!(!dfa.accept(&["the", "big"]));
    /// ```
    pub fn build<'a, S, F, R>(name: &str, states: S, final_states: F, transitions: R) -> Result<DFA<T>>
    where
        S: IntoIterator<Item = &'a str>,
        F: IntoIterator<Item = &'a str>,
        R: IntoIterator<Item = (&'a str, T, &'a str)>,
    {
        let builder = states.into_iter().fold(DFABuilder::<T>::new(name), |b, s| b.add_state(s));
        let builder = final_states.into_iter().fold(builder, |b, s| b.add_final(s));
        transitions
            .into_iter()
            .fold(builder, |b, (src, symb, dest)| b.add_transition(src, symb, dest))
            .finalize()
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> DFA<T> {
    /// Consumes as many symbols as possible from the front of `input` and
    /// returns the longest prefix that ended in a final state, or `None` if
    /// no final state was reached.
    ///
    /// The run stops at the first symbol without a transition; the symbols
    /// after it are never looked at and are not an error. Use `consume_with`
    /// and `TraceLog` to see the steps of the run.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsa::dfa::core::*;
    ///
    /// let dfa = DFA::build(
    ///     "abc",
    ///     ["S0", "S1", "S2"],
    ///     ["S2"],
    ///     [("S0", 'a', "S1"), ("S1", 'b', "S1"), ("S1", 'c', "S2")],
    /// )
    /// .unwrap();
    /// let input: Vec<char> = "abbcd".chars().collect();
    /// assert_eq!(dfa.consume(&input).unwrap().symbols(), &['a', 'b', 'b', 'c']);
    /// assert!(dfa.consume(&['a', 'b']).is_none());
    /// ```
    pub fn consume(&self, input: &[T]) -> Option<Match<T>> {
        self.consume_with(input, &mut Quiet)
    }

    /// Same as `consume`, reporting each step of the run to `observer`.
    pub fn consume_with<O>(&self, input: &[T], observer: &mut O) -> Option<Match<T>>
    where
        O: RunObserver<T> + ?Sized,
    {
        let mut current = &self.states[self.start.0];
        let mut consumed = 0;
        // length of the longest prefix ending in a final state
        let mut best = None;
        observer.step(current, &input[..0], lookahead(input, 0));
        for symbol in input {
            match current.target(symbol) {
                Some(next) => {
                    current = &self.states[next.0];
                    consumed += 1;
                    if current.is_final {
                        best = Some(consumed);
                    }
                    observer.step(current, &input[..consumed], lookahead(input, consumed));
                }
                None => break,
            }
        }
        best.map(|len| Match { consumed: input[..len].to_vec() })
    }

    /// Test if the whole `input` is matched, not only a prefix of it.
    ///
    /// The empty input is never accepted, even when the starting state is final.
    pub fn accept(&self, input: &[T]) -> bool {
        self.consume(input).map_or(false, |m| m.len() == input.len())
    }
}

impl<T> DFA<T> {
    /// The name given when building the automaton.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// The state every run starts from.
    pub fn start(&self) -> &State<T> {
        &self.states[self.start.0]
    }

    /// The state declared with `name`, if any.
    pub fn state(&self, name: &str) -> Option<&State<T>> {
        self.index.get(name).map(|id| &self.states[id.0])
    }

    /// The state `id` refers to.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this automaton.
    pub fn resolve(&self, id: StateId) -> &State<T> {
        &self.states[id.0]
    }

    /// The states, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &State<T>> + '_ {
        self.states.iter()
    }
}

fn lookahead<T>(input: &[T], at: usize) -> &[T] {
    &input[at..input.len().min(at + LOOKAHEAD)]
}

/// Lists the states sorted by name, each followed by its transitions sorted
/// by symbol.
impl<T: fmt::Display> fmt::Display for DFA<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "<FSA \"{}\">", self.name)?;
        for state in self.states.iter().sorted_by(|a, b| a.name.cmp(&b.name)) {
            writeln!(f, "   {}", state)?;
            let edges = state
                .transitions
                .iter()
                .map(|(symbol, target)| (symbol.to_string(), &self.states[target.0].name))
                .sorted();
            for (symbol, target) in edges {
                // U+27f6 = 'LONG RIGHTWARDS ARROW'
                writeln!(f, "      {} \u{27f6} {}", symbol, target)?;
            }
        }
        Ok(())
    }
}
