// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt; // Formatter, format!, Display, Debug, write!
use std::fs::File; // File, open
use std::io; // Error
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::result;
use std::str::SplitWhitespace;

use itertools::Itertools; // next_tuple
use log::debug;

use crate::dfa::core::{DFABuilder, DFABuilding, DFAError, DFA};

/// Type `DFAReaderError` describes the list of errors that can occur during
/// the parsing of a DFA file.
#[derive(Debug)]
pub enum DFAReaderError {
    /// Error `MissingStates` means the first line of the file is not the
    /// `states:` line.
    MissingStates,
    /// Error `MissingFinalStates` means the `finals:` line does not follow the
    /// `states:` line.
    MissingFinalStates,
    /// Error `IncompleteTransition` means the transition on the specified line does not contain
    /// one of these elements: source state, symbol, destination state.
    IncompleteTransition(usize),
    /// Error `IllformedLine` means the line contains too much elements.
    IllformedLine(usize),
    /// Error `DFA` encapsules the error specific to the DFA building process (unknown
    /// states,...). The line is 0 when the error is only found once the whole file is read.
    DFA(DFAError, usize),
    /// Error `Io` is relative to the input errors (the file does not exist, the file can not be
    /// read,...).
    Io(io::Error),
}

impl fmt::Display for DFAReaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DFAReaderError::Io(ref err) => write!(f, "IO error: {}", err),
            DFAReaderError::MissingStates => write!(f, "The file does not start with the list of states."),
            DFAReaderError::MissingFinalStates => write!(f, "The file does not specify the list of final states."),
            DFAReaderError::IncompleteTransition(line) => {
                write!(f, "Line {}: missing the src state, the symbol or the dest state.", line)
            }
            DFAReaderError::IllformedLine(line) => write!(f, "Line {}: too much elements.", line),
            DFAReaderError::DFA(ref err, line) => write!(f, "Line {}: DFAError {}", line, err),
        }
    }
}

impl error::Error for DFAReaderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            DFAReaderError::Io(ref err) => Some(err),
            DFAReaderError::DFA(ref err, _) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DFAReaderError {
    fn from(err: io::Error) -> DFAReaderError {
        DFAReaderError::Io(err)
    }
}

/// Alias for result::Result<T,DFAReaderError>.
pub type Result<T> = result::Result<T, DFAReaderError>;

type Lines<'a> = dyn Iterator<Item = (usize, io::Result<String>)> + 'a;

/// Struct `DFAReader` is an empty structure that builds a `DFA` over words
/// from a file or from a `&str`.
///
/// The expected layout is:
///
/// ```text
/// # comments run to the end of the line
/// states: S0 S1 S2
/// finals: S2
/// S0 a S1
/// S1 b S1
/// S1 c S2
/// ```
///
/// The `finals:` line may list no state at all. A `start: NAME` line may
/// appear among the transitions to start from another state than `S0`.
pub struct DFAReader;

impl DFAReader {
    /// Reads a DFA from a file. The automaton is named after the file stem.
    ///
    /// # Description
    ///
    /// * `file_path` - The path to the file that contains the DFA.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsa::dfa::reader::*;
    ///
    /// match DFAReader::new_from_file("det.fsa") {
    ///     Ok(dfa) => {
    ///         // Do stuff with the dfa
    ///     }
    ///     Err(e) => println!("{}", e),
    /// }
    /// ```
    pub fn new_from_file<P: AsRef<Path>>(file_path: P) -> Result<DFA<String>> {
        let file_path = file_path.as_ref();
        let name = file_path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("fsa");
        debug!("reading automaton {:?} from {}", name, file_path.display());
        let file = BufReader::new(File::open(file_path)?);
        DFAReader::new_from_lines(name, &mut file.lines())
    }

    /// Reads a DFA from a `&str`.
    ///
    /// # Description
    ///
    /// * `name` - The name given to the automaton.
    /// * `dfa` - The string representation of the DFA.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsa::dfa::reader::*;
    ///
    /// // the (big)* dog
    /// let dfa = "states: S0 S1 S2\n\
    ///            finals: S2\n\
    ///            S0 the S1\n\
    ///            S1 big S1\n\
    ///            S1 dog S2";
    /// let dfa = DFAReader::new_from_string("np", dfa).unwrap();
    /// let words: Vec<String> = "the big dog".split(' ').map(String::from).collect();
    /// assert!(dfa.accept(&words));
    /// ```
    pub fn new_from_string(name: &str, dfa: &str) -> Result<DFA<String>> {
        DFAReader::new_from_lines(name, &mut dfa.lines().map(|line| Ok(line.to_owned())))
    }

    fn new_from_lines(name: &str, lines: &mut dyn Iterator<Item = io::Result<String>>) -> Result<DFA<String>> {
        let mut lines = lines
            .map(|line| line.map(|contents| contents.split('#').next().unwrap_or("").trim().to_owned()))
            .enumerate()
            .map(|(nline, line)| (nline + 1, line))
            .filter(|(_, line)| line.as_ref().map_or(true, |contents| !contents.is_empty()));
        let mut dfa = DFAReader::read_states(name, &mut lines)?;
        dfa = DFAReader::read_finals(dfa, &mut lines)?;
        for line in lines {
            dfa = DFAReader::read_transition(dfa, line)?;
        }
        dfa.finalize().map_err(|e| DFAReaderError::DFA(e, 0))
    }

    fn read_states(name: &str, lines: &mut Lines) -> Result<DFABuilder<String>> {
        let (nline, line) = lines.next().ok_or(DFAReaderError::MissingStates)?;
        let line = line?;
        let names = keyword(&line, "states").ok_or(DFAReaderError::MissingStates)?;
        names
            .fold(DFABuilder::<String>::new(name), |acc, state| acc.add_state(state))
            .map_err(|e| DFAReaderError::DFA(e, nline))
    }

    fn read_finals(dfa: DFABuilder<String>, lines: &mut Lines) -> Result<DFABuilder<String>> {
        let (nline, line) = lines.next().ok_or(DFAReaderError::MissingFinalStates)?;
        let line = line?;
        let names = keyword(&line, "finals").ok_or(DFAReaderError::MissingFinalStates)?;
        names
            .fold(Ok::<_, DFAError>(dfa), |acc, state| acc.add_final(state))
            .map_err(|e| DFAReaderError::DFA(e, nline))
    }

    fn read_transition(dfa: DFABuilder<String>, line: (usize, io::Result<String>)) -> Result<DFABuilder<String>> {
        let (nline, line) = line;
        let line = line?;
        if let Some(start) = keyword(&line, "start") {
            let start = start
                .exactly_one()
                .map_err(|_| DFAReaderError::IllformedLine(nline))?;
            return dfa.add_start(start).map_err(|e| DFAReaderError::DFA(e, nline));
        }
        let mut tokens = line.split_whitespace();
        let (src, symb, dest) = tokens.next_tuple().ok_or(DFAReaderError::IncompleteTransition(nline))?;
        if tokens.next().is_some() {
            return Err(DFAReaderError::IllformedLine(nline));
        }
        dfa.add_transition(src, symb.to_owned(), dest)
            .map_err(|e| DFAReaderError::DFA(e, nline))
    }
}

/// The words of `line` after `word:`, if its first word is exactly `word:`.
/// `start : S1` is a transition on the symbol `:`, not a directive.
fn keyword<'a>(line: &'a str, word: &str) -> Option<SplitWhitespace<'a>> {
    let mut words = line.split_whitespace();
    let first = words.next()?;
    if first.strip_suffix(':') == Some(word) {
        Some(words)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_read_demo_table() {
        let model = "# a b* c\n\
                     states: S0 S1 S2\n\
                     finals: S2\n\
                     \n\
                     S0 a S1   # first\n\
                     S1 b S1\n\
                     S1 c S2";
        let dfa = DFAReader::new_from_string("test", model).unwrap();
        assert_eq!(dfa.name(), "test");
        assert_eq!(dfa.num_states(), 3);
        assert!(dfa.accept(&words("a b b c")));
        assert_eq!(dfa.consume(&words("a c d")).map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_empty_file() {
        let model = "";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::MissingStates) => {}
            _ => panic!("MissingStates expected."),
        }
    }

    #[test]
    fn test_states_line_first() {
        let model = "finals: S0\n\
                     states: S0";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::MissingStates) => {}
            _ => panic!("MissingStates expected."),
        }
    }

    #[test]
    fn test_no_finals() {
        let model = "states: S0 S1\n\
                     ";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::MissingFinalStates) => {}
            _ => panic!("MissingFinalStates expected."),
        }
    }

    #[test]
    fn test_empty_finals() {
        let model = "states: S0 S1\n\
                     finals:\n\
                     S0 a S1";
        let dfa = DFAReader::new_from_string("test", model).unwrap();
        assert!(dfa.consume(&words("a")).is_none());
    }

    #[test]
    fn test_unknown_final() {
        let model = "states: S0 S1\n\
                     finals: S1 S3";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::DFA(DFAError::UnknownState(name), line)) => {
                assert_eq!((name.as_str(), line), ("S3", 2))
            }
            _ => panic!("UnknownState expected."),
        }
    }

    #[test]
    fn test_no_transitions() {
        let model = "states: S0\n\
                     finals: S0";
        let dfa = DFAReader::new_from_string("test", model).unwrap();
        assert!(!dfa.accept(&[]));
    }

    #[test]
    fn test_transitions_with_at_least_four_elements() {
        let model = "states: S0 S1\n\
                     finals: S1\n\
                     S0 a S1 S1";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::IllformedLine(line)) => assert_eq!(line, 3),
            _ => panic!("IllformedLine expected."),
        }
    }

    #[test]
    fn test_incomplete_transition() {
        let model = "states: S0 S1\n\
                     finals: S1\n\
                     S0 a";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::IncompleteTransition(line)) => assert_eq!(line, 3),
            _ => panic!("IncompleteTransition expected."),
        }
    }

    #[test]
    fn test_transition_to_unknown_state() {
        let model = "states: S0 S1 S2\n\
                     finals: S2\n\
                     S0 a S1\n\
                     S1 b S9";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::DFA(DFAError::UnknownState(_), line)) => assert_eq!(line, 4),
            _ => panic!("UnknownState expected."),
        }
    }

    #[test]
    fn test_duplicated_transition() {
        let model = "states: S0 S1 S2\n\
                     finals: S2\n\
                     S1 b S1\n\
                     # comment lines still count\n\
                     S1 b S2";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::DFA(DFAError::DuplicatedTransition { .. }, line)) => assert_eq!(line, 5),
            _ => panic!("DuplicatedTransition expected."),
        }
    }

    #[test]
    fn test_missing_start() {
        let model = "states: S1 S2\n\
                     finals: S2\n\
                     S1 a S2";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::DFA(DFAError::MissingStartingState(_), line)) => assert_eq!(line, 0),
            _ => panic!("MissingStartingState expected."),
        }
    }

    #[test]
    fn test_custom_start() {
        let model = "states: q0 q1\n\
                     finals: q1\n\
                     start: q0\n\
                     q0 go q1";
        let dfa = DFAReader::new_from_string("test", model).unwrap();
        assert!(dfa.accept(&words("go")));
    }

    #[test]
    fn test_colon_symbol_is_not_a_directive() {
        let model = "states: S0 start S1\n\
                     finals: S1\n\
                     S0 x start\n\
                     start : S1";
        let dfa = DFAReader::new_from_string("test", model).unwrap();
        assert_eq!(dfa.start().name(), "S0");
        assert!(dfa.accept(&words("x :")));
    }

    #[test]
    fn test_spaced_keyword_is_not_the_states_line() {
        let model = "states : S0\n\
                     finals:";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::MissingStates) => {}
            _ => panic!("MissingStates expected."),
        }
    }

    #[test]
    fn test_start_with_two_names() {
        let model = "states: q0 q1\n\
                     finals: q1\n\
                     start: q0 q1";
        match DFAReader::new_from_string("test", model) {
            Err(DFAReaderError::IllformedLine(line)) => assert_eq!(line, 3),
            _ => panic!("IllformedLine expected."),
        }
    }

    #[test]
    fn test_read_from_fake_file() {
        let file = "fake.txt";
        match DFAReader::new_from_file(file) {
            Err(DFAReaderError::Io(_)) => {}
            _ => panic!("Io::Error expected."),
        }
    }

    #[test]
    fn test_read_from_file() {
        let path = std::env::temp_dir().join(format!("fsa-reader-{}.fsa", std::process::id()));
        std::fs::write(&path, "states: S0 S1\nfinals: S1\nS0 yes S1\n").unwrap();
        let dfa = DFAReader::new_from_file(&path);
        std::fs::remove_file(&path).unwrap();
        let dfa = dfa.unwrap();
        assert_eq!(dfa.name(), format!("fsa-reader-{}", std::process::id()));
        assert!(dfa.accept(&words("yes")));
    }
}
