// Copyright 2016 Vincent Vigneron. See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at.your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

// Usage:
//   fsa                        # builds the a b* c automaton and traces a run
//   fsa TABLE [TOKENS]         # scans TOKENS (or stdin) with the automaton in TABLE
//
// Tokens are separated by whitespace. RUST_LOG controls the log output.

use std::io::{self, Read, Write};
use std::{env, fs};

use anyhow::{Context, Result};
use log::info;

use fsa::dfa::core::{step_line, Match, State, DFA};
use fsa::dfa::reader::DFAReader;
use fsa::scan::scan;

// The accept loop runs silently, only the last run shows its steps.
fn demo(out: &mut dyn Write) -> Result<()> {
    let fsa_abc = DFA::build(
        "test",
        ["S0", "S1", "S2"],
        ["S2"],
        [("S0", 'a', "S1"), ("S1", 'b', "S1"), ("S1", 'c', "S2")],
    )?;

    writeln!(out)?;
    write!(out, "{}", fsa_abc)?;

    writeln!(out, "\nTesting some strings...\n")?;
    for s in ["abc", "ab", "abbc", "abcd"] {
        let input: Vec<char> = s.chars().collect();
        writeln!(out, "   {:<5}  {}", s, fsa_abc.accept(&input))?;
    }

    writeln!(out, "\nConsuming as much as possible from abbcd...\n")?;
    let input: Vec<char> = "abbcd".chars().collect();
    let mut steps = Vec::new();
    let found = fsa_abc.consume_with(&input, &mut |state: &State<char>, consumed: &[char], ahead: &[char]| {
        steps.push(step_line(state, consumed, ahead));
    });
    for step in &steps {
        writeln!(out, "   {}", step)?;
    }
    match found {
        Some(found) => writeln!(out, "   match: {}", found)?,
        None => writeln!(out, "   no match")?,
    }
    Ok(())
}

/// One line of the scan report: offset, length and symbols, tab separated.
fn report_line(at: usize, found: &Match<String>) -> String {
    format!("{}\t{}\t{}", at, found.len(), found)
}

fn run(out: &mut dyn Write, table: &str, tokens: Option<&str>) -> Result<()> {
    let dfa = DFAReader::new_from_file(table).with_context(|| format!("failed to load automaton from {}", table))?;
    let text = match tokens {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read tokens from {}", path))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("failed to read tokens from stdin")?;
            text
        }
    };
    let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
    info!("scanning {} tokens with {:?}", tokens.len(), dfa.name());

    write!(out, "{}", dfa)?;
    let found = scan(&dfa, &tokens);
    for (at, m) in &found {
        writeln!(out, "{}", report_line(*at, m))?;
    }
    info!("{} matches", found.len());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().skip(1).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.as_slice() {
        [] => demo(&mut out),
        [table] => run(&mut out, table, None),
        [table, tokens] => run(&mut out, table, Some(tokens.as_str())),
        _ => anyhow::bail!("usage: fsa [TABLE [TOKENS]]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_traces_only_the_last_run() {
        let mut out = Vec::new();
        demo(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let (head, last_run) = text.split_once("Consuming as much as possible").unwrap();
        let accepts = head.split_once("Testing some strings...").unwrap().1;
        assert_eq!(
            accepts.lines().filter(|l| !l.trim().is_empty()).collect::<Vec<_>>(),
            vec!["   abc    true", "   ab     false", "   abbc   true", "   abcd   false"]
        );
        assert_eq!(
            last_run.lines().skip(2).collect::<Vec<_>>(),
            vec![
                "   <State S0>  . a b b c d",
                "   <State S1> a . b b c d",
                "   <State S1> a b . b c d",
                "   <State S1> a b b . c d",
                "   <State S2 f> a b b c . d",
                "   match: a b b c",
            ]
        );
    }

    #[test]
    fn test_report_line() {
        let dfa = DFAReader::new_from_string("np", "states: S0 S1 S2\nfinals: S2\nS0 the S1\nS1 dog S2").unwrap();
        let tokens: Vec<String> = "a the dog".split(' ').map(String::from).collect();
        let found = scan(&dfa, &tokens);
        assert_eq!(found.len(), 1);
        assert_eq!(report_line(found[0].0, &found[0].1), "1\t2\tthe dog");
    }
}
