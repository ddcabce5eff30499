//! # Command Definitions
//!
//! Line-oriented text commands for driving a headless run from a script.
//!
//! ```text
//! # walk north-east for half a second, then swing
//! move 1 -1
//! wait 30
//! attack
//! ```

use crate::input::{Intent, MoveAxes};
use crate::{DelveError, DelveResult};
use std::str::FromStr;

/// A single script command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Change the held movement axes
    Move(MoveAxes),
    /// Press a one-shot intent
    Press(Intent),
    /// Advance this many ticks
    Wait(u32),
}

impl FromStr for Command {
    type Err = DelveError;

    fn from_str(line: &str) -> DelveResult<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| DelveError::InvalidAction("empty command".to_string()))?;

        let command = match verb.to_ascii_lowercase().as_str() {
            "move" => {
                let x = parse_arg::<i8>(words.next(), line)?;
                let z = parse_arg::<i8>(words.next(), line)?;
                Command::Move(MoveAxes::new(x, z))
            }
            "stop" => Command::Move(MoveAxes::default()),
            "attack" => Command::Press(Intent::Attack),
            "dash" => Command::Press(Intent::Dash),
            "interact" => Command::Press(Intent::Interact),
            "confirm" => Command::Press(Intent::Confirm),
            "select" => Command::Press(Intent::Select(parse_arg(words.next(), line)?)),
            "wait" => Command::Wait(parse_arg(words.next(), line)?),
            other => {
                return Err(DelveError::InvalidAction(format!(
                    "unknown command '{other}'"
                )))
            }
        };

        if words.next().is_some() {
            return Err(DelveError::InvalidAction(format!(
                "trailing arguments in '{line}'"
            )));
        }
        Ok(command)
    }
}

fn parse_arg<T: FromStr>(word: Option<&str>, line: &str) -> DelveResult<T> {
    word.and_then(|w| w.parse().ok())
        .ok_or_else(|| DelveError::InvalidAction(format!("bad or missing argument in '{line}'")))
}

/// Parses a whole script, skipping blank lines and `#` comments.
///
/// Errors name the offending line number.
pub fn parse_script(text: &str) -> DelveResult<Vec<Command>> {
    text.lines()
        .enumerate()
        .filter_map(|(number, line)| {
            let line = line.split('#').next().unwrap_or("").trim();
            (!line.is_empty()).then_some((number + 1, line))
        })
        .map(|(number, line)| {
            line.parse().map_err(|err| match err {
                DelveError::InvalidAction(msg) => {
                    DelveError::InvalidAction(format!("line {number}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}
