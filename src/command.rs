//! A tiny line-oriented language for driving a [`Set`] from a file or a terminal.
//!
//! Every line holds one command. Blank lines and lines starting with `#` are skipped.
//!
//! | Command              | Effect                                      |
//! |----------------------|---------------------------------------------|
//! | `+ <key>`, `i <key>` | insert the key                              |
//! | `- <key>`, `r <key>` | remove the key                              |
//! | `? <key>`, `f <key>` | report whether the key is present           |
//! | `p`                  | print every key in ascending order          |
//! | `v`                  | check the invariants of the backing tree    |
//! | `h`                  | report the height of the backing tree       |
//!
//! Successful inserts and removes print nothing; every other outcome is written as one line.
//!
//! # Examples
//!
//! ```
//! use treeset::{command, Mode, Set};
//!
//! let mut set = Set::new(Mode::Balanced);
//! let mut out = Vec::new();
//! command::run(&mut set, "+ 2\n+ 1\n+ 2\n? 1\np\n".as_bytes(), &mut out).unwrap();
//!
//! assert_eq!(out, b"already present 2\nfound 1\n1\n2\n");
//! ```

use std::io::{self, BufRead, Write};
use std::num::ParseIntError;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::error::Error;
use crate::set::Set;
use crate::tree::Key;

/// One parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Add a key.
    Insert(Key),
    /// Take a key out.
    Remove(Key),
    /// Look a key up.
    Find(Key),
    /// Print all keys.
    Print,
    /// Check the tree invariants.
    Verify,
    /// Report the tree height.
    Height,
}

/// Why a line isn't a [`Command`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    /// The line has no command at all.
    #[error("empty command")]
    Empty,

    /// The first word isn't a known command.
    #[error("unknown command `{0}`")]
    Unknown(String),

    /// A command that needs a key didn't get one.
    #[error("`{0}` needs a key")]
    MissingKey(String),

    /// The key isn't an integer that fits a [`Key`].
    #[error("invalid key `{text}`: {source}")]
    InvalidKey {
        /// The offending word.
        text: String,
        /// Why it didn't parse.
        source: ParseIntError,
    },

    /// There was more on the line than the command takes.
    #[error("unexpected `{0}` after command")]
    Trailing(String),
}

/// Failure of [`run`].
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    /// A line couldn't be parsed. Nothing after it was executed.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        source: ParseCommandError,
    },

    /// Reading commands or writing results failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let op = words.next().ok_or(ParseCommandError::Empty)?;

        let mut key = || -> Result<Key, ParseCommandError> {
            let text = words
                .next()
                .ok_or_else(|| ParseCommandError::MissingKey(op.to_string()))?;
            text.parse().map_err(|source| ParseCommandError::InvalidKey {
                text: text.to_string(),
                source,
            })
        };

        let command = match op {
            "+" | "i" => Command::Insert(key()?),
            "-" | "r" => Command::Remove(key()?),
            "?" | "f" => Command::Find(key()?),
            "p" => Command::Print,
            "v" => Command::Verify,
            "h" => Command::Height,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(ParseCommandError::Trailing(extra.to_string())),
            None => Ok(command),
        }
    }
}

/// Applies `command` to `set`, writing any outcome to `out`.
pub fn execute<W: Write>(set: &mut Set, command: Command, out: &mut W) -> io::Result<()> {
    match command {
        Command::Insert(key) => report(set.insert(key), out),
        Command::Remove(key) => report(set.remove(key), out),
        Command::Find(key) if set.contains(key) => writeln!(out, "found {key}"),
        Command::Find(key) => writeln!(out, "not found {key}"),
        Command::Print => set.print_to(out),
        Command::Verify => match set.tree().validate() {
            Ok(()) => writeln!(out, "valid"),
            Err(violation) => writeln!(out, "invalid: {violation}"),
        },
        Command::Height => writeln!(out, "height {}", set.height()),
    }
}

fn report<W: Write>(result: Result<(), Error>, out: &mut W) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(Error::AlreadyPresent(key)) => writeln!(out, "already present {key}"),
        Err(Error::NotFound(key)) => writeln!(out, "not found {key}"),
        Err(error @ Error::AllocationFailure { .. }) => writeln!(out, "error: {error}"),
    }
}

/// Executes every command read from `input` and returns how many were executed. Stops at the
/// first line that doesn't parse.
#[instrument(level = "debug", skip_all)]
pub fn run<R: BufRead, W: Write>(
    set: &mut Set,
    input: R,
    out: &mut W,
) -> Result<usize, CommandError> {
    let mut executed = 0;

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let command = text.parse().map_err(|source| CommandError::Parse {
            line: number + 1,
            source,
        })?;
        execute(set, command, out)?;
        executed += 1;
    }

    debug!(executed, "finished command stream");
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;

    fn run_str(set: &mut Set, input: &str) -> Result<String, CommandError> {
        let mut out = Vec::new();
        run(set, input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_every_command() {
        assert_eq!("+ 5".parse::<Command>(), Ok(Command::Insert(5)));
        assert_eq!("i -5".parse::<Command>(), Ok(Command::Insert(-5)));
        assert_eq!("- 3".parse::<Command>(), Ok(Command::Remove(3)));
        assert_eq!("r 3".parse::<Command>(), Ok(Command::Remove(3)));
        assert_eq!("? 7".parse::<Command>(), Ok(Command::Find(7)));
        assert_eq!("  f   7 ".parse::<Command>(), Ok(Command::Find(7)));
        assert_eq!("p".parse::<Command>(), Ok(Command::Print));
        assert_eq!("v".parse::<Command>(), Ok(Command::Verify));
        assert_eq!("h".parse::<Command>(), Ok(Command::Height));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "x 1".parse::<Command>(),
            Err(ParseCommandError::Unknown("x".to_string()))
        );
        assert_eq!(
            "+".parse::<Command>(),
            Err(ParseCommandError::MissingKey("+".to_string()))
        );
        assert!(matches!(
            "+ five".parse::<Command>(),
            Err(ParseCommandError::InvalidKey { text, .. }) if text == "five"
        ));
        assert!(matches!(
            "+ 99999999999".parse::<Command>(),
            Err(ParseCommandError::InvalidKey { .. })
        ));
        assert_eq!(
            "p 1".parse::<Command>(),
            Err(ParseCommandError::Trailing("1".to_string()))
        );
    }

    #[test]
    fn reports_misses() {
        let mut set = Set::new(Mode::Balanced);
        let out = run_str(&mut set, "+ 1\n+ 1\n- 2\n? 2\n- 1\n? 1\n").unwrap();

        assert_eq!(out, "already present 1\nnot found 2\nnot found 2\nnot found 1\n");
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let mut set = Set::new(Mode::Unbalanced);
        let mut out = Vec::new();
        let input = "# setup\n\n+ 1\n   \n+ 2\n";
        let executed = run(&mut set, input.as_bytes(), &mut out).unwrap();

        assert_eq!(executed, 2);
        assert!(out.is_empty());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn verify_and_height() {
        let mut set = Set::new(Mode::Unbalanced);
        let out = run_str(&mut set, "+ 1\n+ 2\n+ 3\nh\nv\n").unwrap();

        assert_eq!(out, "height 3\nvalid\n");
    }

    #[test]
    fn stops_at_the_first_bad_line() {
        let mut set = Set::new(Mode::Balanced);
        let err = run_str(&mut set, "+ 1\nbogus\n+ 2\n").unwrap_err();

        assert!(matches!(err, CommandError::Parse { line: 2, .. }));
        assert!(set.contains(1));
        assert!(!set.contains(2));
    }

    #[test]
    fn capacity_errors_are_reported_and_skipped() {
        let mut set = Set::with_capacity(Mode::Balanced, 1);
        let out = run_str(&mut set, "+ 1\n+ 2\n? 2\n").unwrap();

        assert_eq!(
            out,
            "error: no room for key 2: node capacity of 1 is exhausted\nnot found 2\n"
        );
    }
}
