//! Terminal side of the tools: logger setup, colouring and the
//! confirmation prompt.

use std::fmt::Display;
use std::io::{BufRead, Write};

use crossterm::style::{style, Stylize};
use log::{error, LevelFilter};

use crate::{Error, Result};

/// Initialise `env_logger`. Verbose output is the `info` level; `RUST_LOG`
/// still takes precedence.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

/// Report the error that ends the current command.
pub fn report_failure(err: &Error) {
    error!("{}. Exiting...", err);
}

/// Dimmed block label.
pub fn label(text: &str) -> impl Display + '_ {
    style(text).dim()
}

/// Readers as a tree, one line per connection string.
pub fn reader_tree(connstrings: &[String]) -> Vec<String> {
    connstrings
        .iter()
        .enumerate()
        .map(|(i, connstring)| {
            let branch = if i + 1 == connstrings.len() {
                "└──"
            } else {
                "├──"
            };
            format!("{} [{}] {}", branch, i, connstring)
        })
        .collect()
}

/// Print `question` in yellow and read the answer. Blank lines are skipped;
/// only `Y` or `y` confirm and end of input declines.
pub fn confirm<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    out: &mut W,
) -> Result<bool> {
    write!(out, "{} ", style(question).yellow())?;
    out.flush()?;

    let mut answer = String::new();
    loop {
        answer.clear();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        if let Some(c) = answer.trim_start().chars().next() {
            return Ok(matches!(c, 'Y' | 'y'));
        }
    }
}
