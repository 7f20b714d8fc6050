//! Line-oriented terminal I/O
//!
//! The shell reads commands and confirmation answers from the same
//! `LineSource`, so both go through `Prompter`. On a terminal lines come from
//! a rustyline editor with history; anything else reads from a `BufRead`.

use std::io::{BufRead, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::executor::Confirm;

use super::errors::{CliError, CliResult};

/// Command prompt
pub const PROMPT: &str = ">>>Enter command: ";

/// Source of prompted input lines.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its terminator. `None` at
    /// end of input.
    ///
    /// `output` is the shell's output stream; sources that draw their own
    /// prompt only flush it.
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> CliResult<Option<String>>;
}

/// Interactive terminal input with line editing and history.
pub struct TerminalSource {
    editor: DefaultEditor,
}

impl TerminalSource {
    pub fn new() -> CliResult<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| CliError::io_error(format!("Failed to open terminal: {}", e)))?;
        Ok(Self { editor })
    }
}

impl LineSource for TerminalSource {
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> CliResult<Option<String>> {
        output.flush()?;

        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e.into()),
            Err(e) => Err(CliError::io_error(e.to_string())),
        }
    }
}

/// Reads lines from any buffered reader, echoing prompts to the output.
pub struct ReaderSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, prompt: &str, output: &mut dyn Write) -> CliResult<Option<String>> {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

/// Asks the user before destructive operations.
///
/// Only an answer of `y` (any case) approves. End of input or a read
/// error declines.
pub struct Prompter<'a> {
    input: &'a mut dyn LineSource,
    output: &'a mut dyn Write,
}

impl<'a> Prompter<'a> {
    pub fn new(input: &'a mut dyn LineSource, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }
}

impl Confirm for Prompter<'_> {
    fn confirm(&mut self, action: &str) -> bool {
        let question = format!("Are you sure you want to perform \"{}\"? [y/n]: ", action);
        match self.input.read_line(&question, &mut *self.output) {
            Ok(Some(answer)) => answer.trim().eq_ignore_ascii_case("y"),
            _ => false,
        }
    }
}
