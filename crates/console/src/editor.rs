//! Line editor abstraction for the console.
//!
//! Interactive sessions read through rustyline (history, completion). Piped
//! input and tests read through a plain [`BufRead`].

use std::io::{self, BufRead};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Config, Context, Editor, Helper, Highlighter, Hinter, Validator};

use hbnb_core::EntityKind;

use crate::interpreter::Verb;

/// Result of reading one line.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadResult {
    Line(String),
    /// Ctrl+C: abandon the current line.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
}

pub trait LineEditor {
    /// Read one line, showing `prompt` when the editor is interactive.
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult>;

    fn add_history(&mut self, line: &str);
}

#[derive(Helper, Completer, Hinter, Validator, Highlighter)]
struct HbnbHelper {
    #[rustyline(Completer)]
    completer: CommandCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

/// Completes verbs in first position and type names after them.
struct CommandCompleter {
    words: Vec<String>,
    types: Vec<String>,
}

impl CommandCompleter {
    fn new() -> Self {
        let types: Vec<String> = EntityKind::ALL.iter().map(|k| k.name().to_string()).collect();
        let words = Verb::ALL
            .iter()
            .map(|v| v.name().to_string())
            .chain(["help", "quit"].map(String::from))
            .chain(types.iter().map(|t| format!("{t}.")))
            .collect();
        Self { words, types }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        let start = head.rfind(char::is_whitespace).map_or(0, |i| i + 1);
        let word = &head[start..];
        let pool = if start == 0 { &self.words } else { &self.types };

        let candidates = pool
            .iter()
            .filter(|w| w.starts_with(word))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

/// Interactive editor backed by rustyline.
pub struct RustylineEditor {
    editor: Editor<HbnbHelper, DefaultHistory>,
}

impl RustylineEditor {
    pub fn new() -> io::Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(io::Error::other)?
            .build();

        let mut editor = Editor::with_config(config).map_err(io::Error::other)?;
        editor.set_helper(Some(HbnbHelper {
            completer: CommandCompleter::new(),
            hinter: HistoryHinter::new(),
        }));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Non-interactive editor over any buffered reader. No prompt is written.
pub struct ReaderEditor<R> {
    reader: R,
}

impl<R: BufRead> ReaderEditor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineEditor for ReaderEditor<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<ReadResult> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(ReadResult::Eof);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(ReadResult::Line(line))
    }

    fn add_history(&mut self, _line: &str) {}
}
