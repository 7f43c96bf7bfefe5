//! Read-eval-print loop.

use std::io::{self, Write};

use hbnb_infra::{Storage, StorageError};

use crate::editor::{LineEditor, ReadResult};
use crate::error::CommandError;
use crate::executor::Executor;
use crate::interpreter::{self, Input, Verb};

pub const PROMPT: &str = "(hbnb) ";

/// Whether the loop keeps reading after a line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// First `reload()` of a freshly opened store.
///
/// Corruption leaves the live set empty and is handed back for reporting;
/// every other failure is returned as an error.
pub fn initial_reload<S>(storage: &mut S) -> Result<Option<StorageError>, StorageError>
where
    S: Storage + ?Sized,
{
    match storage.reload() {
        Ok(()) => Ok(None),
        Err(err @ StorageError::DataCorruption(_)) => {
            tracing::warn!(error = %err, "starting with an empty store");
            Ok(Some(err))
        }
        Err(err) => Err(err),
    }
}

/// Error line as shown to the user.
pub fn render_error(err: &dyn std::fmt::Display) -> String {
    format!("** {err} **")
}

pub struct Repl<E, S, W> {
    editor: E,
    executor: Executor<S>,
    out: W,
}

impl<E, S, W> Repl<E, S, W>
where
    E: LineEditor,
    S: Storage,
    W: Write,
{
    pub fn new(editor: E, storage: S, out: W) -> Self {
        Self {
            editor,
            executor: Executor::new(storage),
            out,
        }
    }

    pub fn executor(&self) -> &Executor<S> {
        &self.executor
    }

    /// Read and run lines until `quit` or end of input, then close storage.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let line = match self.editor.read_line(PROMPT)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };
            if !line.trim().is_empty() {
                self.editor.add_history(&line);
            }
            if self.handle_line(&line)? == Flow::Quit {
                break;
            }
        }
        self.out.flush()?;

        if let Err(err) = self.executor.storage_mut().close() {
            tracing::warn!(error = %err, "closing storage failed");
        }
        Ok(())
    }

    /// Interpret and execute one line, writing its output.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let output = match interpreter::parse(line) {
            Ok(Input::Empty) => None,
            Ok(Input::Quit) => return Ok(Flow::Quit),
            Ok(Input::Help(topic)) => Some(help(topic.as_deref())),
            Ok(Input::Command(command)) => render(self.executor.execute(&command)),
            Err(err) => Some(render_error(&err)),
        };
        if let Some(text) = output {
            writeln!(self.out, "{text}")?;
        }
        Ok(Flow::Continue)
    }
}

fn render(result: Result<Option<String>, CommandError>) -> Option<String> {
    match result {
        Ok(output) => output,
        Err(err) => {
            if let CommandError::Storage(source) = &err {
                tracing::error!(error = %source, "storage failure while executing command");
            }
            Some(render_error(&err))
        }
    }
}

/// Text printed by `help [topic]`.
pub fn help(topic: Option<&str>) -> String {
    match topic {
        None => {
            let verbs: Vec<&str> = Verb::ALL.iter().map(|v| v.name()).collect();
            format!(
                "Documented commands (type help <topic>):\n{} help quit\n\
                 Method-call form: <class>.<command>(<args>)",
                verbs.join(" ")
            )
        }
        Some("quit") | Some("EOF") => "Quit command to exit the program".to_string(),
        Some("help") => "List available commands with \"help\" or detailed help with \"help <command>\"".to_string(),
        Some(name) => match Verb::from_name(name) {
            Some(verb) => format!("Usage: {}", verb.usage()),
            None => format!("*** No help on {name}"),
        },
    }
}
