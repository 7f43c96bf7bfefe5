//! `hbnb-console`: command interpreter, verb executor and REPL.
//!
//! Input lines in either surface syntax are normalized into a canonical
//! [`Command`], executed against a [`hbnb_infra::Storage`] backend, and
//! rendered as one line of text.

pub mod attributes;
pub mod editor;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod repl;

pub use editor::{LineEditor, ReadResult, ReaderEditor, RustylineEditor};
pub use error::CommandError;
pub use executor::Executor;
pub use interpreter::{Command, Input, Verb, normalize, parse};
pub use repl::{Flow, PROMPT, Repl, initial_reload};
