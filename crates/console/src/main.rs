use std::io::{self, IsTerminal};

use anyhow::Context;

use hbnb_console::repl::render_error;
use hbnb_console::{ReaderEditor, Repl, RustylineEditor, initial_reload};
use hbnb_infra::{StorageConfig, open_storage};

fn main() -> anyhow::Result<()> {
    hbnb_observability::init();

    let config = StorageConfig::from_env().context("invalid storage configuration")?;
    let mut storage = open_storage(&config).context("failed to open storage")?;
    if let Some(corruption) = initial_reload(&mut storage).context("failed to load stored entities")? {
        eprintln!("{}", render_error(&corruption));
    }

    let stdout = io::stdout().lock();
    if io::stdin().is_terminal() {
        let editor = RustylineEditor::new().context("failed to start line editor")?;
        Repl::new(editor, storage, stdout).run()?;
    } else {
        Repl::new(ReaderEditor::new(io::stdin().lock()), storage, stdout).run()?;
    }
    Ok(())
}
