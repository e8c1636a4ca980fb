use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use vellum_editor::{
    clear_document, editor_schema, insert_broken_table, insert_filled_table, Command,
    EditorState, FileStorage, Store, SyncDebouncer, ViewProvider,
};

use crate::config::Config;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Write immediately instead of waiting out the debounce window
    #[arg(long)]
    pub no_debounce: bool,
}

/// The three panel actions, named for what they do to the document.
#[derive(Debug, Clone, Copy)]
pub enum PanelAction {
    BrokenTable,
    FilledTable,
    Reset,
}

impl PanelAction {
    fn command(self) -> Command {
        match self {
            PanelAction::BrokenTable => insert_broken_table,
            PanelAction::FilledTable => insert_filled_table,
            PanelAction::Reset => clear_document,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PanelAction::BrokenTable => "inserted broken table",
            PanelAction::FilledTable => "inserted filled table",
            PanelAction::Reset => "cleared document",
        }
    }
}

pub fn edit(args: EditArgs, cwd: &str, action: PanelAction) -> Result<()> {
    let config = Config::load(cwd)?;

    let schema = Arc::new(editor_schema()?);
    let mut store = Store::new(FileStorage::new(config.storage_dir(cwd))?);
    store.load()?;

    let mut view = ViewProvider::new(EditorState::new(schema)?);
    store.attach(&mut view)?;

    // Edits arm the debouncer; the write happens once the quiet
    // period runs out, same as the editor's autosave.
    let debouncer = Rc::new(RefCell::new(SyncDebouncer::new(config.debounce())));
    let autosave = debouncer.clone();
    view.set_on_edit(move || autosave.borrow_mut().schedule(Instant::now()));

    let executed = view.exec_command(action.command())?;
    if !executed {
        println!("{} command declined to run", "⚠".yellow());
        return Ok(());
    }

    if args.no_debounce {
        if debouncer.borrow_mut().flush() {
            store.sync(&view)?;
        }
    } else {
        while debouncer.borrow().is_pending() {
            std::thread::sleep(Duration::from_millis(25));
            let fired = debouncer.borrow_mut().poll(Instant::now());
            if fired {
                store.sync(&view)?;
            }
        }
    }

    println!("{} {}", "✓".green(), action.label());

    let state = view.state();
    let violations = state.doc.violations(&state.schema);
    if violations.is_empty() {
        println!("  document satisfies its schema");
    } else {
        println!(
            "  {} the document now has {} content violation(s); run `vellum show` to list them",
            "✗".red(),
            violations.len()
        );
    }

    Ok(())
}
