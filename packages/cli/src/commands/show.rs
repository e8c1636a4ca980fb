use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use vellum_editor::{editor_schema, EditorState, FileStorage, Store, ViewProvider};
use vellum_markup::render_html_fragment;
use vellum_model::{serialize_doc, Node};

use crate::config::Config;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Print the persisted JSON envelope
    #[arg(long)]
    pub json: bool,

    /// Print rendered HTML markup
    #[arg(long, conflicts_with = "json")]
    pub html: bool,
}

pub fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    let schema = Arc::new(editor_schema()?);
    let mut store = Store::new(FileStorage::new(config.storage_dir(cwd))?);
    store.load()?;

    let mut view = ViewProvider::new(EditorState::new(schema)?);
    store.attach(&mut view)?;

    let state = view.state();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view.state_to_json()?)?);
        return Ok(());
    }

    if args.html {
        let markup = serialize_doc(&state.schema, &state.doc)?;
        print!("{}", render_html_fragment(&markup));
        return Ok(());
    }

    print_tree(&state.doc, 0);
    println!();

    let violations = state.doc.violations(&state.schema);
    if violations.is_empty() {
        println!("{} document satisfies its schema", "✓".green());
    } else {
        println!("{} {} content violation(s)", "✗".red(), violations.len());
        for violation in &violations {
            println!("  {}: {}", violation.at, violation.message);
        }
    }

    Ok(())
}

fn print_tree(node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match &node.text {
        Some(text) => {
            if node.marks.is_empty() {
                println!("{indent}text {text:?}");
            } else {
                let marks = node
                    .marks
                    .iter()
                    .map(|mark| mark.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{indent}text {text:?} [{marks}]");
            }
        }
        None => {
            println!("{indent}{}", node.name);
            for child in &node.content {
                print_tree(child, depth + 1);
            }
        }
    }
}
