mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, show, EditArgs, PanelAction, ShowArgs};

/// Vellum CLI - document editing against a schema that is only
/// enforced when you ask
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a structurally invalid table (unchecked construction)
    BrokenTable(EditArgs),

    /// Insert a filled, schema-valid table
    Table(EditArgs),

    /// Delete the whole document body
    Reset(EditArgs),

    /// Print the stored document
    Show(ShowArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::BrokenTable(args) => edit(args, &cwd, PanelAction::BrokenTable),
        Command::Table(args) => edit(args, &cwd, PanelAction::FilledTable),
        Command::Reset(args) => edit(args, &cwd, PanelAction::Reset),
        Command::Show(args) => show(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
