pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "comanda",
    about = "Comanda operator CLI",
    long_about = "Inspect configuration, print the menu, and dry-run receipt reading.",
    after_help = "Examples:\n  comanda config\n  comanda catalog\n  comanda receipt comprovante.pdf"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Print the menu offered to customers")]
    Catalog,
    #[command(about = "Extract the paid amount from a PDF receipt without touching any order")]
    Receipt {
        #[arg(help = "Path to the PDF receipt")]
        path: PathBuf,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Catalog => commands::catalog::run(),
        Command::Receipt { path } => commands::receipt::run(&path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
