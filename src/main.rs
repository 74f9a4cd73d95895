//! Gridsheet - evaluate spreadsheet formulas from the command line

mod args;
mod default_functions;
mod error;

use anyhow::Context;
use gridsheet_core::document::{DEFAULT_COLS, DEFAULT_ROWS};
use gridsheet_core::{CellRef, Document};
use gridsheet_engine::engine::{Dynamic, format_dynamic};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("GRIDSHEET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_document(opts: &args::Options) -> anyhow::Result<Document> {
    let mut doc = if opts.sample {
        Document::with_sample_data(DEFAULT_ROWS, DEFAULT_COLS)
    } else {
        Document::new()
    };

    let mut functions_files = opts.functions_files.clone();
    default_functions::prepend_default_functions_if_present(
        &mut functions_files,
        opts.no_default_functions,
    );
    let default_path = default_functions::default_functions_path();
    for path in &functions_files {
        match doc.load_functions(path) {
            Ok(_) => {}
            Err(e) if default_path.as_ref() == Some(path) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load default functions");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("loading {}", path.display()));
            }
        }
    }

    for (address, input) in &opts.assignments {
        let cell: CellRef = address.parse()?;
        doc.set_cell_from_input(cell, input)
            .with_context(|| format!("setting {}", address))?;
    }

    Ok(doc)
}

fn print_value(value: &Dynamic) {
    if value.is_array() {
        for item in value.clone().into_array().unwrap_or_default() {
            println!("{}", format_dynamic(&item));
        }
    } else {
        println!("{}", format_dynamic(value));
    }
}

fn run(opts: args::Options) -> anyhow::Result<ExitCode> {
    let doc = build_document(&opts)?;

    if let Some(count) = opts.headers {
        println!("{}", gridsheet_engine::engine::column_headers(count).join(" "));
    }

    if let Some(command) = &opts.command {
        let formula = command.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        return Ok(match doc.evaluate_formula(formula) {
            Ok(value) => {
                print_value(&value);
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("#ERR! {}", e);
                ExitCode::from(1)
            }
        });
    }

    if opts.headers.is_none() {
        let mut cells: Vec<CellRef> = doc.grid.iter().map(|entry| *entry.key()).collect();
        cells.sort();
        for cell in cells {
            println!("{}\t{}", cell, doc.display_value(&cell));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_logging();

    let argv: Vec<String> = env::args().skip(1).collect();
    let opts = match args::parse_args(&argv) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            args::print_usage();
            return ExitCode::from(2);
        }
    };
    if opts.help {
        args::print_usage();
        return ExitCode::SUCCESS;
    }

    match run(opts) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
