use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{config::Config as EditorConfig, Editor};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

mod input;

use input::{fixup_input, ReplHelper};
use tablang::host::HostCapabilities;
use tablang::{execute, Environment, Record};

const HISTORY_FILE: &str = ".tablang_history";
const PROMPT: &str = "(tablang) ";

#[derive(Parser)]
#[command(about = "A command language for tabular data and charts", version)]
struct Opt {
    /// Script to execute instead of starting the REPL
    script: Option<PathBuf>,

    /// File made available to `CARREGAR ARQUIVO`
    #[arg(long)]
    upload: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn init_editor() -> Result<Editor<ReplHelper, DefaultHistory>> {
    let config = EditorConfig::builder().auto_add_history(true).build();
    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(ReplHelper::new()));

    Ok(editor)
}

fn init_history(editor: &mut Editor<ReplHelper, DefaultHistory>) {
    let _ = editor.load_history(HISTORY_FILE);
}

fn save_history(editor: &mut Editor<ReplHelper, DefaultHistory>) -> Result<()> {
    match editor.save_history(HISTORY_FILE) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to save history: {}", e),
    }
}

fn welcome() {
    println!("tablang v{}", env!("CARGO_PKG_VERSION"));
    println!("Commands: CARREGAR, MOSTRAR, CALCULAR, PLOTAR. Type 'sair' to quit.");
    println!();
}

fn show_record(record: &Record) {
    match record {
        Record::Message(text) => println!("{}", text),
        Record::Error(text) => println!("error: {}", text),
        Record::Table {
            variable,
            columns,
            rows,
        } => {
            println!("first rows of '{}':", variable);
            print_table(columns, rows);
        }
        Record::Image { file_name, bytes } => match fs::write(file_name, bytes) {
            Ok(_) => println!("chart saved to '{}'", file_name),
            Err(e) => println!("error: failed to write '{}': {}", file_name, e),
        },
    }
}

fn print_table(columns: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", render(columns).trim_end());
    for row in rows {
        println!("{}", render(row).trim_end());
    }
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;

    let mut env = Environment::new();
    let caps = HostCapabilities;

    // Batch mode: the whole script is one invocation
    if let Some(script) = &opts.script {
        let source = match fs::read_to_string(script) {
            Ok(source) => source,
            Err(e) => bail!("Failed to read {}: {}", script.display(), e),
        };

        for record in &execute(&source, &mut env, opts.upload.as_deref(), &caps) {
            show_record(record);
        }

        return Ok(());
    }

    let mut editor = init_editor()?;
    init_history(&mut editor);
    welcome();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                info!("read: {}", &line);

                let line = fixup_input(&line);
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("sair") || trimmed.eq_ignore_ascii_case("quit") {
                    break;
                }

                for record in &execute(&line, &mut env, opts.upload.as_deref(), &caps) {
                    show_record(record);
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("Press Ctrl-D or type 'sair' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("sair");
                break;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                break;
            }
        }
    }

    save_history(&mut editor)?;

    Ok(())
}
