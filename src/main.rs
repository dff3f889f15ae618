//! JMPL command-line driver
//!
//! Runs a script file when given one argument, or an interactive prompt
//! when given none.

use std::io::{self, BufRead, Write};
use std::process;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use jmpl::run;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.len() {
        1 => run_prompt(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: jmpl [script]");
            process::exit(64);
        }
    }
}

/// Runs a script file, exiting 65 if it contains any error
fn run_file(path: &str) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("could not read script '{path}'"))?;

    let outcome = run(&source);
    for diagnostic in &outcome.diagnostics {
        eprintln!("{diagnostic}");
    }
    if outcome.had_error {
        process::exit(65);
    }
    Ok(())
}

/// Reads and runs lines interactively until end of input
///
/// Each line runs against a fresh environment; errors are reported and do
/// not end the session.
fn run_prompt() -> Result<()> {
    println!("JMPL {} interactive prompt", jmpl::VERSION);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().context("could not flush prompt")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("could not read input line")?;
        if read == 0 {
            break;
        }

        let outcome = run(&line);
        for diagnostic in &outcome.diagnostics {
            eprintln!("{diagnostic}");
        }
    }
    Ok(())
}
