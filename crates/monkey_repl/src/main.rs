mod repl;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use monkey_interpreter::{evaluate_source, Environment};
use monkey_interpreter::object::Object;

/// The Monkey programming language
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run (.mon); starts an interactive session when omitted
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    install_tracing();

    let args = Args::parse();

    match args.file {
        Some(path) => run_script(&path),
        None => {
            repl::repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_script(path: &Path) -> ExitCode {
    if !path.is_file() {
        eprintln!("ERROR: {} is not a file", path.display());
        return ExitCode::FAILURE;
    }
    if path.extension().map_or(true, |ext| ext != "mon") {
        eprintln!("ERROR: {} is not a monkey script", path.display());
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("ERROR: could not read {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let env = Rc::new(RefCell::new(Environment::new()));
    match evaluate_source(&source, &env) {
        Ok(result) => {
            if result.is_error() {
                eprintln!("{}", result);
                return ExitCode::FAILURE;
            }
            // Scripts talk through puts; only a non-null final value is shown
            if *result != Object::Null {
                println!("{}", result.to_code_string());
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("ERROR: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
