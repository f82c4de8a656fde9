//! Command-line entry point.
//!
//! This binary does one thing: run a single `.asm`-style source file
//! through the full lex → parse → link → run pipeline and exit.
//!
//! Behavior summary:
//! - With **no args**, print usage and exit with failure.
//! - With `-h`/`--help`, print usage and exit successfully.
//! - With `-v`/`--version`, print the crate version and exit successfully.
//! - With any other single argument, treat it as a source file path: read
//!   it, run it, and stream `*print` output straight to stdout.
//!
//! There's no REPL mode and no separate compile step — every run parses,
//! links, and executes the file fresh.

use std::env;
use std::fs;
use std::io;
use std::process::ExitCode;

const USAGE: &str = "usage: tinyasm [-h|--help] [-v|--version] <file>";
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    let mut args = env::args().skip(1);

    let arg = match args.next() {
        Some(a) => a,
        None => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", USAGE);
            ExitCode::SUCCESS
        }
        "-v" | "--version" => {
            println!("tinyasm {}", VERSION);
            ExitCode::SUCCESS
        }
        path => run_file(path),
    }
}

/// Read `path` as source text and run it to completion, writing `*print`
/// output to locked stdout. A read failure or a pipeline error (parse,
/// link, or runtime) is reported to stderr and mapped to a failure exit
/// code rather than panicking.
fn run_file(path: &str) -> ExitCode {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("tinyasm: couldn't read '{}': {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match tinyasm::run_source(&text, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
