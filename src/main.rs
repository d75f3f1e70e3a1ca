//! nginline binary

use nginline::cli::InlinerCli;
use nginline::InlineError;
use std::process;

fn main() {
    let mut cli = InlinerCli::new();

    match cli.run() {
        Ok(()) => {}
        Err(InlineError::Io(e)) => {
            eprintln!("IO Error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Inlining failed: {}", e);
            process::exit(1);
        }
    }
}
