//! Workpiece - structure and metadata validation for digitized works

use std::process::ExitCode;

fn main() -> ExitCode {
    match workpiece::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
