//! Replay a command script and print the final canvas as JSON.
//!
//! Usage: `pixedit-replay [SCRIPT]`. Reads the script from stdin when no path
//! is given.

use pixedit_replay::{ReplayError, load_script, parse_script, run_script};
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ReplayError> {
    let script = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading script from {path}");
            load_script(path)?
        }
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            parse_script(&input)?
        }
    };

    let report = run_script(&script)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
