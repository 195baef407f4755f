use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use structedit::cli::{Cli, Commands};
use structedit::error::StructeditError;

fn main() -> ExitCode {
    if let Err(error) = structedit::logging::init() {
        eprintln!("{error}");
    }

    match run() {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let serialized = serde_json::to_string_pretty(&error.to_error_response()).unwrap_or_else(
                |_| {
                    "{\"error\":{\"type\":\"serialization_error\",\"message\":\"Failed to serialize error response\"}}"
                        .to_string()
                },
            );
            println!("{serialized}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<String, StructeditError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Read(args) => to_json(&structedit::cli::read::run_read(args)?),
        Commands::Patch(args) => to_json(&structedit::cli::patch::run_patch(*args)?),
        Commands::Locate(args) => to_json(&structedit::cli::locate::run_locate(args)?),
        Commands::Format(args) => to_json(&structedit::cli::format::run_format(args)?),
    }
}

fn to_json(response: &impl Serialize) -> Result<String, StructeditError> {
    serde_json::to_string_pretty(response)
        .map_err(|source| StructeditError::ResponseSerialization { source })
}
