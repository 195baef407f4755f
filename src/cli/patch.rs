use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::address::{NodeId, node_to_id};
use crate::command::EditCommand;
use crate::document::Document;
use crate::error::StructeditError;
use crate::interpreter::{Dispatch, dispatch};
use crate::patch::Patch;

use super::{deliver_patch, resolve_target};

#[derive(Debug, Args)]
pub struct PatchArgs {
    #[arg(
        long,
        value_name = "JSON",
        conflicts_with = "json",
        help = "Edit command JSON, e.g. '{\"type\":\"removeObjectKey\"}'"
    )]
    pub command: Option<String>,
    #[arg(long, help = "Read the edit command JSON from stdin")]
    pub json: bool,
    #[arg(
        long,
        value_name = "OFFSET",
        help = "Cursor byte offset; selects the focused node and the insertion point"
    )]
    pub cursor: Option<usize>,
    #[arg(
        long = "node-id",
        value_name = "ID",
        help = "Target node id from 'structedit read' (overrides the command's nodeId)"
    )]
    pub node_id: Option<String>,
    #[arg(
        long,
        value_name = "KEY_PATH",
        conflicts_with = "node_id",
        help = "Target the node at a key path (dot/bracket syntax)"
    )]
    pub at: Option<String>,
    #[arg(
        long = "expected-hash",
        value_name = "HASH",
        help = "Refuse to patch unless the file still has this hash"
    )]
    pub expected_hash: Option<String>,
    #[arg(long, help = "Include the patched document text in the response")]
    pub apply: bool,
    #[arg(long = "in-place", help = "Write the patched document back to FILE")]
    pub in_place: bool,
    #[arg(value_name = "FILE", help = "JSON document to patch")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct PatchResponse {
    pub command: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
    pub patch: Patch,
    pub file_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub written: bool,
}

pub fn run_patch(args: PatchArgs) -> Result<PatchResponse, StructeditError> {
    let raw_command = read_command(&args)?;
    let document = Document::open(&args.file)?;
    document.check_hash(args.expected_hash.as_deref())?;

    let command = match EditCommand::from_json(&raw_command) {
        Ok(command) => command,
        Err(StructeditError::UnsupportedCommand { tag }) => {
            debug!(%tag, "unsupported edit command; returning no-op patch");
            return Ok(PatchResponse {
                command: tag,
                outcome: "unsupported".to_string(),
                target: None,
                patch: Patch::noop(),
                file_hash: document.hash(),
                text: None,
                written: false,
            });
        }
        Err(error) => return Err(error),
    };

    if let Some(cursor) = args.cursor
        && cursor > document.text().len()
    {
        return Err(StructeditError::InvalidRequest {
            message: format!(
                "--cursor {cursor} is past the end of the document ({} bytes)",
                document.text().len()
            ),
        });
    }

    let command = match resolve_target(&document, args.node_id.as_deref(), args.at.as_deref())? {
        Some(node) => command.with_node_id(node_to_id(node)),
        None => command,
    };
    let focused = match args.cursor {
        Some(cursor) => document.tree().node_at(cursor),
        None => document.tree().root(),
    };

    let outcome = dispatch(&command, focused, document.text(), args.cursor);
    let outcome_name = outcome.outcome().to_string();
    let patch = match outcome {
        Dispatch::Failed(error) => return Err(error),
        other => other.into_patch(),
    };

    let delivery = deliver_patch(&document, &patch, args.apply, args.in_place)?;
    Ok(PatchResponse {
        command: command.kind_name().to_string(),
        outcome: outcome_name,
        target: command.node_id().cloned(),
        patch,
        file_hash: document.hash(),
        text: delivery.text,
        written: delivery.written,
    })
}

fn read_command(args: &PatchArgs) -> Result<String, StructeditError> {
    if let Some(command) = &args.command {
        return Ok(command.clone());
    }
    if !args.json {
        return Err(StructeditError::InvalidRequest {
            message: "Provide the edit command with --command or --json (stdin)".to_string(),
        });
    }

    let mut request_body = String::new();
    std::io::stdin()
        .read_to_string(&mut request_body)
        .map_err(|error| StructeditError::StdinRead { source: error })?;
    Ok(request_body)
}
