use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::address::{NodeId, node_to_id};
use crate::document::Document;
use crate::error::StructeditError;
use crate::patch::Patch;
use crate::reformat::{ReformatOptions, reformat_node};

use super::{deliver_patch, resolve_target};

#[derive(Debug, Args)]
pub struct FormatArgs {
    #[arg(
        long = "node-id",
        value_name = "ID",
        help = "Node to reformat (defaults to the whole document)"
    )]
    pub node_id: Option<String>,
    #[arg(
        long,
        value_name = "KEY_PATH",
        conflicts_with = "node_id",
        help = "Reformat the node at a key path"
    )]
    pub at: Option<String>,
    #[arg(long, value_name = "N", default_value_t = 2, help = "Spaces per indent level")]
    pub indent: usize,
    #[arg(
        long = "expected-hash",
        value_name = "HASH",
        help = "Refuse to reformat unless the file still has this hash"
    )]
    pub expected_hash: Option<String>,
    #[arg(long, help = "Include the reformatted document text in the response")]
    pub apply: bool,
    #[arg(long = "in-place", help = "Write the reformatted document back to FILE")]
    pub in_place: bool,
    #[arg(value_name = "FILE", help = "JSON document to reformat")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub target: NodeId,
    pub patch: Patch,
    pub file_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub written: bool,
}

pub fn run_format(args: FormatArgs) -> Result<FormatResponse, StructeditError> {
    let document = Document::open(&args.file)?;
    document.check_hash(args.expected_hash.as_deref())?;

    let root = document.tree().root();
    let node = resolve_target(&document, args.node_id.as_deref(), args.at.as_deref())?
        .unwrap_or_else(|| root.first_child().unwrap_or(root));
    let patch = reformat_node(
        node,
        document.text(),
        ReformatOptions {
            indent: args.indent,
        },
    )?;

    let delivery = deliver_patch(&document, &patch, args.apply, args.in_place)?;
    Ok(FormatResponse {
        target: node_to_id(node),
        patch,
        file_hash: document.hash(),
        text: delivery.text,
        written: delivery.written,
    })
}
