use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::address::{NodeId, node_to_id};
use crate::document::Document;
use crate::error::StructeditError;
use crate::hash::hash_node;
use crate::key_path::{KeyPath, resolve_key_path};
use crate::syntax::Span;

#[derive(Debug, Args)]
pub struct LocateArgs {
    #[arg(
        long,
        value_name = "KEY_PATH",
        help = "Key path in dot/bracket syntax, e.g. 'service.targets[1].name___value'"
    )]
    pub path: String,
    #[arg(value_name = "FILE", help = "JSON document to search")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct LocateResponse {
    pub file: PathBuf,
    pub path: KeyPath,
    pub id: NodeId,
    pub kind: String,
    pub span: Span,
    pub hash: String,
    pub text: String,
}

pub fn run_locate(args: LocateArgs) -> Result<LocateResponse, StructeditError> {
    let path = KeyPath::parse(&args.path)?;
    let document = Document::open(&args.file)?;
    let text = document.text();

    let node = resolve_key_path(document.tree(), text, &path)?;
    let snippet = node
        .text(text)
        .ok_or_else(|| StructeditError::invalid_span(node.from(), node.to(), text.len()))?;

    Ok(LocateResponse {
        file: args.file,
        path,
        id: node_to_id(node),
        kind: node.kind().name().to_string(),
        span: node.span(),
        hash: hash_node(node, text).unwrap_or_default(),
        text: snippet.to_string(),
    })
}
