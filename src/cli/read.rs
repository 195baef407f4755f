use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::address::{NodeId, node_to_id};
use crate::document::Document;
use crate::error::StructeditError;
use crate::hash::hash_node;
use crate::key_path::{KeyPath, key_paths_in};
use crate::syntax::{NodeKind, Span};

#[derive(Debug, Args)]
pub struct ReadArgs {
    #[arg(
        long,
        value_name = "KIND",
        help = "Optional node kind filter (e.g. Property, Number, ⚠)"
    )]
    pub kind: Option<String>,
    #[arg(long, help = "Include delimiter tokens ({, }, [, ])")]
    pub all: bool,
    #[arg(long, help = "Include full node text in output")]
    pub verbose: bool,
    #[arg(value_name = "FILE", help = "JSON document to read")]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub file: PathBuf,
    pub file_hash: String,
    pub has_errors: bool,
    pub nodes: Vec<ReadNode>,
    pub summary: ReadSummary,
}

#[derive(Debug, Serialize)]
pub struct ReadNode {
    pub id: NodeId,
    pub kind: String,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_path: Option<KeyPath>,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadSummary {
    pub nodes: usize,
    pub matches: usize,
}

pub fn run_read(args: ReadArgs) -> Result<ReadResponse, StructeditError> {
    let kind_filter = args.kind.as_deref().map(parse_kind).transpose()?;
    let document = Document::open(&args.file)?;
    let text = document.text();

    let mut key_paths = match serde_json::from_str::<Value>(text) {
        Ok(value) => key_paths_in(document.tree(), &value),
        Err(error) => {
            debug!(%error, "document is not valid JSON; key paths omitted");
            Vec::new()
        }
    };

    let mut nodes = Vec::new();
    for node in document.tree().walk() {
        let kind = node.kind();
        let wanted = match kind_filter {
            Some(filter) => kind == filter,
            None => args.all || !kind.is_liminal(),
        };
        if !wanted {
            continue;
        }

        let key_path = key_paths
            .get_mut(node.position())
            .and_then(Option::take);
        let hash = hash_node(node, text).ok_or_else(|| {
            StructeditError::invalid_span(node.from(), node.to(), text.len())
        })?;

        nodes.push(ReadNode {
            id: node_to_id(node),
            kind: kind.name().to_string(),
            span: node.span(),
            key_path,
            hash,
            text: args
                .verbose
                .then(|| node.text(text).map(str::to_string))
                .flatten(),
        });
    }

    let matches = nodes.len();
    Ok(ReadResponse {
        file: args.file,
        file_hash: document.hash(),
        has_errors: document.tree().has_errors(),
        nodes,
        summary: ReadSummary {
            nodes: document.tree().len(),
            matches,
        },
    })
}

fn parse_kind(raw: &str) -> Result<NodeKind, StructeditError> {
    NodeKind::from_name(raw).ok_or_else(|| StructeditError::InvalidRequest {
        message: format!(
            "Unknown node kind '{raw}'; expected one of: {}",
            NodeKind::ALL
                .iter()
                .map(|kind| kind.name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}
