use clap::{Parser, Subcommand};

use crate::address::{NodeId, find_node_by_id};
use crate::document::Document;
use crate::error::StructeditError;
use crate::key_path::{KeyPath, resolve_key_path};
use crate::patch::Patch;
use crate::syntax::SyntaxNode;

pub mod format;
pub mod locate;
pub mod patch;
pub mod read;

#[derive(Debug, Parser)]
#[command(name = "structedit")]
#[command(about = "Structure-aware JSON editing engine")]
#[command(
    long_about = "Structure-aware JSON editing engine. Canonical flow: read -> patch, with locate for key paths and format for the optional reformat pass."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "List syntax nodes with ids, spans, key paths and hashes")]
    Read(read::ReadArgs),
    #[command(about = "Run one semantic edit command and print the resulting splice")]
    Patch(Box<patch::PatchArgs>),
    #[command(about = "Resolve a key path to a syntax node")]
    Locate(locate::LocateArgs),
    #[command(about = "Reformat one node's range with consistent indentation")]
    Format(format::FormatArgs),
}

/// Resolve `--node-id` or `--at` against the document, if either was given.
pub(crate) fn resolve_target<'d>(
    document: &'d Document,
    node_id: Option<&str>,
    key_path: Option<&str>,
) -> Result<Option<SyntaxNode<'d>>, StructeditError> {
    if let Some(raw) = node_id {
        let id = NodeId::from(raw);
        return find_node_by_id(document.tree(), &id)
            .map(Some)
            .ok_or_else(|| StructeditError::NodeNotFound { id: raw.to_string() });
    }

    if let Some(raw) = key_path {
        let path = KeyPath::parse(raw)?;
        return resolve_key_path(document.tree(), document.text(), &path).map(Some);
    }

    Ok(None)
}

/// Outcome of handing a patch back to the filesystem or the caller.
#[derive(Debug, Default)]
pub(crate) struct PatchDelivery {
    pub text: Option<String>,
    pub written: bool,
}

pub(crate) fn deliver_patch(
    document: &Document,
    patch: &Patch,
    apply: bool,
    in_place: bool,
) -> Result<PatchDelivery, StructeditError> {
    if !apply && !in_place {
        return Ok(PatchDelivery::default());
    }

    let patched = patch.apply(document.text())?;
    let written = in_place && !patch.is_noop();
    if written {
        document.write_in_place(&patched)?;
    }

    Ok(PatchDelivery {
        text: apply.then_some(patched),
        written,
    })
}
