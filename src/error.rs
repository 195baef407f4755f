use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StructeditError {
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read stdin: {source}")]
    StdinRead {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON request: {source}")]
    InvalidJsonRequest {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize response JSON: {source}")]
    ResponseSerialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Edit command '{tag}' is not supported")]
    UnsupportedCommand { tag: String },

    #[error("Tree-sitter language initialization failed: {message}")]
    LanguageSetup { message: String },

    #[error("Failed to parse document: {message}")]
    ParseFailure { message: String },

    #[error("Syntax tree is malformed: {message}")]
    MalformedTree { message: String },

    #[error("No node matched id '{id}' in the current tree")]
    NodeNotFound { id: String },

    #[error("Expected an enclosing {expected} node, found only '{found}' and its ancestors")]
    MissingAncestor {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{container} node has no '{delimiter}' delimiter")]
    MissingDelimiter {
        container: &'static str,
        delimiter: &'static str,
    },

    #[error("Span [{start}, {end}) is not a valid range for a document of {len} bytes")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Document is not valid JSON: {source}")]
    DocumentNotJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid key path '{path}': {message}")]
    InvalidKeyPath { path: String, message: String },

    #[error("Key path '{path}' was not found in the document")]
    KeyPathNotFound { path: String },

    #[error("Document has changed. Expected hash '{expected_hash}', got '{actual_hash}'")]
    PreconditionFailed {
        expected_hash: String,
        actual_hash: String,
    },

    #[error("File '{path}' is locked by another writer")]
    ResourceBusy { path: String },

    #[error("Failed to initialize logging: {message}")]
    LoggingSetup { message: String },
}

impl StructeditError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn invalid_span(start: usize, end: usize, len: usize) -> Self {
        Self::InvalidSpan { start, end, len }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (kind, suggestion) = match self {
            Self::Io { .. } | Self::StdinRead { .. } => ("io_error", None),
            Self::InvalidJsonRequest { .. } | Self::InvalidRequest { .. } => {
                ("invalid_request", None)
            }
            Self::UnsupportedCommand { .. } => (
                "unsupported_command",
                Some(format!(
                    "Supported command types: {}",
                    crate::command::COMMAND_KINDS.join(", ")
                )),
            ),
            Self::ResponseSerialization { .. } => ("serialization_error", None),
            Self::LanguageSetup { .. } | Self::ParseFailure { .. } => ("parse_failure", None),
            Self::MalformedTree { .. } => ("malformed_tree", None),
            Self::NodeNotFound { .. } => (
                "node_not_found",
                Some("Re-run 'structedit read' to get ids for the current document".to_string()),
            ),
            Self::MissingAncestor { .. } | Self::MissingDelimiter { .. } => {
                ("inapplicable_target", None)
            }
            Self::InvalidSpan { .. } => ("invalid_span", None),
            Self::DocumentNotJson { .. } => (
                "document_not_json",
                Some("Key paths are unavailable until the document parses as JSON".to_string()),
            ),
            Self::InvalidKeyPath { .. } => (
                "invalid_key_path",
                Some("Use dot/bracket syntax such as 'service.targets[1].name'".to_string()),
            ),
            Self::KeyPathNotFound { .. } => ("key_path_not_found", None),
            Self::PreconditionFailed { .. } => (
                "precondition_failed",
                Some("Re-read the document and retry with its current hash".to_string()),
            ),
            Self::ResourceBusy { .. } => (
                "resource_busy",
                Some("Retry once the other writer has finished".to_string()),
            ),
            Self::LoggingSetup { .. } => ("logging_setup", None),
        };

        ErrorResponse {
            error: ErrorBody {
                r#type: kind.to_string(),
                message: self.to_string(),
                suggestion,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub r#type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
