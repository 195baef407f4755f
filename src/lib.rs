pub mod address;
pub mod boundary;
pub mod cli;
pub mod command;
pub mod document;
pub mod error;
pub mod hash;
pub mod interpreter;
pub mod key_path;
pub mod logging;
pub mod patch;
pub mod reformat;
pub mod syntax;

pub use command::{EditCommand, KeyValue};
pub use interpreter::{Dispatch, dispatch, modify_document};
pub use patch::Patch;
