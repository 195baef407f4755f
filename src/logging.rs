//! Logging setup for the `structedit` binary and tests.
//!
//! Logs go to stderr so stdout stays reserved for JSON responses.
//!
//! ## Environment Variables
//!
//! 1. **`STRUCTEDIT_LOG`** (highest priority). A bare level such as `debug`
//!    expands to `warn,structedit=debug`; anything with `=`, `:` or `,` is used
//!    as a full filter directive.
//! 2. **`RUST_LOG`**, used as-is.
//! 3. **Default**: `warn`.

use std::env;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::error::StructeditError;

pub const LOG_ENV: &str = "STRUCTEDIT_LOG";

/// Install the global stderr subscriber.
pub fn init() -> Result<(), StructeditError> {
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(create_filter())
        .try_init()
        .map_err(|error| StructeditError::LoggingSetup {
            message: error.to_string(),
        })
}

/// Initialize logging for tests; safe to call from every test.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn create_filter() -> EnvFilter {
    filter_from(env::var(LOG_ENV).ok(), env::var("RUST_LOG").ok())
}

fn filter_from(structedit_log: Option<String>, rust_log: Option<String>) -> EnvFilter {
    if let Some(structedit_log) = structedit_log {
        return EnvFilter::new(expand_directive(&structedit_log));
    }
    if let Some(rust_log) = rust_log {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new("warn")
}

fn expand_directive(raw: &str) -> String {
    if raw.contains('=') || raw.contains(':') || raw.contains(',') {
        return raw.to_string();
    }
    format!("warn,structedit={raw}")
}
