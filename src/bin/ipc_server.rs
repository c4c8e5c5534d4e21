#![allow(missing_docs)]
//! IPC server for the career counselor
//!
//! Runs as a subprocess and answers JSON requests over stdin/stdout, one per
//! line, so any host runtime can hold counselor sessions.
//!
//! ## Usage
//!
//! ```bash
//! cargo build --features ipc --bin eliza-counselor-ipc
//! ./eliza-counselor-ipc
//! ```
//!
//! ### Example Request
//! ```json
//! {"id": 1, "method": "createSession", "params": {"config": {"seed": 7}}}
//! ```
//!
//! ### Example Response
//! ```json
//! {"id": 1, "result": {"sessionId": "session-1", "lines": ["Hello! I am Eliza the Career Counselor.", "What is your name?"]}}
//! ```

use std::io::{self, BufRead, Write};

use elizaos_plugin_eliza_counselor::interop::handle_ipc_line;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    info!("eliza-counselor-ipc started, waiting for requests");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "error reading input");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let output = handle_ipc_line(&line);
        if writeln!(stdout, "{}", output).and_then(|_| stdout.flush()).is_err() {
            warn!("stdout closed");
            break;
        }
    }

    info!("eliza-counselor-ipc shutting down");
}
