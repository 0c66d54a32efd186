//! # Meu Lugar CLI
//!
//! A terminal front end for the Meu Lugar place journal. The binary is
//! intentionally thin: the CLI lives in `src/cli/`, while this file only
//! starts the runtime, invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/meulugar/`: the persistence core (model, stores, codec, API)
//! - `crates/meulugar-cli/`: this binary, depending on the `meulugar` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/meulugar-cli/src/cli/)                   │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal output with `colored` (print.rs)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/meulugar/src/api.rs)                     │
//! │  - Owns the record and attachment stores                    │
//! │  - Returns structured values, never prints                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI is responsible for **all** user-facing concerns: argument parsing,
//! confirmation of destructive actions, error reporting and rendering.
//!
//! ## Runtime
//!
//! Attachment I/O is async, record I/O is not. A single-threaded tokio runtime
//! is enough: one command runs per process.

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
