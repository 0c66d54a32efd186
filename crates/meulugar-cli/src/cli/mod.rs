//! # CLI Behavior
//!
//! This is **one possible front end** for Meu Lugar, standing in for the
//! graphical app. It is the only place that knows about terminal I/O, exit
//! codes and output formatting.
//!
//! ## Naked Execution
//!
//! Running `meulugar` with no arguments lists the places, newest first.
//!
//! ## Identifying Places
//!
//! Commands taking an `<ID>` accept the full id or any unambiguous prefix of
//! it, as printed by `meulugar list`.
//!
//! ## Destructive Commands
//!
//! `delete` and `clear` ask for confirmation unless `--yes` is given. The
//! library never asks again.
//!
//! ## Module Structure
//!
//! - `commands`: context setup, dispatch and per-command handlers
//! - `print`: output formatting (colors, tables, messages)
//! - `setup`: argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::run;
