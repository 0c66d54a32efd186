//! # Meu Lugar Architecture
//!
//! Meu Lugar is a place journal for children: each entry is a favorite place
//! with an emotion, a short description, tags, coordinates and optionally a
//! photo and an audio recording. This crate is the **UI-agnostic persistence
//! core**. Front ends (the `meulugar` CLI, or anything else) sit on top of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Front end (meulugar-cli)                                   │
//! │  - Parses arguments, renders output, confirms deletes       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Application context owning both media                    │
//! │  - Workflows spanning records, attachments, projection      │
//! └─────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌────────────────┐  ┌──────────────────┐  ┌──────────────────┐
//! │ codec.rs       │  │ projection.rs    │  │ draft.rs         │
//! │ import/export  │  │ UI mirror        │  │ form validation  │
//! └────────────────┘  └──────────────────┘  └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - PlaceStore over a sync RecordBackend (small, quota)      │
//! │  - async MediaStore for photo/audio blobs                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout or prompts. Diagnostics go through
//! `tracing`; only a binary installs a subscriber (see [`logging`]).
//!
//! ## Module Overview
//!
//! - [`api`]: [`MeuLugarApi`], the facade and application context.
//! - [`model`]: `Place`, `Emotion`, `Portfolio`, attachment keys, defaulting.
//! - [`store`]: record and attachment media with filesystem and memory backends.
//! - [`codec`]: the JSON export document and validated import.
//! - [`projection`]: in-memory mirror of the place list.
//! - [`draft`]: form values and their validation.
//! - [`query`]: filter, sort and summarize place lists.
//! - [`config`]: layered configuration.
//! - [`error`]: [`LugarError`] and the crate `Result`.

pub mod api;
pub mod codec;
pub mod config;
pub mod draft;
pub mod error;
pub mod logging;
pub mod model;
pub mod projection;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::MeuLugarApi;
pub use error::{LugarError, Result};
pub use model::{Emotion, MediaRole, Place, Portfolio};
