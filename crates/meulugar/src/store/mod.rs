//! # Storage Layer
//!
//! Meu Lugar keeps user data in two media with different contracts, and this
//! module models them as two separate abstractions that are never unified:
//!
//! | | Records | Attachments |
//! |---|---|---|
//! | Trait | [`backend::RecordBackend`] | [`media::MediaStore`] |
//! | Access | synchronous | `async` (may suspend) |
//! | Values | short JSON strings | opaque bytes |
//! | Capacity | small, quota-enforced | large |
//! | Holds | places, portfolio, settings | photos, audio recordings |
//!
//! ## Record Keys
//!
//! ```text
//! meu-lugar-places      # JSON array of Place, insertion order
//! meu-lugar-portfolio   # JSON object, optional
//! meu-lugar-settings    # JSON value, optional
//! ```
//!
//! ## Attachment Keys
//!
//! One blob per role and place: `photo_<placeId>`, `audio_<placeId>`
//! (see [`crate::model::media_key`]). Deleting a place does not delete its
//! blobs; [`crate::api::MeuLugarApi`] decides whether to cascade.
//!
//! ## Storage Layout (filesystem implementations)
//!
//! ```text
//! {data_dir}/
//! ├── records/
//! │   ├── meu-lugar-places.json
//! │   ├── meu-lugar-portfolio.json
//! │   └── meu-lugar-settings.json
//! └── media/
//!     ├── photo_{id}.bin
//!     └── audio_{id}.bin
//! ```
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`] / [`fs_media::FsMediaStore`]: production.
//! - [`mem_backend::MemBackend`] / [`mem_media::MemMediaStore`]: tests, with
//!   failure injection.

pub mod backend;
pub mod fs_backend;
pub mod fs_media;
pub mod media;
pub mod mem_backend;
pub mod mem_media;
pub mod place_store;

pub use backend::RecordBackend;
pub use media::MediaStore;
pub use place_store::{PlaceStore, PLACES_KEY, PORTFOLIO_KEY, SETTINGS_KEY};

/// Subdirectory of the data dir holding record files.
pub const RECORDS_DIR: &str = "records";
/// Subdirectory of the data dir holding attachment blobs.
pub const MEDIA_DIR: &str = "media";
