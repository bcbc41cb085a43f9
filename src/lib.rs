//! Marginalia
//!
//! Anchors reader comments to passages of plain text so they can be found
//! again after the text is re-extracted or re-paginated.
//!
//! # Modules
//!
//! - `anchor`: normalization, fingerprints, context extraction and relocation
//! - `comments`: comment records and their storage
//! - `service`: creation, placement and deletion of anchored comments
//! - `config`: environment-driven settings

pub mod anchor;
pub mod comments;
pub mod config;
pub mod error;
pub mod service;

pub use config::Config;
pub use error::{AppError, Result};
pub use service::AnnotationService;
