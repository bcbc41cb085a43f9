//! Text anchoring engine
//!
//! Derives position-independent identities for commented spans of plain
//! extracted text and finds them again after the document is re-extracted
//! or re-paginated.
//!
//! # Pipeline
//!
//! - Creation: [`resolve_selection`] → [`extract_context`] → [`fingerprint`]
//!   (bundled as [`TextAnchor::from_selection`] / [`TextAnchor::from_range`])
//! - Re-display: stored fingerprint + current text → [`find_by_fingerprint`]
//!   (or [`Relocator`] from async code), optionally falling back to
//!   [`locate_quote`]
//!
//! All offsets are character offsets. Everything here is a pure function of
//! its inputs and safe to call from any thread.

mod context;
mod error;
mod fingerprint;
mod matcher;
mod normalize;
mod quote;
mod relocator;
mod selection;
mod types;

pub use context::{extract_context, AnchorContext, DEFAULT_CONTEXT_LENGTH};
pub use error::{AnchorError, AnchorResult};
pub use fingerprint::{fingerprint, DigestBytes, Fingerprint, FINGERPRINT_HEX_LEN};
pub use matcher::{find_by_fingerprint, ScanOutcome, WindowMatcher, DEFAULT_SNIPPET_LENGTH};
pub use normalize::{normalize, normalize_into, normalize_with_map};
pub use quote::locate_quote;
pub use relocator::{Relocator, RelocatorConfig, DEFAULT_MATCH_TIMEOUT_MS};
pub use selection::{resolve_selection, SelectionRange};
pub use types::{MatchResult, MatchType, RelocationTarget, TextAnchor};
