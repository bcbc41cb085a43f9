//! Sliding window matcher
//!
//! Recovers where a fingerprinted passage sits in a (possibly re-extracted)
//! document by digesting every window of `snippet_length * 3` characters.
//!
//! # Cost
//!
//! This is an exhaustive `O(n * w)` scan with one SHA-256 per start position.
//! Async callers should go through [`Relocator`](super::relocator::Relocator),
//! which moves the scan onto the blocking pool with a timeout. A rolling hash
//! over the normalized text, or a substring prefilter on candidate starts,
//! would make this sub-quadratic without changing results.

use std::sync::atomic::{AtomicBool, Ordering};

use super::context::char_boundaries;
use super::fingerprint::{digest, Fingerprint};
use super::normalize::normalize_into;

/// Default snippet length; the scanned window is three times this
pub const DEFAULT_SNIPPET_LENGTH: usize = 100;

/// Window starts scanned between cancellation checks
const CANCEL_CHECK_INTERVAL: usize = 256;

/// Outcome of a cancellable scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Leftmost window start whose digest matched
    Found(usize),
    /// Every window was checked without a match
    NotFound,
    /// The cancellation flag was raised mid-scan
    Cancelled,
}

/// Exhaustive window scanner
#[derive(Debug, Clone, Copy)]
pub struct WindowMatcher {
    snippet_length: usize,
}

impl Default for WindowMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SNIPPET_LENGTH)
    }
}

impl WindowMatcher {
    pub fn new(snippet_length: usize) -> Self {
        Self { snippet_length }
    }

    /// Window size in characters
    pub fn window_size(&self) -> usize {
        self.snippet_length.saturating_mul(3)
    }

    /// Scan `document` for a window whose normalized digest equals `target`.
    ///
    /// The earliest matching start wins. Documents shorter than the window
    /// are reported as not found without scanning.
    pub fn scan(&self, target: &Fingerprint, document: &str, cancel: &AtomicBool) -> ScanOutcome {
        let window = self.window_size();
        let bounds = char_boundaries(document);
        let len = bounds.len() - 1;

        if len < window {
            tracing::debug!(
                document_chars = len,
                window_chars = window,
                "Document shorter than scan window"
            );
            return ScanOutcome::NotFound;
        }

        let wanted = target.as_bytes();
        let mut normalized = String::with_capacity(bounds[window.min(len)] * 2);

        for start in 0..=(len - window) {
            if start % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                tracing::debug!(scanned = start, "Window scan cancelled");
                return ScanOutcome::Cancelled;
            }

            normalize_into(&document[bounds[start]..bounds[start + window]], &mut normalized);
            if &digest(&normalized) == wanted {
                tracing::debug!(
                    fingerprint = %target,
                    offset = start,
                    "Fingerprint matched"
                );
                return ScanOutcome::Found(start);
            }
        }

        ScanOutcome::NotFound
    }

    /// Uncancellable scan
    pub fn find(&self, target: &Fingerprint, document: &str) -> Option<usize> {
        match self.scan(target, document, &AtomicBool::new(false)) {
            ScanOutcome::Found(offset) => Some(offset),
            ScanOutcome::NotFound | ScanOutcome::Cancelled => None,
        }
    }
}

/// Find the start offset of the first window of `snippet_length * 3`
/// characters whose normalized digest equals `fingerprint`.
pub fn find_by_fingerprint(
    fingerprint: &Fingerprint,
    document_text: &str,
    snippet_length: usize,
) -> Option<usize> {
    WindowMatcher::new(snippet_length).find(fingerprint, document_text)
}
