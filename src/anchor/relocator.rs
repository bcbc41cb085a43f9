//! Anchor relocation for async hosts
//!
//! Window scans are CPU-bound, so the relocator runs them on the blocking
//! pool under a timeout. When the timeout fires the scan is told to stop
//! through a shared flag so the worker does not keep burning a thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::error::{AnchorError, AnchorResult};
use super::matcher::{ScanOutcome, WindowMatcher, DEFAULT_SNIPPET_LENGTH};
use super::quote::locate_quote;
use super::types::{MatchResult, RelocationTarget};

/// Default time budget for one relocation
pub const DEFAULT_MATCH_TIMEOUT_MS: u64 = 5_000;

/// Relocator options
#[derive(Debug, Clone)]
pub struct RelocatorConfig {
    /// Snippet length used to size the scan window
    pub snippet_length: usize,
    /// Time budget per relocation
    pub timeout: Duration,
    /// Try a normalized quote search when the exact scan finds nothing
    pub quote_fallback: bool,
}

impl Default for RelocatorConfig {
    fn default() -> Self {
        Self {
            snippet_length: DEFAULT_SNIPPET_LENGTH,
            timeout: Duration::from_millis(DEFAULT_MATCH_TIMEOUT_MS),
            quote_fallback: false,
        }
    }
}

/// Finds stored anchors in the current document text
#[derive(Debug, Clone, Default)]
pub struct Relocator {
    config: RelocatorConfig,
}

impl Relocator {
    pub fn new(config: RelocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelocatorConfig {
        &self.config
    }

    /// Relocate on the blocking pool, bounded by the configured timeout.
    ///
    /// `Ok(None)` means the anchor could not be recovered and the caller
    /// should show it as unanchored.
    pub async fn relocate(
        &self,
        target: RelocationTarget,
        document: Arc<str>,
    ) -> AnchorResult<Option<MatchResult>> {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let config = self.config.clone();

        let task = tokio::task::spawn_blocking(move || {
            relocate_with(&config, &target, &document, &worker_cancel)
        });

        let budget_ms = self.config.timeout.as_millis() as u64;
        match timeout(self.config.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(AnchorError::Worker(join_err.to_string())),
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                tracing::warn!(timeout_ms = budget_ms, "Relocation timed out");
                Err(AnchorError::Timeout(budget_ms))
            }
        }
    }

    /// Relocate on the current thread without a time budget
    pub fn relocate_blocking(
        &self,
        target: &RelocationTarget,
        document: &str,
    ) -> AnchorResult<Option<MatchResult>> {
        relocate_with(&self.config, target, document, &AtomicBool::new(false))
    }
}

fn relocate_with(
    config: &RelocatorConfig,
    target: &RelocationTarget,
    document: &str,
    cancel: &AtomicBool,
) -> AnchorResult<Option<MatchResult>> {
    let matcher = WindowMatcher::new(config.snippet_length);

    match matcher.scan(&target.fingerprint, document, cancel) {
        ScanOutcome::Found(offset) => Ok(Some(MatchResult::exact(offset))),
        ScanOutcome::Cancelled => Err(AnchorError::Cancelled),
        ScanOutcome::NotFound => {
            if !config.quote_fallback {
                return Ok(None);
            }
            Ok(target
                .context
                .as_ref()
                .and_then(|context| locate_quote(context, document)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::fingerprint::fingerprint;
    use crate::anchor::types::{MatchType, TextAnchor};

    const DOC: &str = "The quick brown fox jumps over the lazy dog";

    fn relocator(snippet_length: usize, quote_fallback: bool) -> Relocator {
        Relocator::new(RelocatorConfig {
            snippet_length,
            timeout: Duration::from_secs(5),
            quote_fallback,
        })
    }

    #[tokio::test]
    async fn test_exact_relocation() {
        let target = RelocationTarget::fingerprint_only(fingerprint("quick brown fox", "", ""));
        let found = relocator(5, false)
            .relocate(target, Arc::from(DOC))
            .await
            .unwrap();
        assert_eq!(found, Some(MatchResult::exact(4)));
    }

    #[tokio::test]
    async fn test_not_found_without_fallback() {
        let anchor = TextAnchor::from_range(DOC, 10, 15, 4).unwrap();
        let found = relocator(5, false)
            .relocate(anchor.relocation_target(), Arc::from(DOC))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_quote_fallback_after_miss() {
        let anchor = TextAnchor::from_range(DOC, 10, 15, 4).unwrap();
        let repaginated: Arc<str> = Arc::from("Page 2\nThe quick\nbrown fox jumps over the lazy dog");
        let found = relocator(5, true)
            .relocate(anchor.relocation_target(), repaginated)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.match_type, MatchType::Approximate);
        let selection = found.selection.unwrap();
        assert_eq!(selection.start_offset, 17);
        assert_eq!(selection.end_offset, 22);
    }

    #[tokio::test]
    async fn test_fallback_needs_stored_context() {
        let target = RelocationTarget::fingerprint_only(fingerprint("absent", "", ""));
        let found = relocator(5, true)
            .relocate(target, Arc::from(DOC))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_timeout_on_large_document() {
        let document: Arc<str> = Arc::from("lorem ipsum dolor sit amet ".repeat(200_000));
        let relocator = Relocator::new(RelocatorConfig {
            snippet_length: 100,
            timeout: Duration::from_millis(1),
            quote_fallback: false,
        });
        let target = RelocationTarget::fingerprint_only(fingerprint("never present", "", ""));

        let err = relocator.relocate(target, document).await.unwrap_err();
        assert_eq!(err, AnchorError::Timeout(1));
    }

    #[test]
    fn test_blocking_relocation() {
        let target = RelocationTarget::fingerprint_only(fingerprint("the lazy dog", "", ""));
        let found = relocator(4, false).relocate_blocking(&target, DOC).unwrap();
        assert_eq!(found, Some(MatchResult::exact(31)));
    }

    #[test]
    fn test_cancelled_scan_is_an_error() {
        let target = RelocationTarget::fingerprint_only(fingerprint("dog", "", ""));
        let cancel = AtomicBool::new(true);
        let result = relocate_with(&RelocatorConfig::default(), &target, &"x".repeat(400), &cancel);
        assert_eq!(result, Err(AnchorError::Cancelled));
    }
}
