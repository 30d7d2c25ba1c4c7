//! Progress reporting types for sync operations.
//!
//! Every provider adapter and the reconciler report through the same event
//! enum so the CLI can render one progress bar or log stream regardless of
//! where matches come from.

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Requesting a page of match identifiers.
    FetchingPage {
        /// Offset of the first identifier requested.
        start: usize,
        /// Page size requested.
        count: usize,
    },

    /// A page of match records was fetched and classified.
    FetchedPage {
        /// Page number (1-indexed).
        page: u32,
        /// Records on this page.
        count: usize,
        /// Running total of in-window matches.
        in_window_so_far: usize,
    },

    /// A single match detail could not be fetched or normalized; it is skipped.
    MatchFetchFailed {
        /// The match identifier.
        match_id: String,
        /// Error message.
        error: String,
    },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        /// Upstream resource being fetched.
        resource: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Attempt number that was throttled (1-indexed).
        attempt: u32,
    },

    /// A record older than the window was seen; no further pages will be requested.
    EarlyStop {
        /// Page on which the stop was triggered.
        page: u32,
    },

    /// Finished listing matches from the provider.
    ScanComplete {
        /// Number of in-window matches produced.
        total: usize,
    },

    /// Per-queue counts of the scanned matches.
    QueueBreakdown {
        /// `(queue label, count)` sorted by descending count.
        queues: Vec<(String, usize)>,
    },

    /// Starting to reconcile matches against the destination.
    ReconcileStarted {
        /// Matches to reconcile.
        total: usize,
        /// Destination entries already carrying a match marker.
        existing_synced: usize,
        /// Whether this is a dry run.
        dry_run: bool,
    },

    /// A destination entry was created (or would be, in a dry run).
    MatchSynced {
        /// The match identifier.
        match_id: String,
        /// Description written to the entry.
        description: String,
    },

    /// A match was already present in the destination.
    MatchSkipped {
        /// The match identifier.
        match_id: String,
    },

    /// A match could not be synced.
    MatchFailed {
        /// The match identifier.
        match_id: String,
        /// Error message.
        error: String,
    },

    /// Pausing after a throttled destination write.
    CreationCooldown {
        /// Time to wait (ms).
        wait_ms: u64,
    },

    /// Reconciliation finished.
    SyncComplete {
        /// Entries created.
        synced: usize,
        /// Matches already present.
        skipped: usize,
        /// Matches that failed.
        failed: usize,
    },

    /// Warning message (non-fatal).
    Warning {
        /// Warning message.
        message: String,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
///
/// This is a convenience function to avoid repetitive `if let Some(cb) = ...` patterns.
///
/// # Example
///
/// ```ignore
/// use matchsync::sync::{emit, SyncProgress, ProgressCallback};
///
/// fn my_scan(on_progress: Option<&ProgressCallback>) {
///     emit(on_progress, SyncProgress::ScanComplete { total: 42 });
/// }
/// ```
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
