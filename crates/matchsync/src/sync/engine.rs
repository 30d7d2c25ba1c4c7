//! Sync engine: scan a provider, snapshot the destination, reconcile.

use std::collections::HashMap;

use thiserror::Error;

use crate::destination::{DestinationError, TimeTracker};
use crate::provider::{CanonicalMatch, DateWindow, MatchSource, PlayerIdentity, ProviderError};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::reconcile::SyncReconciler;
use super::types::{SyncOptions, SyncReport};

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The provider's match listing failed.
    #[error("Failed to list matches: {0}")]
    Scan(#[from] ProviderError),

    /// The destination snapshot could not be read.
    #[error("Failed to read existing time entries: {0}")]
    Destination(#[from] DestinationError),
}

/// Per-queue match counts, most played first (ties by label).
pub fn queue_breakdown(matches: &[CanonicalMatch]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for m in matches {
        *counts.entry(m.queue_label.as_str()).or_default() += 1;
    }

    let mut breakdown: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    breakdown
}

/// Sync one player's matches in `window` from `source` into `tracker`.
///
/// The destination is listed once, over the window padded by a day on each
/// side, before any entry is created.
///
/// # Errors
///
/// Only a failed match listing or a failed destination listing abort the run.
/// Per-match failures are counted in the returned [`SyncReport`].
pub async fn sync_matches<S, T>(
    source: &S,
    tracker: &T,
    player: &PlayerIdentity,
    window: &DateWindow,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<SyncReport, SyncError>
where
    S: MatchSource + ?Sized,
    T: TimeTracker + ?Sized,
{
    tracing::info!(
        provider = %source.provider(),
        player = %player,
        start = %window.start(),
        end = %window.end(),
        "Starting sync"
    );

    let matches = source
        .list_matches_in_window(player, window, on_progress)
        .await?;

    let breakdown = queue_breakdown(&matches);
    for (queue, count) in &breakdown {
        tracing::info!(queue = %queue, count, "Queue breakdown");
    }
    emit(on_progress, SyncProgress::QueueBreakdown { queues: breakdown });

    let (from, to) = window.snapshot_range();
    let existing = tracker.list_entries(from, to).await?;
    tracing::debug!(entries = existing.len(), %from, %to, "Loaded destination snapshot");

    let report = SyncReconciler::new(tracker, options)
        .reconcile(player, &matches, &existing, on_progress)
        .await;

    tracing::info!(
        synced = report.synced,
        skipped = report.skipped,
        failed = report.failed,
        dry_run = report.dry_run,
        "Sync complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn m(id: &str, label: &str) -> CanonicalMatch {
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        CanonicalMatch::new(id, 0, label, "CLASSIC", end, 60, vec![])
    }

    #[test]
    fn queue_breakdown_sorts_by_count_then_label() {
        let matches = vec![
            m("1", "Ranked Solo/Duo"),
            m("2", "ARAM"),
            m("3", "ARAM"),
            m("4", "Arena"),
        ];
        assert_eq!(
            queue_breakdown(&matches),
            vec![
                ("ARAM".to_string(), 2),
                ("Arena".to_string(), 1),
                ("Ranked Solo/Duo".to_string(), 1),
            ]
        );
    }

    #[test]
    fn queue_breakdown_of_nothing_is_empty() {
        assert!(queue_breakdown(&[]).is_empty());
    }

    #[test]
    fn sync_error_display_names_the_failing_side() {
        let err = SyncError::from(DestinationError::NoWorkspace);
        assert!(err.to_string().starts_with("Failed to read existing time entries"));

        let err = SyncError::from(ProviderError::RetriesExhausted {
            resource: "/ids".to_string(),
            attempts: 3,
        });
        assert!(err.to_string().contains("after 3 attempts"));
    }
}
