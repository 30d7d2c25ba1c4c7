use matchsync::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchingPage { start, count } => {
                tracing::debug!(start, count, "Fetching match page");
            }

            SyncProgress::FetchedPage {
                page,
                count,
                in_window_so_far,
            } => {
                tracing::debug!(page, count, in_window_so_far, "Fetched page");
            }

            SyncProgress::MatchFetchFailed { match_id, error } => {
                tracing::warn!(match_id = %match_id, error = %error, "Failed to fetch match");
            }

            SyncProgress::RateLimitBackoff {
                resource,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(resource = %resource, retry_after_ms, attempt, "Rate limited, backing off");
            }

            SyncProgress::EarlyStop { page } => {
                tracing::debug!(page, "Reached matches older than the window");
            }

            SyncProgress::ScanComplete { total } => {
                tracing::info!(total, "Scan complete");
            }

            SyncProgress::QueueBreakdown { queues } => {
                for (queue, count) in queues {
                    tracing::info!(queue = %queue, count, "Matches by queue");
                }
            }

            SyncProgress::ReconcileStarted {
                total,
                existing_synced,
                dry_run,
            } => {
                tracing::info!(total, existing_synced, dry_run, "Reconciling matches");
            }

            SyncProgress::MatchSynced {
                match_id,
                description,
            } => {
                tracing::info!(match_id = %match_id, description = %description, "Synced");
            }

            SyncProgress::MatchSkipped { match_id } => {
                tracing::debug!(match_id = %match_id, "Already synced");
            }

            SyncProgress::MatchFailed { match_id, error } => {
                tracing::error!(match_id = %match_id, error = %error, "Failed to sync");
            }

            SyncProgress::CreationCooldown { wait_ms } => {
                tracing::debug!(wait_ms, "Creation throttled, cooling down");
            }

            SyncProgress::SyncComplete {
                synced,
                skipped,
                failed,
            } => {
                tracing::info!(synced, skipped, failed, "Sync complete");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
