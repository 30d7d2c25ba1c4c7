//! Shared sync types and constants.

use std::time::Duration;

/// Match identifiers requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Pause after a destination write was rejected for throttling.
pub const DEFAULT_CREATION_COOLDOWN_MS: u64 = 200;

/// Default sync window in days.
pub const DEFAULT_SYNC_DAYS: u32 = 7;

/// Result of a sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries created in this run (or that would be, in a dry run).
    pub synced: usize,
    /// Matches already present in the destination.
    pub skipped: usize,
    /// Matches that could not be synced.
    pub failed: usize,
    /// In-window matches produced by the scan.
    pub matches_found: usize,
    /// Destination entries in the snapshot that already carry a match marker.
    pub existing_synced: usize,
    /// Whether no entries were written.
    pub dry_run: bool,
    /// Errors encountered (non-fatal).
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Match entries present in the destination after the run.
    pub fn total_synced_entries(&self) -> usize {
        self.existing_synced + self.synced
    }

    /// Number of matches that were processed.
    pub fn processed(&self) -> usize {
        self.synced + self.skipped + self.failed
    }
}

/// Options for reconciling matches into the destination.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Wait after each successful creation.
    pub create_delay: Duration,
    /// Wait after a creation was rejected for throttling.
    pub creation_cooldown: Duration,
    /// Dry run mode - classify but don't create entries.
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            create_delay: Duration::ZERO,
            creation_cooldown: Duration::from_millis(DEFAULT_CREATION_COOLDOWN_MS),
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();

        assert_eq!(options.create_delay, Duration::ZERO);
        assert_eq!(options.creation_cooldown, Duration::from_millis(200));
        assert!(!options.dry_run);
    }

    #[test]
    fn test_sync_report_default() {
        let report = SyncReport::default();

        assert_eq!(report.synced, 0);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(report.processed(), 0);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_total_synced_entries_adds_existing() {
        let report = SyncReport {
            synced: 2,
            skipped: 1,
            existing_synced: 4,
            ..Default::default()
        };
        assert_eq!(report.total_synced_entries(), 6);
        assert_eq!(report.processed(), 3);
    }
}
