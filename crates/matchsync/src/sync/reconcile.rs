//! Idempotent reconciliation of matches into the destination.

use std::collections::HashSet;

use thiserror::Error;

use crate::destination::{DestinationError, ExistingEntry, NewTimeEntry, TimeTracker};
use crate::provider::{CanonicalMatch, Participant, PlayerIdentity};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{SyncOptions, SyncReport};

/// Prefix shared by every match marker.
pub const MARKER_PREFIX: &str = "[Match:";

/// The idempotency marker embedded in an entry description.
pub fn match_marker(match_id: &str) -> String {
    format!("{MARKER_PREFIX}{match_id}]")
}

/// A match is already synced when any existing description contains its marker.
pub fn is_already_synced(match_id: &str, existing: &[ExistingEntry]) -> bool {
    let marker = match_marker(match_id);
    existing.iter().any(|e| e.description.contains(&marker))
}

/// Number of entries that carry any match marker.
pub fn count_marked_entries(existing: &[ExistingEntry]) -> usize {
    existing
        .iter()
        .filter(|e| e.description.contains(MARKER_PREFIX))
        .count()
}

/// `"{h}h {m}m"`, truncating seconds.
pub fn format_duration(duration_secs: u64) -> String {
    let hours = duration_secs / 3600;
    let minutes = (duration_secs % 3600) / 60;
    format!("{hours}h {minutes}m")
}

/// Entry description: result, champion, KDA, queue, duration, marker.
pub fn build_description(game: &CanonicalMatch, participant: &Participant) -> String {
    let (emoji, result) = if participant.win {
        ("✅", "Win")
    } else {
        ("❌", "Loss")
    };
    format!(
        "{emoji} {champion} - {result} ({k}/{d}/{a}) | {queue} | {duration} {marker}",
        champion = participant.champion,
        k = participant.kills,
        d = participant.deaths,
        a = participant.assists,
        queue = game.queue_label,
        duration = format_duration(game.duration_secs),
        marker = match_marker(&game.match_id),
    )
}

/// Why a single match could not be synced.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The player does not appear among the match participants.
    #[error("Player {player} not found in match {match_id}")]
    ParticipantNotFound { match_id: String, player: String },

    /// The destination rejected the new entry.
    #[error("Failed to create entry: {0}")]
    Create(#[from] DestinationError),
}

impl ReconcileError {
    /// Check if this error is a throttling response from the destination.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Create(e) if e.is_rate_limited())
    }
}

/// Outcome of reconciling a single match.
#[derive(Debug)]
pub enum MatchOutcome {
    /// An entry was created (or would be, in a dry run).
    Synced { description: String },
    /// The match is already in the destination or was seen earlier in this run.
    AlreadySynced,
    /// The match could not be synced.
    Failed(ReconcileError),
}

/// Creates one destination entry per match not yet present.
///
/// Matches are processed sequentially in the given order; a failure on one
/// match never affects the next.
pub struct SyncReconciler<'a, T: TimeTracker + ?Sized> {
    tracker: &'a T,
    options: &'a SyncOptions,
}

impl<'a, T: TimeTracker + ?Sized> SyncReconciler<'a, T> {
    pub fn new(tracker: &'a T, options: &'a SyncOptions) -> Self {
        Self { tracker, options }
    }

    /// Reconcile `matches` against the `existing` destination snapshot.
    pub async fn reconcile(
        &self,
        player: &PlayerIdentity,
        matches: &[CanonicalMatch],
        existing: &[ExistingEntry],
        on_progress: Option<&ProgressCallback>,
    ) -> SyncReport {
        let mut report = SyncReport {
            matches_found: matches.len(),
            existing_synced: count_marked_entries(existing),
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        emit(
            on_progress,
            SyncProgress::ReconcileStarted {
                total: matches.len(),
                existing_synced: report.existing_synced,
                dry_run: self.options.dry_run,
            },
        );

        let mut seen: HashSet<&str> = HashSet::with_capacity(matches.len());

        for game in matches {
            let first_in_run = seen.insert(game.match_id.as_str());
            let outcome = if !first_in_run || is_already_synced(&game.match_id, existing) {
                MatchOutcome::AlreadySynced
            } else {
                self.sync_one(player, game).await
            };

            match outcome {
                MatchOutcome::Synced { description } => {
                    report.synced += 1;
                    tracing::info!(match_id = %game.match_id, dry_run = self.options.dry_run, "Synced match");
                    emit(
                        on_progress,
                        SyncProgress::MatchSynced {
                            match_id: game.match_id.clone(),
                            description,
                        },
                    );
                    if !self.options.dry_run && !self.options.create_delay.is_zero() {
                        tokio::time::sleep(self.options.create_delay).await;
                    }
                }
                MatchOutcome::AlreadySynced => {
                    report.skipped += 1;
                    tracing::debug!(match_id = %game.match_id, "Match already synced");
                    emit(
                        on_progress,
                        SyncProgress::MatchSkipped {
                            match_id: game.match_id.clone(),
                        },
                    );
                }
                MatchOutcome::Failed(e) => {
                    report.failed += 1;
                    tracing::warn!(match_id = %game.match_id, error = %e, "Failed to sync match");
                    report.errors.push(format!("{}: {}", game.match_id, e));
                    emit(
                        on_progress,
                        SyncProgress::MatchFailed {
                            match_id: game.match_id.clone(),
                            error: e.to_string(),
                        },
                    );
                    if e.is_rate_limited() {
                        self.cooldown(on_progress).await;
                    }
                }
            }
        }

        emit(
            on_progress,
            SyncProgress::SyncComplete {
                synced: report.synced,
                skipped: report.skipped,
                failed: report.failed,
            },
        );

        report
    }

    async fn sync_one(&self, player: &PlayerIdentity, game: &CanonicalMatch) -> MatchOutcome {
        let Some(participant) = game.find_participant(player) else {
            return MatchOutcome::Failed(ReconcileError::ParticipantNotFound {
                match_id: game.match_id.clone(),
                player: player.to_string(),
            });
        };

        let description = build_description(game, participant);
        if self.options.dry_run {
            return MatchOutcome::Synced { description };
        }

        let entry = NewTimeEntry {
            start: game.start_time,
            end: game.end_time,
            billable: false,
            description,
        };

        match self.tracker.create_entry(&entry).await {
            Ok(_) => MatchOutcome::Synced {
                description: entry.description,
            },
            Err(e) => MatchOutcome::Failed(e.into()),
        }
    }

    async fn cooldown(&self, on_progress: Option<&ProgressCallback>) {
        let wait = self.options.creation_cooldown;
        emit(
            on_progress,
            SyncProgress::CreationCooldown {
                wait_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            },
        );
        tokio::time::sleep(wait).await;
    }
}
