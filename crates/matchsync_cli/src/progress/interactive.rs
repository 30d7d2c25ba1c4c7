use std::sync::Mutex;
use std::time::Duration;

use console::style;
#[cfg(test)]
use indicatif::ProgressDrawTarget;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use matchsync::sync::SyncProgress;

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Spinner while the provider lists matches.
    scan_bar: Option<ProgressBar>,
    /// One tick per reconciled match.
    sync_bar: Option<ProgressBar>,
    dry_run: bool,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// Reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn scan_bar(&self, state: &mut ProgressState) -> ProgressBar {
        state
            .scan_bar
            .get_or_insert_with(|| {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.set_prefix("scan");
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            })
            .clone()
    }

    fn println(&self, line: String) {
        self.multi.println(line).ok();
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            SyncProgress::FetchingPage { start, count } => {
                let bar = self.scan_bar(&mut state);
                bar.set_message(format!("fetching matches {}..{}", start, start + count));
            }

            SyncProgress::FetchedPage {
                page,
                in_window_so_far,
                ..
            } => {
                let bar = self.scan_bar(&mut state);
                bar.set_message(format!("page {page}, {in_window_so_far} in window"));
            }

            SyncProgress::MatchFetchFailed { match_id, error } => {
                self.println(format!(
                    "{} {} {}",
                    style("!").yellow(),
                    match_id,
                    style(error).dim()
                ));
            }

            SyncProgress::RateLimitBackoff {
                resource,
                retry_after_ms,
                attempt,
            } => {
                if let Some(bar) = state.scan_bar.as_ref().or(state.sync_bar.as_ref()) {
                    bar.set_message(format!(
                        "rate limited on {resource}, retrying in {}s (attempt {attempt})",
                        retry_after_ms / 1000
                    ));
                }
            }

            SyncProgress::ScanComplete { total } => {
                let bar = self.scan_bar(&mut state);
                bar.set_style(Self::done_style());
                bar.finish_with_message(format!("{total} matches in window"));
            }

            SyncProgress::QueueBreakdown { queues } => {
                for (queue, count) in queues {
                    self.println(format!("  {:>3}  {}", count, queue));
                }
            }

            SyncProgress::ReconcileStarted { total, dry_run, .. } => {
                state.dry_run = dry_run;
                let bar = self.multi.add(ProgressBar::new(total as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix(if dry_run { "dry run" } else { "sync" });
                state.sync_bar = Some(bar);
            }

            SyncProgress::MatchSynced { description, .. } => {
                let marker = if state.dry_run { "~" } else { "+" };
                self.println(format!("{} {}", style(marker).green(), description));
                if let Some(bar) = &state.sync_bar {
                    bar.inc(1);
                }
            }

            SyncProgress::MatchSkipped { match_id } => {
                if let Some(bar) = &state.sync_bar {
                    bar.set_message(format!("{match_id} already synced"));
                    bar.inc(1);
                }
            }

            SyncProgress::MatchFailed { match_id, error } => {
                self.println(format!("{} {} {}", style("x").red(), match_id, style(error).dim()));
                if let Some(bar) = &state.sync_bar {
                    bar.inc(1);
                }
            }

            SyncProgress::CreationCooldown { wait_ms } => {
                if let Some(bar) = &state.sync_bar {
                    bar.set_message(format!("throttled, cooling down {wait_ms}ms"));
                }
            }

            SyncProgress::SyncComplete {
                synced,
                skipped,
                failed,
            } => {
                if let Some(bar) = &state.sync_bar {
                    bar.finish_with_message(format!(
                        "{synced} synced, {skipped} skipped, {failed} failed"
                    ));
                }
            }

            SyncProgress::Warning { message } => {
                self.println(format!("{} {}", style("warning:").yellow().bold(), message));
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for bar in [&state.scan_bar, &state.sync_bar].into_iter().flatten() {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn done_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
