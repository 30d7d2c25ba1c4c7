use std::sync::Arc;

use chrono::Utc;
use console::{Term, style};
use matchsync::clockify::{CLOCKIFY_API_BASE, ClockifyClient};
use matchsync::{DateWindow, SyncReport, sync_matches};

use crate::SyncArgs;
use crate::config::{Config, Provider};
use crate::progress::ProgressReporter;

/// Errors shown individually before the rest are summarized.
const MAX_DISPLAYED_ERRORS: usize = 10;

/// Run one sync from `provider` into Clockify and print the summary.
pub(crate) async fn handle_sync(
    provider: Provider,
    args: SyncArgs,
    mut config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(days) = args.days {
        config.sync.days = days;
    }
    config.validate_for(provider)?;

    let is_tty = Term::stdout().is_term();
    let window = DateWindow::last_days(config.sync.days, Utc::now());
    let player = config.player_identity();
    let options = config.sync_options(args.dry_run);

    if is_tty {
        println!(
            "Syncing {} matches for {} from {} to {}{}\n",
            provider,
            style(&player).bold(),
            window.start().format("%Y-%m-%d"),
            window.end().format("%Y-%m-%d"),
            if args.dry_run { " (dry run)" } else { "" }
        );
    } else {
        tracing::info!(
            provider = %provider,
            player = %player,
            days = config.sync.days,
            dry_run = args.dry_run,
            "Starting sync"
        );
    }

    let tracker = ClockifyClient::connect(
        config.clockify.base_url.as_deref().unwrap_or(CLOCKIFY_API_BASE),
        config.clockify.api_token.as_deref().unwrap_or_default(),
        config.clockify.project_name.as_deref(),
    )
    .await?;
    tracing::debug!(
        workspace = tracker.workspace_id(),
        project = ?tracker.project_id(),
        "Connected to Clockify"
    );

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let on_progress = Some(&*callback);

    let result = match provider {
        #[cfg(feature = "riot")]
        Provider::Riot => {
            use matchsync::ApiRateLimiter;
            use matchsync::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
            use matchsync::riot::{RIOT_EUROPE_API_BASE, RiotClient};

            let source = RiotClient::new_with_transport(
                Arc::new(ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)?),
                config.riot.base_url.as_deref().unwrap_or(RIOT_EUROPE_API_BASE),
                config.riot.api_key.as_deref().unwrap_or_default(),
                ApiRateLimiter::default(),
                config.retry_config(),
            )
            .with_page_size(config.sync.page_size);
            sync_matches(&source, &tracker, &player, &window, &options, on_progress).await
        }
        #[cfg(feature = "opgg")]
        Provider::Opgg => {
            use matchsync::ApiRateLimiter;
            use matchsync::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
            use matchsync::opgg::{OPGG_MCP_ENDPOINT, OpggClient};

            let source = OpggClient::new_with_transport(
                Arc::new(ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)?),
                config.opgg.endpoint.as_deref().unwrap_or(OPGG_MCP_ENDPOINT),
                &config.opgg.region,
                ApiRateLimiter::default(),
                config.retry_config(),
            );
            let result = sync_matches(&source, &tracker, &player, &window, &options, on_progress).await;
            if let Err(e) = source.disconnect().await {
                tracing::debug!(error = %e, "Failed to close OP.GG session");
            }
            result
        }
        #[cfg(feature = "lcu")]
        Provider::Lcu => {
            use matchsync::lcu::{LcuClient, default_lockfile_path};

            let lockfile = config.lcu.lockfile.clone().unwrap_or_else(default_lockfile_path);
            let source = LcuClient::from_lockfile(&lockfile, &config.lcu.platform_id)?
                .with_match_count(config.lcu.match_count);
            sync_matches(&source, &tracker, &player, &window, &options, on_progress).await
        }
        #[allow(unreachable_patterns)]
        _ => {
            return Err(format!("{provider} support was not compiled into this build").into());
        }
    };

    reporter.finish();
    let report = result?;
    print_report(&report, is_tty);

    Ok(())
}

fn print_report(report: &SyncReport, is_tty: bool) {
    if !is_tty {
        tracing::info!(
            synced = report.synced,
            skipped = report.skipped,
            failed = report.failed,
            matches_found = report.matches_found,
            total_synced_entries = report.total_synced_entries(),
            dry_run = report.dry_run,
            "Sync finished"
        );
        for error in report.errors.iter().take(MAX_DISPLAYED_ERRORS) {
            tracing::error!(error = %error, "Match not synced");
        }
        return;
    }

    let synced_label = if report.dry_run {
        "Would sync:"
    } else {
        "Newly synced:"
    };

    println!();
    println!("{}", style("Sync summary").bold());
    println!("  {:<22} {}", "Matches in window:", report.matches_found);
    println!("  {:<22} {}", synced_label, style(report.synced).green());
    println!("  {:<22} {}", "Already existed:", report.skipped);
    if report.failed > 0 {
        println!("  {:<22} {}", "Failed:", style(report.failed).red());
    } else {
        println!("  {:<22} {}", "Failed:", report.failed);
    }
    println!("  {:<22} {}", "Total synced entries:", report.total_synced_entries());

    if !report.errors.is_empty() {
        let total_errors = report.errors.len();
        eprintln!();
        eprintln!("{}", style(format!("Errors ({total_errors} total):")).yellow().bold());
        for error in report.errors.iter().take(MAX_DISPLAYED_ERRORS) {
            eprintln!("  - {error}");
        }
        if total_errors > MAX_DISPLAYED_ERRORS {
            eprintln!("  ... and {} more errors", total_errors - MAX_DISPLAYED_ERRORS);
        }
    }
}
