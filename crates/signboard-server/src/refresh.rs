use chrono::Local;
use signboard_core::config::Config;
use signboard_core::display::{self, PushOutcome};
use signboard_core::refresh::{RefreshReport, Refresher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Spawn the background refresh loop. The first tick fires one period after
/// startup. Returns `None` when `interval_secs` is 0.
pub fn spawn(root: PathBuf, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("background refresh disabled");
        return None;
    }

    let period = Duration::from_secs(interval_secs);
    tracing::info!(interval_secs, "background refresh enabled");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refresher = Refresher::new();

        loop {
            ticker.tick().await;
            let root = root.clone();
            let joined = tokio::task::spawn_blocking(move || {
                let result = tick(&root, &mut refresher);
                (refresher, result)
            })
            .await;

            match joined {
                Ok((r, result)) => {
                    refresher = r;
                    log_tick(result);
                }
                Err(e) => {
                    tracing::error!(error = %e, "refresh task join error");
                    refresher = Refresher::new();
                }
            }
        }
    }))
}

/// One refresh cycle with the current on-disk config.
pub fn tick(root: &Path, refresher: &mut Refresher) -> signboard_core::Result<RefreshReport> {
    let config = Config::load(root)?;
    let panel = if config.display.auto_push {
        display::panel_for(&config.display.target)?
    } else {
        None
    };
    refresher.run_once(root, &config, Local::now().date_naive(), panel.as_deref())
}

fn log_tick(result: signboard_core::Result<RefreshReport>) {
    match result {
        Ok(report) => {
            tracing::info!(
                days_since = report.record.days_since,
                prior_count = report.record.prior_count,
                "sign refreshed"
            );
            if let Some(PushOutcome::Failed(e)) = report.push {
                tracing::warn!(error = %e, "auto push failed, will retry next tick");
            }
        }
        Err(e) => tracing::error!(error = %e, "refresh failed"),
    }
}
