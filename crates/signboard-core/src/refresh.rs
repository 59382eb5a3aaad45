use crate::config::Config;
use crate::display::{self, Panel, PushOutcome};
use crate::error::Result;
use crate::pack::{self, PackedFrame};
use crate::record::{IncidentRecord, Store};
use crate::render;
use chrono::NaiveDate;
use std::path::Path;

/// What one refresh cycle did.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub record: IncidentRecord,
    /// `None` when no push was attempted (auto push off, or frame unchanged).
    pub push: Option<PushOutcome>,
}

/// State carried between refresh cycles.
#[derive(Debug, Default)]
pub struct Refresher {
    last_pushed: Option<PackedFrame>,
}

impl Refresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and persist the counters, re-render the sign and, when auto
    /// push is on, send it to the panel if the frame changed since the last
    /// successful push.
    pub fn run_once(
        &mut self,
        root: &Path,
        config: &Config,
        today: NaiveDate,
        panel: Option<&dyn Panel>,
    ) -> Result<RefreshReport> {
        let store = Store::for_root(root, config);
        let mut record = store.load()?;
        let before = record.clone();
        record.advance_manual_counter(today);
        record.refresh(today);
        if record != before || !store.exists() {
            store.save(&record)?;
        }

        let record = render::generate_sign(root, config, today)?;

        if !config.display.auto_push {
            return Ok(RefreshReport { record, push: None });
        }

        let Some(panel) = panel else {
            tracing::debug!("no display configured, skipping auto push");
            return Ok(RefreshReport {
                record,
                push: Some(PushOutcome::Skipped),
            });
        };

        let frame = match pack::pack_file(&config.output_path(root)) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "could not convert rendered sign");
                return Ok(RefreshReport {
                    record,
                    push: Some(PushOutcome::Failed(e.to_string())),
                });
            }
        };

        if self.last_pushed.as_ref() == Some(&frame) {
            tracing::debug!("frame unchanged since last push");
            return Ok(RefreshReport { record, push: None });
        }

        let outcome = display::push_frame(&frame, Some(panel));
        if outcome.is_sent() {
            self.last_pushed = Some(frame);
        }
        Ok(RefreshReport {
            record,
            push: Some(outcome),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayTarget, FilesConfig};
    use crate::display::LocalPanel;
    use crate::pack::FRAME_BYTES;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn config(dir: &TempDir, auto_push: bool) -> Config {
        let mut cfg = Config {
            files: FilesConfig {
                font: dir.path().join("no-font.ttf"),
                ..FilesConfig::default()
            },
            ..Config::default()
        };
        cfg.display.auto_push = auto_push;
        cfg.display.target = DisplayTarget::Local {
            device: dir.path().join("epd0"),
        };
        cfg
    }

    #[test]
    fn persists_refreshed_counters() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, false);
        let report = Refresher::new()
            .run_once(dir.path(), &cfg, date(20), None)
            .unwrap();

        assert_eq!(report.record.days_since, 17);
        assert!(report.push.is_none());
        let stored = Store::for_root(dir.path(), &cfg).load().unwrap();
        assert_eq!(stored.days_since, 17);
        assert!(cfg.output_path(dir.path()).exists());
    }

    #[test]
    fn manual_counter_increments_across_days() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, false);
        let store = Store::for_root(dir.path(), &cfg);
        let mut record = store.load().unwrap();
        record.incident_date = None;
        record.days_since = 3;
        store.save(&record).unwrap();

        let mut refresher = Refresher::new();
        refresher.run_once(dir.path(), &cfg, date(10), None).unwrap();
        refresher.run_once(dir.path(), &cfg, date(10), None).unwrap();
        let report = refresher.run_once(dir.path(), &cfg, date(12), None).unwrap();

        assert_eq!(report.record.days_since, 5);
        assert_eq!(store.load().unwrap().days_since, 5);
    }

    #[test]
    fn auto_push_sends_only_changed_frames() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, true);
        let device = dir.path().join("epd0");
        std::fs::write(&device, b"").unwrap();
        let panel = LocalPanel::new(&device);

        let mut refresher = Refresher::new();
        let first = refresher
            .run_once(dir.path(), &cfg, date(20), Some(&panel))
            .unwrap();
        assert_eq!(first.push, Some(PushOutcome::Sent { bytes: FRAME_BYTES }));

        let same_day = refresher
            .run_once(dir.path(), &cfg, date(20), Some(&panel))
            .unwrap();
        assert!(same_day.push.is_none());

        let next_day = refresher
            .run_once(dir.path(), &cfg, date(21), Some(&panel))
            .unwrap();
        assert!(next_day.push.as_ref().is_some_and(PushOutcome::is_sent));
    }

    #[test]
    fn failed_push_is_retried_next_cycle() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, true);
        let device = dir.path().join("epd0");
        let panel = LocalPanel::new(&device);

        let mut refresher = Refresher::new();
        let failed = refresher
            .run_once(dir.path(), &cfg, date(20), Some(&panel))
            .unwrap();
        assert!(matches!(failed.push, Some(PushOutcome::Failed(_))));

        std::fs::write(&device, b"").unwrap();
        let retried = refresher
            .run_once(dir.path(), &cfg, date(20), Some(&panel))
            .unwrap();
        assert!(retried.push.as_ref().is_some_and(PushOutcome::is_sent));
    }

    #[test]
    fn auto_push_without_panel_skips_conversion() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir, true);
        cfg.display.target = DisplayTarget::None;
        // An undecodable sign would fail conversion if it were attempted.
        std::fs::create_dir_all(dir.path().join("static")).unwrap();
        cfg.files.output = dir.path().join("static/sign.txt");

        let report = Refresher::new()
            .run_once(dir.path(), &cfg, date(20), None)
            .unwrap();
        assert_eq!(report.push, Some(PushOutcome::Skipped));
    }
}
