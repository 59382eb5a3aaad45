use crate::output::{print_fields, print_json};
use anyhow::Context;
use chrono::Local;
use signboard_core::config::Config;
use signboard_core::record::{IncidentRecord, Store};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let record = Store::for_root(root, &config)
        .load()
        .context("failed to load incident record")?
        .refreshed(Local::now().date_naive());

    if json {
        return print_json(&record);
    }
    print_record(&record);
    Ok(())
}

pub fn print_record(record: &IncidentRecord) {
    print_fields(&[
        ("Days since incident", record.days_since.to_string()),
        ("Prior count", record.prior_count.to_string()),
        (
            "Incident",
            format!("#{} ({})", record.incident_number, record.reason),
        ),
        (
            "Incident date",
            record
                .incident_date
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
        ),
        (
            "Last reset",
            record
                .last_reset
                .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        ),
    ]);
}
