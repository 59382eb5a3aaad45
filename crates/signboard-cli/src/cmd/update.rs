use crate::cmd::show::print_record;
use crate::output::print_json;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use signboard_core::config::Config;
use signboard_core::record::{IncidentUpdate, Store};
use signboard_core::render;
use signboard_core::types::Reason;
use std::path::Path;

pub fn run(
    root: &Path,
    incident: String,
    date: NaiveDate,
    reason: Reason,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = Store::for_root(root, &config);
    let mut record = store.load().context("failed to load incident record")?;

    let now = Local::now().naive_local();
    record.apply_update(
        IncidentUpdate {
            incident_number: incident,
            incident_date: date,
            reason,
        },
        now,
    );
    store.save(&record).context("failed to save incident record")?;
    let record = render::generate_sign(root, &config, now.date()).context("failed to render sign")?;

    if json {
        return print_json(&record);
    }
    print_record(&record);
    Ok(())
}
