use crate::output::print_json;
use anyhow::Context;
use chrono::Local;
use signboard_core::config::Config;
use signboard_core::render;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let record = render::generate_sign(root, &config, Local::now().date_naive())
        .context("failed to render sign")?;
    let output = config.output_path(root);

    if json {
        return print_json(&serde_json::json!({
            "path": output,
            "days_since": record.days_since,
            "prior_count": record.prior_count,
        }));
    }
    println!("Rendered {} ({} days)", output.display(), record.days_since);
    Ok(())
}
