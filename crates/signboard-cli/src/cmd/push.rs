use crate::output::print_json;
use anyhow::{bail, Context};
use chrono::Local;
use serde::Serialize;
use signboard_core::config::Config;
use signboard_core::display::{self, PushOutcome};
use signboard_core::render;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct PushReport {
    image: PathBuf,
    sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(root: &Path, image: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let image = match image {
        Some(path) => path,
        None => {
            let output = config.output_path(root);
            if !output.exists() {
                render::generate_sign(root, &config, Local::now().date_naive())
                    .context("failed to render sign")?;
            }
            output
        }
    };

    let panel = display::panel_for(&config.display.target).context("failed to set up display")?;
    let outcome = display::push_image(&image, panel.as_deref());

    let report = PushReport {
        image,
        sent: outcome.is_sent(),
        bytes: match &outcome {
            PushOutcome::Sent { bytes } => Some(*bytes),
            _ => None,
        },
        error: match &outcome {
            PushOutcome::Failed(e) => Some(e.clone()),
            PushOutcome::Skipped => Some("no display configured".to_string()),
            PushOutcome::Sent { .. } => None,
        },
    };

    if json {
        print_json(&report)?;
    } else if report.sent {
        println!("Sent {} to display", report.image.display());
    }

    if let Some(e) = report.error {
        bail!("sign was not sent: {e}");
    }
    Ok(())
}
