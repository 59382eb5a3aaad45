use crate::config::DisplayTarget;
use crate::error::{Result, SignError};
use crate::pack::{self, PackedFrame};
use reqwest::blocking::{multipart, Client};
use reqwest::header::CONNECTION;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Something that accepts a packed frame and shows it.
pub trait Panel: Send + Sync {
    /// Short description for logs, e.g. the upload URL.
    fn describe(&self) -> String;

    fn send(&self, frame: &PackedFrame) -> Result<()>;
}

/// Build the panel for `target`. Returns `None` when pushing is disabled.
pub fn panel_for(target: &DisplayTarget) -> Result<Option<Box<dyn Panel>>> {
    match target {
        DisplayTarget::Http { url, timeout_secs } => Ok(Some(Box::new(HttpPanel::new(
            url.clone(),
            Duration::from_secs(*timeout_secs),
        )?))),
        DisplayTarget::Local { device } => Ok(Some(Box::new(LocalPanel::new(device.clone())))),
        DisplayTarget::None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// HttpPanel
// ---------------------------------------------------------------------------

/// Networked panel service that takes the frame as a multipart file upload.
pub struct HttpPanel {
    url: String,
    client: Client,
}

impl HttpPanel {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl Panel for HttpPanel {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn send(&self, frame: &PackedFrame) -> Result<()> {
        let part = multipart::Part::bytes(frame.as_bytes().to_vec())
            .file_name("sign.bin")
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .header(CONNECTION, "keep-alive")
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignError::DisplayStatus(status.as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LocalPanel
// ---------------------------------------------------------------------------

/// Panel attached to this machine, driven through the device node its driver
/// exposes. The node must already exist.
pub struct LocalPanel {
    device: PathBuf,
}

impl LocalPanel {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl Panel for LocalPanel {
    fn describe(&self) -> String {
        self.device.display().to_string()
    }

    fn send(&self, frame: &PackedFrame) -> Result<()> {
        let mut dev = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.device)
            .map_err(|e| SignError::Transport(format!("{}: {e}", self.device.display())))?;
        dev.write_all(frame.as_bytes())?;
        dev.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pushing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Sent { bytes: usize },
    /// No panel configured.
    Skipped,
    Failed(String),
}

impl PushOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, PushOutcome::Sent { .. })
    }
}

/// Send an already packed frame. Failures are logged and reported in the
/// outcome, never returned as errors.
pub fn push_frame(frame: &PackedFrame, panel: Option<&dyn Panel>) -> PushOutcome {
    let Some(panel) = panel else {
        tracing::info!("no display configured, skipping push");
        return PushOutcome::Skipped;
    };

    tracing::info!(target_panel = %panel.describe(), bytes = frame.len(), "sending frame to display");
    match panel.send(frame) {
        Ok(()) => {
            tracing::info!(target_panel = %panel.describe(), "display accepted frame");
            PushOutcome::Sent { bytes: frame.len() }
        }
        Err(e) => {
            tracing::error!(target_panel = %panel.describe(), error = %e, "display push failed");
            PushOutcome::Failed(e.to_string())
        }
    }
}

/// Pack the image at `path` and send it. When the image cannot be opened
/// nothing is converted or transmitted.
pub fn push_image(path: &Path, panel: Option<&dyn Panel>) -> PushOutcome {
    tracing::info!(path = %path.display(), "converting image for display");
    match pack::pack_file(path) {
        Ok(frame) => push_frame(&frame, panel),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "could not convert image");
            PushOutcome::Failed(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
