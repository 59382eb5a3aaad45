use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// FilesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_data_file")]
    pub data: PathBuf,
    #[serde(default = "default_background")]
    pub background: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_font")]
    pub font: PathBuf,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(paths::DATA_FILE)
}

fn default_background() -> PathBuf {
    PathBuf::from(paths::BACKGROUND_IMAGE)
}

fn default_output() -> PathBuf {
    PathBuf::from(paths::OUTPUT_IMAGE)
}

fn default_font() -> PathBuf {
    PathBuf::from(paths::DEFAULT_FONT)
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            data: default_data_file(),
            background: default_background(),
            output: default_output(),
            font: default_font(),
        }
    }
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

/// Font sizes and anchor positions for each text layer on the sign, in
/// background-image pixels. Every field falls back to the stock sign layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub days_font_size: f32,
    pub prior_font_size: f32,
    pub incident_font_size: f32,
    pub checkmark_font_size: f32,

    pub days_y: i32,
    pub days_x_offset: i32,

    pub prior_x: i32,
    pub prior_y: i32,

    pub incident_x_offset: i32,
    pub incident_y: i32,

    pub checkmark_x: i32,
    pub checkmark_change_y: i32,
    pub checkmark_deploy_y: i32,
    pub checkmark_missed_y: i32,

    /// Size of the blank canvas used when the background cannot be opened.
    pub fallback_width: u32,
    pub fallback_height: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            days_font_size: 400.0,
            prior_font_size: 150.0,
            incident_font_size: 100.0,
            checkmark_font_size: 80.0,
            days_y: 160,
            days_x_offset: 0,
            prior_x: 220,
            prior_y: 630,
            incident_x_offset: 70,
            incident_y: 650,
            checkmark_x: 940,
            checkmark_change_y: 575,
            checkmark_deploy_y: 645,
            checkmark_missed_y: 705,
            fallback_width: 1100,
            fallback_height: 800,
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayTarget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayTarget {
    /// Networked panel service accepting a multipart upload.
    Http {
        #[serde(default = "default_display_url")]
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Device node exposed by the local panel driver.
    Local { device: PathBuf },
    None,
}

fn default_display_url() -> String {
    "http://192.168.86.120:5000/display/binary".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for DisplayTarget {
    fn default() -> Self {
        Self::Http {
            url: default_display_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub target: DisplayTarget,
    /// Push to the panel from the refresh loop when the frame changes.
    #[serde(default)]
    pub auto_push: bool,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between background refresh ticks; 0 disables the loop.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_port() -> u16 {
    5001
}

fn default_refresh_interval() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            files: FilesConfig::default(),
            layout: LayoutConfig::default(),
            display: DisplayConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load `signboard.yaml` from `root`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn data_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.files.data)
    }

    pub fn background_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.files.background)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.files.output)
    }

    pub fn font_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.files.font)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.display.auto_push && self.display.target == DisplayTarget::None {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "display.auto_push is set but display.target is none".to_string(),
            });
        }

        if self.display.auto_push && self.server.refresh_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "display.auto_push has no effect with refresh_interval_secs = 0"
                    .to_string(),
            });
        }

        if let DisplayTarget::Http { url, timeout_secs } = &self.display.target {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("display url '{url}' must start with http:// or https://"),
                });
            }
            if *timeout_secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: "display timeout_secs = 0 will fail every push".to_string(),
                });
            }
        }

        let sizes = [
            self.layout.days_font_size,
            self.layout.prior_font_size,
            self.layout.incident_font_size,
            self.layout.checkmark_font_size,
        ];
        if sizes.iter().any(|s| *s <= 0.0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "layout font sizes must be positive".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
