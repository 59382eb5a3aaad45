use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid reason '{0}': expected Change, Deploy or Missed")]
    InvalidReason(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("font could not be loaded: {0}")]
    Font(String),

    #[error("display rejected frame: HTTP {0}")]
    DisplayStatus(u16),

    #[error("display transport failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SignError>;
