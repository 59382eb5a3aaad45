use std::path::PathBuf;

/// Shared application state passed to all route handlers.
///
/// Config and record are re-read on every request so edits made through the
/// CLI or by hand show up without a restart.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}
