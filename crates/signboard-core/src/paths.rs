use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "signboard.yaml";
pub const DATA_FILE: &str = "data.json";
pub const BACKGROUND_IMAGE: &str = "static/background.png";
pub const OUTPUT_IMAGE: &str = "static/current_sign.png";
pub const DEFAULT_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against the project root. Absolute paths are
/// returned unchanged.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/srv/sign");
        assert_eq!(
            config_path(root),
            PathBuf::from("/srv/sign/signboard.yaml")
        );
        assert_eq!(
            resolve(root, Path::new(DATA_FILE)),
            PathBuf::from("/srv/sign/data.json")
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        let root = Path::new("/srv/sign");
        assert_eq!(
            resolve(root, Path::new(DEFAULT_FONT)),
            PathBuf::from(DEFAULT_FONT)
        );
    }
}
