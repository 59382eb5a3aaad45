use signboard_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the sign's root directory.
///
/// Priority:
/// 1. `--root` flag / `SIGNBOARD_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `signboard.yaml`
/// 3. Walk upward from `cwd` looking for `data.json`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, paths::CONFIG_FILE)
        .or_else(|| find_upward(&cwd, paths::DATA_FILE))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("signboard.yaml"), "version: 1\n").unwrap();
        let subdir = dir.path().join("static/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir, paths::CONFIG_FILE).as_deref(), Some(dir.path()));
    }

    #[test]
    fn marker_must_be_a_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data.json")).unwrap();
        assert_eq!(find_upward(dir.path(), paths::DATA_FILE), None);
    }
}
