//! Path resolution for stackgen
//!
//! # Config File Resolution Priority
//!
//! 1. `--config <path>` flag, or the `STACKGEN_CONFIG` environment variable
//!    (clap reads both into the same argument)
//! 2. `./stack.toml` in the current directory
//! 3. `<platform config dir>/stackgen/stack.toml`
//!    - Linux: `$XDG_CONFIG_HOME/stackgen` or `~/.config/stackgen`
//!    - macOS: `~/Library/Application Support/stackgen`
//!    - Windows: `%APPDATA%\stackgen`
//! 4. None; built-in defaults apply

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "STACKGEN_CONFIG";

/// Config file name looked up in the working and config directories
pub const CONFIG_FILE: &str = "stack.toml";

/// Expand `~` and `$VARS` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            log::debug!("Could not expand {path}: {e}");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}

/// Platform config directory for stackgen
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("stackgen"))
}

/// Locate the config file, if any
///
/// An explicitly requested file must exist; the implicit locations are
/// skipped when missing.
pub fn config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    resolve_config_file(explicit, &cwd, config_dir().as_deref())
}

fn resolve_config_file(
    explicit: Option<&Path>,
    cwd: &Path,
    config_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = expand_path(&path.to_string_lossy());
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }
        log::debug!("Using config file {}", path.display());
        return Ok(Some(path));
    }

    let local = cwd.join(CONFIG_FILE);
    if local.is_file() {
        log::debug!("Using config file from working directory: {}", local.display());
        return Ok(Some(local));
    }

    if let Some(dir) = config_dir {
        let global = dir.join(CONFIG_FILE);
        if global.is_file() {
            log::debug!("Using config file from config dir: {}", global.display());
            return Ok(Some(global));
        }
    }

    log::debug!("No {CONFIG_FILE} found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/stacks/stack.toml");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("stacks/stack.toml"));
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("./infra"), PathBuf::from("./infra"));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let cwd = TempDir::new().unwrap();
        let missing = cwd.path().join("nope.toml");
        assert!(resolve_config_file(Some(&missing), cwd.path(), None).is_err());

        fs::write(&missing, "").unwrap();
        assert_eq!(
            resolve_config_file(Some(&missing), cwd.path(), None).unwrap(),
            Some(missing)
        );
    }

    #[test]
    fn test_working_directory_wins_over_config_dir() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join(CONFIG_FILE), "").unwrap();

        let found = resolve_config_file(None, cwd.path(), Some(global.path())).unwrap();
        assert_eq!(found, Some(global.path().join(CONFIG_FILE)));

        fs::write(cwd.path().join(CONFIG_FILE), "").unwrap();
        let found = resolve_config_file(None, cwd.path(), Some(global.path())).unwrap();
        assert_eq!(found, Some(cwd.path().join(CONFIG_FILE)));
    }

    #[test]
    fn test_nothing_found() {
        let cwd = TempDir::new().unwrap();
        assert_eq!(resolve_config_file(None, cwd.path(), None).unwrap(), None);
    }
}
