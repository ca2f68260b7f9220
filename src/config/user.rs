//! User configuration loading for irodori.
//!
//! User config location: $XDG_CONFIG_HOME/irodori/irodori.toml
//! Fallback: the platform config directory (`~/.config/irodori/irodori.toml` on Linux)

use super::settings::Settings;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Returns the path to the user configuration file.
///
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/irodori/irodori.toml
/// 2. Otherwise: `dirs::config_dir()`/irodori/irodori.toml
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return Some(PathBuf::from(xdg_config).join("irodori").join("irodori.toml"));
    }

    dirs::config_dir().map(|dir| dir.join("irodori").join("irodori.toml"))
}

/// Load settings from a TOML file
pub fn load_config_file(path: &Path) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the user configuration if the file exists.
///
/// A missing file is not an error; a malformed one is.
pub fn load_user_config() -> ConfigResult<Option<Settings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        log::debug!(target: "irodori::config", "No user config at {}", path.display());
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn user_config_path_uses_xdg_config_home_when_set() {
        let original = env::var("XDG_CONFIG_HOME").ok();

        // SAFETY: serialised with the other env-mutating tests
        unsafe {
            env::set_var("XDG_CONFIG_HOME", "/custom/config");
        }

        let path = user_config_path();

        // SAFETY: restoring original env state
        unsafe {
            match original {
                Some(val) => env::set_var("XDG_CONFIG_HOME", val),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }

        assert_eq!(
            path,
            Some(PathBuf::from("/custom/config/irodori/irodori.toml")),
            "should use XDG_CONFIG_HOME/irodori/irodori.toml"
        );
    }

    #[test]
    #[serial]
    fn load_user_config_reads_file_under_xdg_config_home() {
        let dir = tempdir().unwrap();
        let config_dir = dir.path().join("irodori");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("irodori.toml"),
            "[languages.lua]\nfiletypes = [\"lua\"]\n",
        )
        .unwrap();

        let original = env::var("XDG_CONFIG_HOME").ok();
        // SAFETY: serialised with the other env-mutating tests
        unsafe {
            env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let loaded = load_user_config();

        // SAFETY: restoring original env state
        unsafe {
            match original {
                Some(val) => env::set_var("XDG_CONFIG_HOME", val),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }

        let settings = loaded.unwrap().expect("config file should be found");
        assert_eq!(settings.languages["lua"].filetypes, vec!["lua"]);
    }

    #[test]
    fn load_config_file_reports_parse_errors_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "languages = 3").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
