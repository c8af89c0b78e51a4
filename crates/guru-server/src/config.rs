//! Configuration file management for guru.
//!
//! Provides a TOML-based config file at `~/.config/guru/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default. The API key
//! is the only value without a default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use guru_core::generator::DEFAULT_MODEL;

/// Default address the HTTP server binds to.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub gemini: GeminiSection,
    pub server: ServerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiSection {
    /// Google AI Studio API key. An empty string counts as unset.
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    pub listen: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the guru config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/guru` or `~/.config/guru`.
/// We intentionally ignore the platform-specific `dirs::config_dir()`
/// (which returns `~/Library/Application Support` on macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("guru");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("guru")
}

/// Return the path to the guru config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix (the file holds the API key).
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // Set permissions to 0600 (owner read/write only) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct GuruConfig {
    pub api_key: String,
    pub model: String,
    pub listen: String,
}

impl GuruConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `cli_api_key` > `GURU_API_KEY` env > `GEMINI_API_KEY` env >
    ///   `config_file.gemini.api_key` > error
    /// - Model: `cli_model` > `GURU_MODEL` env > `config_file.gemini.model` >
    ///   [`DEFAULT_MODEL`]
    /// - Listen address: `cli_listen` > `GURU_LISTEN` env >
    ///   `config_file.server.listen` > [`DEFAULT_LISTEN`]
    pub fn resolve(
        cli_api_key: Option<&str>,
        cli_model: Option<&str>,
        cli_listen: Option<&str>,
    ) -> Result<Self> {
        let file_config = load_config().ok();

        // Empty strings count as unset at every step of every chain.
        let api_key = if let Some(key) = cli_api_key.filter(|k| !k.is_empty()) {
            key.to_string()
        } else if let Some(key) = env_nonempty("GURU_API_KEY") {
            key
        } else if let Some(key) = env_nonempty("GEMINI_API_KEY") {
            key
        } else if let Some(key) = file_config
            .as_ref()
            .map(|cfg| cfg.gemini.api_key.clone())
            .filter(|k| !k.is_empty())
        {
            key
        } else {
            bail!(
                "Gemini API key not found; set GURU_API_KEY (or GEMINI_API_KEY) or run `guru init` to create a config file"
            );
        };

        let model = if let Some(model) = cli_model.filter(|m| !m.is_empty()) {
            model.to_string()
        } else if let Some(model) = env_nonempty("GURU_MODEL") {
            model
        } else if let Some(model) = file_config
            .as_ref()
            .map(|cfg| cfg.gemini.model.clone())
            .filter(|m| !m.is_empty())
        {
            model
        } else {
            DEFAULT_MODEL.to_string()
        };

        let listen = if let Some(listen) = cli_listen.filter(|l| !l.is_empty()) {
            listen.to_string()
        } else if let Some(listen) = env_nonempty("GURU_LISTEN") {
            listen
        } else if let Some(listen) = file_config
            .as_ref()
            .map(|cfg| cfg.server.listen.clone())
            .filter(|l| !l.is_empty())
        {
            listen
        } else {
            DEFAULT_LISTEN.to_string()
        };

        Ok(Self {
            api_key,
            model,
            listen,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_guru_env() {
        for var in ["GURU_API_KEY", "GEMINI_API_KEY", "GURU_MODEL", "GURU_LISTEN"] {
            unsafe { std::env::remove_var(var) };
        }
    }

    /// Point HOME at a temp dir (and unset XDG_CONFIG_HOME) so load_config()
    /// cannot find a real config file. Returns the previous values.
    fn isolate_home(tmp: &tempfile::TempDir) -> (Option<String>, Option<String>) {
        let orig_home = std::env::var("HOME").ok();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("HOME", tmp.path()) };
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };
        (orig_home, orig_xdg)
    }

    fn restore_home((orig_home, orig_xdg): (Option<String>, Option<String>)) {
        match orig_home {
            Some(h) => unsafe { std::env::set_var("HOME", h) },
            None => unsafe { std::env::remove_var("HOME") },
        }
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("guru");
        let path = dir.join("config.toml");

        let original = ConfigFile {
            gemini: GeminiSection {
                api_key: "kunci-rahasia".to_string(),
                model: "gemini-2.5-flash".to_string(),
            },
            server: ServerSection {
                listen: "0.0.0.0:8080".to_string(),
            },
        };

        std::fs::create_dir_all(&dir).unwrap();
        let contents = toml::to_string_pretty(&original).unwrap();
        std::fs::write(&path, &contents).unwrap();

        let loaded_contents = std::fs::read_to_string(&path).unwrap();
        let loaded: ConfigFile = toml::from_str(&loaded_contents).unwrap();

        assert_eq!(loaded.gemini.api_key, original.gemini.api_key);
        assert_eq!(loaded.gemini.model, original.gemini.model);
        assert_eq!(loaded.server.listen, original.server.listen);
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let restore = isolate_home(&tmp);

        let result = save_config(&ConfigFile {
            gemini: GeminiSection {
                api_key: "kunci".to_string(),
                model: DEFAULT_MODEL.to_string(),
            },
            server: ServerSection {
                listen: DEFAULT_LISTEN.to_string(),
            },
        });
        let mode = std::fs::metadata(config_path()).map(|m| m.permissions().mode() & 0o777);

        restore_home(restore);

        result.unwrap();
        assert_eq!(mode.unwrap(), 0o600);
    }

    #[test]
    fn resolve_with_cli_flags_overrides_all() {
        let _lock = lock_env();
        clear_guru_env();

        unsafe { std::env::set_var("GURU_API_KEY", "kunci-env") };
        unsafe { std::env::set_var("GURU_MODEL", "model-env") };
        unsafe { std::env::set_var("GURU_LISTEN", "env:9999") };

        let config =
            GuruConfig::resolve(Some("kunci-cli"), Some("model-cli"), Some("cli:1234")).unwrap();

        clear_guru_env();

        assert_eq!(config.api_key, "kunci-cli");
        assert_eq!(config.model, "model-cli");
        assert_eq!(config.listen, "cli:1234");
    }

    #[test]
    fn resolve_prefers_guru_env_over_gemini_env() {
        let _lock = lock_env();
        clear_guru_env();

        unsafe { std::env::set_var("GURU_API_KEY", "kunci-guru") };
        unsafe { std::env::set_var("GEMINI_API_KEY", "kunci-gemini") };

        let config = GuruConfig::resolve(None, None, None).unwrap();

        clear_guru_env();

        assert_eq!(config.api_key, "kunci-guru");
    }

    #[test]
    fn resolve_falls_back_to_gemini_env_key() {
        let _lock = lock_env();
        clear_guru_env();

        unsafe { std::env::set_var("GEMINI_API_KEY", "kunci-gemini") };

        let config = GuruConfig::resolve(None, None, None).unwrap();

        clear_guru_env();

        assert_eq!(config.api_key, "kunci-gemini");
    }

    #[test]
    fn resolve_defaults_model_and_listen_when_nothing_set() {
        let _lock = lock_env();
        clear_guru_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let restore = isolate_home(&tmp);

        let config = GuruConfig::resolve(Some("kunci-cli"), None, None);

        restore_home(restore);

        let config = config.unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.listen, DEFAULT_LISTEN);
    }

    #[test]
    fn resolve_reads_values_from_config_file() {
        let _lock = lock_env();
        clear_guru_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let restore = isolate_home(&tmp);

        let saved = save_config(&ConfigFile {
            gemini: GeminiSection {
                api_key: "kunci-berkas".to_string(),
                model: "model-berkas".to_string(),
            },
            server: ServerSection {
                listen: "berkas:4321".to_string(),
            },
        });
        let config = GuruConfig::resolve(None, None, None);

        restore_home(restore);

        saved.unwrap();
        let config = config.unwrap();
        assert_eq!(config.api_key, "kunci-berkas");
        assert_eq!(config.model, "model-berkas");
        assert_eq!(config.listen, "berkas:4321");
    }

    #[test]
    fn resolve_treats_empty_file_key_as_missing() {
        let _lock = lock_env();
        clear_guru_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let restore = isolate_home(&tmp);

        let saved = save_config(&ConfigFile {
            gemini: GeminiSection {
                api_key: String::new(),
                model: String::new(),
            },
            server: ServerSection {
                listen: String::new(),
            },
        });
        let result = GuruConfig::resolve(None, None, None);

        restore_home(restore);

        saved.unwrap();
        assert!(result.is_err(), "empty api_key in file should not resolve");
    }

    #[test]
    fn resolve_errors_when_no_api_key() {
        let _lock = lock_env();
        clear_guru_env();

        let tmp = tempfile::TempDir::new().unwrap();
        let restore = isolate_home(&tmp);

        let result = GuruConfig::resolve(None, None, None);

        restore_home(restore);

        assert!(result.is_err(), "should error when no API key");
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("API key not found"), "unexpected error: {msg}");
        assert!(msg.contains("guru init"), "error should name the remedy: {msg}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let _lock = lock_env();
        let path = config_path();
        assert!(
            path.ends_with("guru/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
