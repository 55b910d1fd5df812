use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::probe::DEFAULT_HOST;
use crate::range::{DYNAMIC_MAX, DYNAMIC_MIN, PortRange};

/// Location of the config file under `home`. Nothing is created on disk.
fn config_path_in(home: &Path) -> PathBuf {
    home.join(".portprobe").join("config.toml")
}

fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(config_path_in(&home))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the probe sockets bind to
    pub bind_host: IpAddr,
    /// Lowest candidate port (inclusive)
    pub min_port: u16,
    /// Upper candidate bound (exclusive)
    pub max_port: u16,
    /// Give up after this many probes (unbounded if unset)
    pub max_attempts: Option<u64>,
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
    /// Shell for completions (bash, zsh, fish)
    pub shell: Option<String>,
    /// Editor for `portprobe config` (overrides $VISUAL/$EDITOR)
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_HOST,
            min_port: DYNAMIC_MIN,
            max_port: DYNAMIC_MAX,
            max_attempts: None,
            log_level: "warn".to_string(),
            shell: None,
            editor: None,
        }
    }
}

impl Config {
    /// Load config from ~/.portprobe/config.toml, falling back to defaults.
    pub fn load() -> Self {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Self::default(),
        }
    }

    /// Load config from `path`. A missing or broken file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Candidate range described by `min_port`/`max_port`.
    pub fn range(&self) -> Result<PortRange, ProbeError> {
        PortRange::new(self.min_port, self.max_port)
    }

    /// Editor for `portprobe config`: the `editor` key, then $VISUAL, $EDITOR, vi.
    pub fn resolve_editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Write a default config file if none exists. Returns the path.
    pub fn init() -> Result<PathBuf> {
        let path = config_path()?;
        Self::init_at(&path)?;
        Ok(path)
    }

    fn init_at(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(&Self::default())
            .context("failed to serialize default config")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_cover_dynamic_range() {
        let cfg = Config::default();
        assert_eq!(cfg.range().unwrap(), PortRange::DYNAMIC);
        assert_eq!(cfg.bind_host, DEFAULT_HOST);
        assert!(cfg.max_attempts.is_none());
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("portprobe_test_missing.toml");
        let _ = fs::remove_file(&path);
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_config(
            "portprobe_test_partial.toml",
            "min_port = 50000\nmax_port = 50100\nmax_attempts = 25\n",
        );
        let cfg = Config::load_from(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg.range().unwrap(), PortRange::new(50000, 50100).unwrap());
        assert_eq!(cfg.max_attempts, Some(25));
        assert_eq!(cfg.bind_host, DEFAULT_HOST);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn bind_host_parses() {
        let path = temp_config("portprobe_test_host.toml", "bind_host = \"127.0.0.1\"\n");
        let cfg = Config::load_from(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg.bind_host, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn broken_file_uses_defaults() {
        let path = temp_config("portprobe_test_broken.toml", "min_port = \"nope\"\n[[[");
        let cfg = Config::load_from(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let cfg = Config {
            min_port: 60000,
            max_port: 50000,
            ..Config::default()
        };
        assert!(matches!(cfg.range(), Err(ProbeError::InvalidRange { .. })));
    }

    #[test]
    fn editor_from_config_wins() {
        let cfg = Config {
            editor: Some("nano".to_string()),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_editor(), "nano");
    }

    #[test]
    fn load_does_not_create_config_dir() {
        let home = std::env::temp_dir().join("portprobe_test_home_load");
        let _ = fs::remove_dir_all(&home);
        fs::create_dir_all(&home).unwrap();

        let cfg = Config::load_from(&config_path_in(&home));
        let created = home.join(".portprobe").exists();
        fs::remove_dir_all(&home).unwrap();

        assert_eq!(cfg, Config::default());
        assert!(!created);
    }

    #[test]
    fn init_creates_config_dir() {
        let home = std::env::temp_dir().join("portprobe_test_home_init");
        let _ = fs::remove_dir_all(&home);
        let path = config_path_in(&home);

        Config::init_at(&path).unwrap();
        let cfg = Config::load_from(&path);
        fs::remove_dir_all(&home).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn init_writes_loadable_defaults() {
        let path = std::env::temp_dir().join("portprobe_test_init.toml");
        let _ = fs::remove_file(&path);
        Config::init_at(&path).unwrap();
        let cfg = Config::load_from(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg, Config::default());
    }
}
