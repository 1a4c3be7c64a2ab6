use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::files::planner::DEFAULT_MIN_SIZE_HINT;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub root: PathBuf,
    pub min_size_hint: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            root: PathBuf::from("."),
            min_size_hint: DEFAULT_MIN_SIZE_HINT,
        }
    }
}

impl Config {
    /// Builds the configuration from `LISTEN`, `ROOT` and `MIN_SIZE_HINT`.
    pub fn load() -> Self {
        let defaults = Self::default();

        let listen_addr = std::env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let root = std::env::var_os("ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.root);
        let min_size_hint = match std::env::var("MIN_SIZE_HINT") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring invalid MIN_SIZE_HINT");
                defaults.min_size_hint
            }),
            Err(_) => defaults.min_size_hint,
        };

        Self {
            listen_addr,
            root,
            min_size_hint,
        }
    }

    /// Reads a YAML config file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Replaces the port of `listen_addr`, keeping its host.
    pub fn set_port(&mut self, port: u16) {
        let host = match self.listen_addr.rsplit_once(':') {
            Some((host, _)) => host,
            None => "0.0.0.0",
        };
        self.listen_addr = format!("{host}:{port}");
    }

    /// Fails unless `root` is an existing directory.
    pub fn validate(&self) -> anyhow::Result<()> {
        let metadata = std::fs::metadata(&self.root)
            .with_context(|| format!("root {} is not accessible", self.root.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("root {} is not a directory", self.root.display());
        }
        Ok(())
    }
}
