use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use spak_pack::{Compressor, FormatKind, DEFAULT_LEVEL};

/// Defaults for the `spak` command, loaded from an optional TOML file.
///
/// ```toml
/// format = "ucsp"
/// compression_level = 9
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpakConfig {
    pub format: FormatKind,
    pub compression_level: u32,
}

impl Default for SpakConfig {
    fn default() -> Self {
        Self {
            format: FormatKind::Ucsp,
            compression_level: DEFAULT_LEVEL,
        }
    }
}

impl SpakConfig {
    /// Read the config at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        anyhow::ensure!(
            config.compression_level <= 9,
            "compression_level must be 0-9, got {}",
            config.compression_level
        );
        Ok(config)
    }

    /// Compressor for `level`, falling back to the configured level.
    pub fn compressor(&self, level: Option<u32>) -> Compressor {
        Compressor::new(level.unwrap_or(self.compression_level))
    }
}
