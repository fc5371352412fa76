//! Layered configuration.
//!
//! Defaults are overlaid by the user file
//! (`<config dir>/neuroasha/config.toml`) and then by the project file
//! (`.neuroasha/config.toml`, or `$NEUROASHA_CONFIG_DIR/config.toml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default port for `neuroasha serve`.
pub const DEFAULT_PORT: u16 = 58232;

const PROJECT_DIR_ENV: &str = "NEUROASHA_CONFIG_DIR";

/// Final configuration with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Simulated thinking time before replies, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Before the first reply to any message.
    pub thinking_ms: u64,
    /// Between the start acknowledgement and the first question.
    pub follow_up_ms: u64,
    /// Between the analyzing notice and the summary.
    pub analysis_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            thinking_ms: 1500,
            follow_up_ms: 1000,
            analysis_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssessmentConfig {
    /// Seed for choosing "waiting to start" replies; rotate through them when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_seed: Option<u64>,
}

/// Configuration as stored in TOML files (optional fields for merging).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    server: RawServerConfig,
    #[serde(default)]
    pacing: RawPacingConfig,
    #[serde(default)]
    assessment: AssessmentConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RawServerConfig {
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RawPacingConfig {
    thinking_ms: Option<u64>,
    follow_up_ms: Option<u64>,
    analysis_ms: Option<u64>,
}

impl AppConfig {
    /// Load merged configuration (user + project).
    pub fn load() -> Result<Self> {
        let mut raw = RawConfig::default();

        if let Some(user_path) = user_config_path() {
            if let Some(user) = read_raw(&user_path)? {
                raw = merge_raw(raw, user);
            }
        }

        if let Some(project) = read_raw(&project_config_path())? {
            raw = merge_raw(raw, project);
        }

        Ok(finalize(raw))
    }

    /// Load a single file over the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = read_raw(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?;
        Ok(finalize(raw))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// User config path (platform-specific).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("neuroasha").join("config.toml"))
}

/// Project config path, overridable with `NEUROASHA_CONFIG_DIR`.
pub fn project_config_path() -> PathBuf {
    std::env::var(PROJECT_DIR_ENV).map_or_else(
        |_| PathBuf::from(".neuroasha/config.toml"),
        |dir| PathBuf::from(dir).join("config.toml"),
    )
}

fn read_raw(path: &Path) -> Result<Option<RawConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw = toml::from_str(&contents)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    debug!(path = %path.display(), "Loaded configuration layer");
    Ok(Some(raw))
}

/// Overlay values override base only if explicitly set.
fn merge_raw(base: RawConfig, overlay: RawConfig) -> RawConfig {
    RawConfig {
        server: RawServerConfig {
            port: overlay.server.port.or(base.server.port),
        },
        pacing: RawPacingConfig {
            thinking_ms: overlay.pacing.thinking_ms.or(base.pacing.thinking_ms),
            follow_up_ms: overlay.pacing.follow_up_ms.or(base.pacing.follow_up_ms),
            analysis_ms: overlay.pacing.analysis_ms.or(base.pacing.analysis_ms),
        },
        assessment: AssessmentConfig {
            fallback_seed: overlay
                .assessment
                .fallback_seed
                .or(base.assessment.fallback_seed),
        },
    }
}

fn finalize(raw: RawConfig) -> AppConfig {
    let pacing = PacingConfig::default();
    AppConfig {
        server: ServerConfig {
            port: raw.server.port.unwrap_or(DEFAULT_PORT),
        },
        pacing: PacingConfig {
            thinking_ms: raw.pacing.thinking_ms.unwrap_or(pacing.thinking_ms),
            follow_up_ms: raw.pacing.follow_up_ms.unwrap_or(pacing.follow_up_ms),
            analysis_ms: raw.pacing.analysis_ms.unwrap_or(pacing.analysis_ms),
        },
        assessment: raw.assessment,
    }
}
