//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::import::DEFAULT_MAX_UPLOAD_BYTES;

/// Name of the config file looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "assessment.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// JSON file backing the record store.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Largest accepted spreadsheet upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Report locale used when none is given on the command line.
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Directory reports are written to.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("database/assessments.json")
}
fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}
fn default_locale() -> String {
    "zh-CN".to_string()
}
fn default_report_dir() -> PathBuf {
    PathBuf::from("./reports")
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            max_upload_bytes: default_max_upload_bytes(),
            default_locale: default_locale(),
            report_dir: default_report_dir(),
        }
    }
}

/// Contents written by `assess init`.
pub const SAMPLE_CONFIG: &str = r#"# Assessment tracker configuration

# JSON file holding all assessment records.
data_file = "database/assessments.json"

# Spreadsheet uploads larger than this are rejected (10 MiB).
max_upload_bytes = 10485760

# Report locale: "zh-CN" or "en".
default_locale = "zh-CN"

# Where `assess report` writes its output. ${VAR} references are expanded.
report_dir = "./reports"
"#;

/// Expand `${VAR_NAME}` references; unset variables expand to nothing.
/// Expand `${VAR}` references. Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `path`, which must exist when given
/// 2. `assessment.toml` in the current directory
/// 3. `~/.config/assessment/config.toml`
///
/// `ASSESSMENT_DATA_FILE` and `ASSESSMENT_LOCALE` override the file values.
pub fn load_config_from(path: Option<&Path>) -> Result<AssessmentConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => [Some(PathBuf::from(LOCAL_CONFIG_FILE)), global_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AssessmentConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AssessmentConfig::default(),
    };

    if let Ok(file) = std::env::var("ASSESSMENT_DATA_FILE") {
        config.data_file = PathBuf::from(file);
    }
    if let Ok(locale) = std::env::var("ASSESSMENT_LOCALE") {
        config.default_locale = locale;
    }

    config.data_file = resolve_path(&config.data_file);
    config.report_dir = resolve_path(&config.report_dir);
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("assessment")
            .join("config.toml")
    })
}
