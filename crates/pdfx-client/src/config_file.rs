use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConvertOptions, Format};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub service: Option<ServiceConfig>,
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

/// Default conversion options applied when a caller doesn't override them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub format: Option<Format>,
    pub normalize_whitespace: Option<bool>,
}

impl ConfigFile {
    /// Conversion options seeded from the `[defaults]` table.
    pub fn default_options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::default();
        if let Some(ref defaults) = self.defaults {
            if let Some(format) = defaults.format {
                options = options.with_format(format);
            }
            if let Some(normalize) = defaults.normalize_whitespace {
                options = options.with_normalize_whitespace(normalize);
            }
        }
        options
    }
}

/// Platform config directory path: `<config_dir>/pdfx/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfx").join("config.toml"))
}

/// Load config by cascading CWD `.pdfx.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfx.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        service: Some(ServiceConfig {
            base_url: overlay
                .service
                .as_ref()
                .and_then(|s| s.base_url.clone())
                .or_else(|| base.service.as_ref().and_then(|s| s.base_url.clone())),
            timeout_secs: overlay
                .service
                .as_ref()
                .and_then(|s| s.timeout_secs)
                .or_else(|| base.service.as_ref().and_then(|s| s.timeout_secs)),
            connect_timeout_secs: overlay
                .service
                .as_ref()
                .and_then(|s| s.connect_timeout_secs)
                .or_else(|| base.service.as_ref().and_then(|s| s.connect_timeout_secs)),
            user_agent: overlay
                .service
                .as_ref()
                .and_then(|s| s.user_agent.clone())
                .or_else(|| base.service.as_ref().and_then(|s| s.user_agent.clone())),
        }),
        defaults: Some(DefaultsConfig {
            format: overlay
                .defaults
                .as_ref()
                .and_then(|d| d.format)
                .or_else(|| base.defaults.as_ref().and_then(|d| d.format)),
            normalize_whitespace: overlay
                .defaults
                .as_ref()
                .and_then(|d| d.normalize_whitespace)
                .or_else(|| {
                    base.defaults
                        .as_ref()
                        .and_then(|d| d.normalize_whitespace)
                }),
        }),
    }
}
