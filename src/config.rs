//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Local config: `<dir>/.orgtree.toml`
//! 4. Environment variables: `ORGTREE_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, GeometryConfig, NodeMetrics, DEFAULT_DATE_FORMAT};

/// Render tree size reduction settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LayoutSettings {
    /// Group sibling sets larger than this under synthetic team nodes
    pub max_siblings: Option<usize>,
    /// Hide members deeper than this many levels below the organization root
    pub max_depth: Option<usize>,
    /// Node box used to measure trees for fit-to-screen
    pub metrics: NodeMetrics,
}

/// Raw geometry config; `None` means "not specified, inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGeometry {
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub zoom_step: Option<f64>,
    pub entry_min_zoom: Option<f64>,
    pub entry_max_zoom: Option<f64>,
    pub default_zoom: Option<f64>,
    pub fit_padding: Option<f64>,
    pub top_margin: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawMetrics {
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub sibling_gap: Option<f64>,
    pub level_gap: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayout {
    pub max_siblings: Option<usize>,
    pub max_depth: Option<usize>,
    pub metrics: RawMetrics,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub members_file: Option<PathBuf>,
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,
    pub date_format: Option<String>,
    pub geometry: RawGeometry,
    pub layout: RawLayout,
}

fn merge_geometry(base: &GeometryConfig, overlay: &RawGeometry) -> GeometryConfig {
    GeometryConfig {
        min_zoom: overlay.min_zoom.unwrap_or(base.min_zoom),
        max_zoom: overlay.max_zoom.unwrap_or(base.max_zoom),
        zoom_step: overlay.zoom_step.unwrap_or(base.zoom_step),
        entry_min_zoom: overlay.entry_min_zoom.unwrap_or(base.entry_min_zoom),
        entry_max_zoom: overlay.entry_max_zoom.unwrap_or(base.entry_max_zoom),
        default_zoom: overlay.default_zoom.unwrap_or(base.default_zoom),
        fit_padding: overlay.fit_padding.unwrap_or(base.fit_padding),
        top_margin: overlay.top_margin.unwrap_or(base.top_margin),
    }
}

fn merge_layout(base: &LayoutSettings, overlay: &RawLayout) -> LayoutSettings {
    let metrics = &overlay.metrics;
    LayoutSettings {
        max_siblings: overlay.max_siblings.or(base.max_siblings),
        max_depth: overlay.max_depth.or(base.max_depth),
        metrics: NodeMetrics {
            node_width: metrics.node_width.unwrap_or(base.metrics.node_width),
            node_height: metrics.node_height.unwrap_or(base.metrics.node_height),
            sibling_gap: metrics.sibling_gap.unwrap_or(base.metrics.sibling_gap),
            level_gap: metrics.level_gap.unwrap_or(base.metrics.level_gap),
        },
    }
}

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// JSON member document (default: `members.json` in the working directory)
    pub members_file: PathBuf,
    /// Organization to load (default: the one named in the member document)
    pub organization_id: Option<String>,
    /// Label of the synthetic root (default: the document's organization name)
    pub organization_name: Option<String>,
    /// strftime pattern for joining dates
    pub date_format: String,
    pub geometry: GeometryConfig,
    pub layout: LayoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            members_file: PathBuf::from("members.json"),
            organization_id: None,
            organization_name: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            geometry: GeometryConfig::default(),
            layout: LayoutSettings::default(),
        }
    }
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".orgtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.members_file.to_string_lossy().as_ref());
        self.members_file = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base). Overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            members_file: overlay
                .members_file
                .clone()
                .unwrap_or_else(|| self.members_file.clone()),
            organization_id: overlay
                .organization_id
                .clone()
                .or_else(|| self.organization_id.clone()),
            organization_name: overlay
                .organization_name
                .clone()
                .or_else(|| self.organization_name.clone()),
            date_format: overlay
                .date_format
                .clone()
                .unwrap_or_else(|| self.date_format.clone()),
            geometry: merge_geometry(&self.geometry, &overlay.geometry),
            layout: merge_layout(&self.layout, &overlay.layout),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.orgtree.toml`
    ///
    /// A relative `members_file` from the local config is resolved against `local_dir`.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                if let Some(file) = raw.members_file.take() {
                    let file = PathBuf::from(expand_env_vars(&file.to_string_lossy()));
                    raw.members_file = Some(if file.is_relative() {
                        dir.join(file)
                    } else {
                        file
                    });
                }
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.geometry.validate()?;
        if self.layout.max_siblings == Some(0) {
            return Err(ApplicationError::Config {
                message: "layout.max_siblings must be at least 1".into(),
            });
        }
        if self.layout.max_depth == Some(0) {
            return Err(ApplicationError::Config {
                message: "layout.max_depth must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Apply ORGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw = RawSettings {
            members_file: config.get_string("members_file").ok().map(PathBuf::from),
            organization_id: config.get_string("organization_id").ok(),
            organization_name: config.get_string("organization_name").ok(),
            date_format: config.get_string("date_format").ok(),
            geometry: RawGeometry {
                min_zoom: config.get_float("geometry.min_zoom").ok(),
                max_zoom: config.get_float("geometry.max_zoom").ok(),
                zoom_step: config.get_float("geometry.zoom_step").ok(),
                entry_min_zoom: config.get_float("geometry.entry_min_zoom").ok(),
                entry_max_zoom: config.get_float("geometry.entry_max_zoom").ok(),
                default_zoom: config.get_float("geometry.default_zoom").ok(),
                fit_padding: config.get_float("geometry.fit_padding").ok(),
                top_margin: config.get_float("geometry.top_margin").ok(),
            },
            layout: RawLayout {
                max_siblings: config.get::<usize>("layout.max_siblings").ok(),
                max_depth: config.get::<usize>("layout.max_depth").ok(),
                metrics: RawMetrics::default(),
            },
        };

        Ok(settings.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgtree/orgtree.toml
#   Local:  <dir>/.orgtree.toml
#   Env:    ORGTREE_* environment variables, e.g. ORGTREE_GEOMETRY__MAX_ZOOM=2.5

# JSON member document
# members_file = "members.json"

# Organization to load and the label of the chart root
# organization_id = "acme"
# organization_name = "Acme Corp"

# strftime pattern for joining dates
# date_format = "%-m/%-d/%Y"

[geometry]
# min_zoom = 0.1
# max_zoom = 3.0
# zoom_step = 0.1
# entry_min_zoom = 0.1
# entry_max_zoom = 2.0
# default_zoom = 1.0
# fit_padding = 40.0
# top_margin = 50.0

[layout]
# Group more than this many siblings under "Team N" nodes
# max_siblings = 8
# Hide members deeper than this many levels
# max_depth = 4

[layout.metrics]
# node_width = 200.0
# node_height = 100.0
# sibling_gap = 20.0
# level_gap = 60.0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_validated_then_ok() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(settings.geometry.max_zoom, 3.0);
    }

    #[test]
    fn given_partial_geometry_overlay_when_merged_then_keeps_other_fields() {
        let overlay: RawSettings = toml::from_str("[geometry]\nmax_zoom = 2.5\n").unwrap();
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.geometry.max_zoom, 2.5);
        assert_eq!(merged.geometry.min_zoom, 0.1);
        assert_eq!(merged.geometry.top_margin, 50.0);
    }

    #[test]
    fn given_tilde_in_members_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            members_file: PathBuf::from("~/org/members.json"),
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.members_file.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_zero_max_siblings_when_validated_then_errors() {
        let settings = Settings {
            layout: LayoutSettings {
                max_siblings: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_zero_max_depth_when_validated_then_errors() {
        let settings = Settings {
            layout: LayoutSettings {
                max_depth: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.members_file.is_none());
    }
}
