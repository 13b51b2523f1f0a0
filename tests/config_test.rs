//! Integration tests for layered Settings loading.
//!
//! Precedence: defaults → global orgtree.toml → local .orgtree.toml → ORGTREE_* env.
//!
//! Note: these tests run without a global config (temp directories only),
//! so they effectively test the local layer merged over defaults.

use std::fs;

use tempfile::TempDir;

use orgtree::application::ApplicationError;
use orgtree::config::{local_config_path, Settings};
use orgtree::domain::DEFAULT_DATE_FORMAT;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.date_format, DEFAULT_DATE_FORMAT);
    assert_eq!(settings.geometry.max_zoom, 3.0);
    assert_eq!(settings.layout.max_siblings, None);
}

#[test]
fn given_local_config_when_load_then_overrides_only_named_fields() {
    let dir = TempDir::new().unwrap();
    let local = r#"
organization_name = "Acme Corp"
date_format = "%Y-%m-%d"

[geometry]
max_zoom = 2.5
fit_padding = 10.0

[layout]
max_siblings = 6

[layout.metrics]
node_width = 160.0
"#;
    fs::write(local_config_path(dir.path()), local).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.organization_name.as_deref(), Some("Acme Corp"));
    assert_eq!(settings.date_format, "%Y-%m-%d");
    assert_eq!(settings.geometry.max_zoom, 2.5);
    assert_eq!(settings.geometry.fit_padding, 10.0);
    assert_eq!(settings.geometry.min_zoom, 0.1);
    assert_eq!(settings.layout.max_siblings, Some(6));
    assert_eq!(settings.layout.max_depth, None);
    assert_eq!(settings.layout.metrics.node_width, 160.0);
    assert_eq!(settings.layout.metrics.node_height, 100.0);
}

#[test]
fn given_relative_members_file_when_load_then_resolved_against_config_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "members_file = \"data/people.json\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.members_file, dir.path().join("data/people.json"));
}

#[test]
fn given_inverted_zoom_bounds_when_load_then_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[geometry]\nmin_zoom = 2.0\nmax_zoom = 1.0\n",
    )
    .unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Domain(_))));
}

#[test]
fn given_malformed_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "geometry = [[[").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_effective_settings_when_shown_then_toml_round_trips() {
    let settings = Settings {
        organization_id: Some("acme".into()),
        ..Settings::default()
    };

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed, settings);
}
