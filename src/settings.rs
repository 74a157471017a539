use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::viewer::{
    DEFAULT_HINT_DURATION, DEFAULT_MIN_SWIPE_DISTANCE, DEFAULT_SETTLE_DELAY, MAX_ZOOM, MIN_ZOOM,
    ViewerConfig, ZOOM_STEP, ZoomPolicy, ZoomPolicyError,
};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = ".folio_settings.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    #[serde(default = "default_min_zoom")]
    pub min_zoom: u16,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u16,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: u16,
    #[serde(default = "default_min_swipe_distance")]
    pub min_swipe_distance: f32,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_hint_duration_ms")]
    pub hint_duration_ms: u64,
}

fn default_min_zoom() -> u16 {
    MIN_ZOOM
}

fn default_max_zoom() -> u16 {
    MAX_ZOOM
}

fn default_zoom_step() -> u16 {
    ZOOM_STEP
}

fn default_min_swipe_distance() -> f32 {
    DEFAULT_MIN_SWIPE_DISTANCE
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}

fn default_hint_duration_ms() -> u64 {
    DEFAULT_HINT_DURATION.as_millis() as u64
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            min_swipe_distance: default_min_swipe_distance(),
            settle_delay_ms: default_settle_delay_ms(),
            hint_duration_ms: default_hint_duration_ms(),
        }
    }
}

impl ViewerSettings {
    pub fn to_config(&self) -> Result<ViewerConfig, ZoomPolicyError> {
        let zoom = ZoomPolicy::new(self.min_zoom, self.max_zoom, self.zoom_step)?;
        let min_swipe_distance = if self.min_swipe_distance.is_finite() && self.min_swipe_distance >= 0.0
        {
            self.min_swipe_distance
        } else {
            warn!(
                "Ignoring min_swipe_distance {}, using {}",
                self.min_swipe_distance, DEFAULT_MIN_SWIPE_DISTANCE
            );
            DEFAULT_MIN_SWIPE_DISTANCE
        };

        Ok(ViewerConfig {
            zoom,
            min_swipe_distance,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            hint_duration: Duration::from_millis(self.hint_duration_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default)]
    pub viewer: ViewerSettings,

    /// Durable one-shot flags, e.g. whether the swipe hint was shown.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_theme() -> String {
    "Oceanic Next".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            theme: default_theme(),
            viewer: ViewerSettings::default(),
            flags: BTreeSet::new(),
        }
    }
}

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

fn settings_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(SETTINGS_FILENAME))
}

pub fn load_settings() {
    let Some(path) = settings_path() else {
        warn!("Could not determine home directory, using default settings");
        return;
    };

    if !path.exists() {
        info!(
            "Settings file not found at {:?}, creating with defaults",
            path
        );
        if let Ok(settings) = SETTINGS.read() {
            if let Err(e) = save_settings_to_file(&settings, &path) {
                error!("Failed to save settings to {:?}: {}", path, e);
            }
        }
        return;
    }

    if let Some(settings) = load_settings_from_file(&path) {
        if let Ok(mut global) = SETTINGS.write() {
            *global = settings;
        }
    }
}

/// Reads and migrates a settings file. Unreadable or malformed files are
/// logged and yield `None` so the caller keeps its defaults.
pub fn load_settings_from_file(path: &Path) -> Option<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to read settings file {:?}: {}", path, e);
            return None;
        }
    };

    match serde_yaml::from_str::<Settings>(&content) {
        Ok(mut settings) => {
            debug!("Loaded settings from {:?}", path);

            if settings.version < CURRENT_VERSION {
                migrate_settings(&mut settings);
                if let Err(e) = save_settings_to_file(&settings, path) {
                    error!("Failed to save migrated settings to {:?}: {}", path, e);
                }
            }
            Some(settings)
        }
        Err(e) => {
            error!("Failed to parse settings file {:?}: {}", path, e);
            None
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here:
    // if settings.version < 2 {
    //     migrate_v1_to_v2(settings);
    // }

    settings.version = CURRENT_VERSION;
}

pub fn save_settings() -> std::io::Result<()> {
    let Some(path) = settings_path() else {
        warn!("Could not determine home directory, cannot save settings");
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "home directory not found",
        ));
    };

    match SETTINGS.read() {
        Ok(settings) => save_settings_to_file(&settings, &path),
        Err(_) => Err(std::io::Error::other("settings lock poisoned")),
    }
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> std::io::Result<()> {
    let content = generate_settings_yaml(settings);
    fs::write(path, content)?;
    debug!("Saved settings to {:?}", path);
    Ok(())
}

fn generate_settings_yaml(settings: &Settings) -> String {
    let mut content = String::new();

    content.push_str(&format!("version: {}\n", settings.version));
    content.push_str(&format!("theme: {}\n", yaml_string(&settings.theme)));
    content.push('\n');

    content.push_str(VIEWER_TEMPLATE);
    content.push_str("viewer:\n");
    content.push_str(&format!("  min_zoom: {}\n", settings.viewer.min_zoom));
    content.push_str(&format!("  max_zoom: {}\n", settings.viewer.max_zoom));
    content.push_str(&format!("  zoom_step: {}\n", settings.viewer.zoom_step));
    content.push_str(&format!(
        "  min_swipe_distance: {:?}\n",
        settings.viewer.min_swipe_distance
    ));
    content.push_str(&format!(
        "  settle_delay_ms: {}\n",
        settings.viewer.settle_delay_ms
    ));
    content.push_str(&format!(
        "  hint_duration_ms: {}\n",
        settings.viewer.hint_duration_ms
    ));

    if !settings.flags.is_empty() {
        content.push('\n');
        content.push_str("flags:\n");
        for flag in &settings.flags {
            content.push_str(&format!("  - {}\n", yaml_string(flag)));
        }
    }

    content
}

/// A string as a single YAML scalar, quoted and escaped when it needs to be.
fn yaml_string(value: &str) -> String {
    match serde_yaml::to_string(value) {
        Ok(yaml) => yaml.trim_end().to_string(),
        Err(_) => serde_json::Value::from(value).to_string(),
    }
}

const VIEWER_TEMPLATE: &str = r#"# ============================================================================
# Viewer
# ============================================================================
# Zoom levels are percentages; 100 is the page at its natural size.
# min_zoom must be at most 100 and max_zoom at least 100.
# min_swipe_distance is the horizontal drag (in pixels) that turns a page.
# settle_delay_ms is how long a page turn animates before it is committed.

"#;

// Public API for accessing/modifying settings

pub fn get_theme_name() -> String {
    SETTINGS
        .read()
        .map(|s| s.theme.clone())
        .unwrap_or_else(|_| default_theme())
}

pub fn set_theme_name(name: &str) {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.theme = name.to_string();
    }
    if let Err(e) = save_settings() {
        error!("Failed to save settings: {e}");
    }
}

/// Viewer configuration from the loaded settings, or defaults when the
/// stored zoom bounds are invalid.
pub fn viewer_config() -> ViewerConfig {
    let viewer = SETTINGS
        .read()
        .map(|s| s.viewer.clone())
        .unwrap_or_default();

    viewer.to_config().unwrap_or_else(|e| {
        warn!("Invalid viewer settings ({e}), using defaults");
        ViewerConfig::default()
    })
}

pub fn has_flag(key: &str) -> bool {
    SETTINGS
        .read()
        .map(|s| s.flags.contains(key))
        .unwrap_or(false)
}

pub fn set_flag(key: &str) -> std::io::Result<()> {
    let inserted = match SETTINGS.write() {
        Ok(mut settings) => settings.flags.insert(key.to_string()),
        Err(_) => return Err(std::io::Error::other("settings lock poisoned")),
    };
    if inserted { save_settings() } else { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn written_file_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut settings = Settings::default();
        settings.viewer.zoom_step = 10;
        settings.viewer.min_swipe_distance = 32.5;
        settings.flags.insert("magazine-swipe-hint-seen".to_string());
        save_settings_to_file(&settings, &path).unwrap();

        let loaded = load_settings_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn quoted_names_survive_a_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");

        let mut settings = Settings::default();
        settings.theme = "Ocean \"Deep\": night".to_string();
        settings.flags.insert("seen \"quoted\" hint".to_string());
        settings.flags.insert("- list: like\\back".to_string());
        save_settings_to_file(&settings, &path).unwrap();

        let loaded = load_settings_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "version: 1\nviewer:\n  max_zoom: 300\n").unwrap();

        let loaded = load_settings_from_file(&path).unwrap();
        assert_eq!(loaded.theme, "Oceanic Next");
        assert_eq!(loaded.viewer.max_zoom, 300);
        assert_eq!(loaded.viewer.min_zoom, MIN_ZOOM);
        assert!(loaded.flags.is_empty());
    }

    #[test]
    fn old_versions_are_migrated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "version: 0\n").unwrap();

        let loaded = load_settings_from_file(&path).unwrap();
        assert_eq!(loaded.version, CURRENT_VERSION);
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.starts_with("version: 1"));
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "viewer: [not, a, map]\n").unwrap();
        assert!(load_settings_from_file(&path).is_none());
    }

    #[test]
    fn invalid_zoom_bounds_fail_conversion() {
        let viewer = ViewerSettings {
            min_zoom: 150,
            ..ViewerSettings::default()
        };
        assert!(viewer.to_config().is_err());

        let config = ViewerSettings::default().to_config().unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}
