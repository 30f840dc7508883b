//! Editor settings

use serde::{Deserialize, Serialize};
use shared::config::LABEL_PRECISION;
use shared::{ControlsParams, Snaps, TransformMode, TransformSpace};

fn default_size() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_precision() -> usize {
    LABEL_PRECISION
}

/// Persisted configuration of the transform controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Handle and label behaviour
    #[serde(default)]
    pub params: ControlsParams,
    /// Snap steps (rotation in radians)
    #[serde(default)]
    pub snaps: Snaps,
    #[serde(default)]
    pub mode: TransformMode,
    #[serde(default)]
    pub space: TransformSpace,
    /// Gizmo size multiplier
    #[serde(default = "default_size")]
    pub gizmo_size: f32,
    #[serde(default = "default_true")]
    pub show_x: bool,
    #[serde(default = "default_true")]
    pub show_y: bool,
    #[serde(default = "default_true")]
    pub show_z: bool,
    /// Decimal places in label placeholders
    #[serde(default = "default_precision")]
    pub label_precision: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            params: ControlsParams::default(),
            snaps: Snaps::default(),
            mode: TransformMode::default(),
            space: TransformSpace::default(),
            gizmo_size: default_size(),
            show_x: true,
            show_y: true,
            show_z: true,
            label_precision: LABEL_PRECISION,
        }
    }
}

impl EditorSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "shape3d", "shape3d-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the user config dir, or return defaults if missing
    /// or unreadable.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(json) = std::fs::read_to_string(&path) {
                match Self::from_json(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Save settings to the user config dir
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no config directory",
            ));
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(&path, json)?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
