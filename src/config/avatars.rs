use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::assets::transform::TransformOptions;

const CONFIG_FILE: &str = "avatars.toml";

/// Mapping key whose asset stands in for every character without an explicit
/// entry.
pub const DEFAULT_MODEL: &str = "default";

/// Avatar substitution settings: where assets live, how materials are
/// converted, and which character gets which avatar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarSettings {
    /// Directory containing `<name>.vrm` avatar files.
    pub assets_dir: PathBuf,
    /// Bundle manifest providing the target shader by name.
    pub shader_bundle: PathBuf,
    /// Shader every converted material is switched to.
    pub target_shader: String,
    /// Uniform scale applied once at each imported graph's root.
    pub scale_factor: f32,
    /// HSV value multiplier baked into base textures.
    pub brightness: f32,
    /// Publish the substitute's eye position for camera placement.
    pub fix_camera_height: bool,
    /// Character name (lowercased) → avatar asset name.
    pub avatars: HashMap<String, String>,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("avatars"),
            shader_bundle: PathBuf::from("player.shaders.json"),
            target_shader: "custom/player".to_string(),
            scale_factor: 1.1,
            brightness: 0.8,
            fix_camera_height: false,
            avatars: HashMap::new(),
        }
    }
}

impl AvatarSettings {
    /// Asset name for a character, falling back to [`DEFAULT_MODEL`].
    pub fn model_for(&self, character_name: &str) -> &str {
        self.avatars
            .get(&character_name.to_lowercase())
            .map(String::as_str)
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Distinct asset names to preload: every mapped value plus the fallback.
    pub fn configured_models(&self) -> BTreeSet<String> {
        let mut models: BTreeSet<String> = self
            .avatars
            .values()
            .map(|name| name.to_lowercase())
            .collect();
        models.insert(DEFAULT_MODEL.to_string());
        models
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            target_shader: self.target_shader.clone(),
            scale_factor: self.scale_factor,
            brightness: self.brightness,
        }
    }
}

/// Default config location under the user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "avatar-swap").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

pub fn load_settings(path: &Path) -> Result<AvatarSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings: {}", path.display()))?;
    let mut settings: AvatarSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings: {}", path.display()))?;

    // Mapping keys are matched lowercased; normalize once at load.
    settings.avatars = settings
        .avatars
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();

    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AvatarSettings) -> Result<()> {
    let raw = toml::to_string_pretty(settings).context("failed to serialize settings")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
    }
    fs::write(path, raw).with_context(|| format!("failed to write settings: {}", path.display()))?;
    Ok(())
}
