use dissolve_input::KeyBindings;
use dissolve_scene::Prefab;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When a running sequence hands control back to input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusyUntil {
    /// Idle once the last tile fade has been launched and the trailing
    /// delay has passed. Fades may still be running.
    LaunchesIssued,
    /// Idle once every fade of the active epoch has finished too.
    #[default]
    FadesSettled,
}

/// Designer-set parameters of a dissolve grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissolveConfig {
    /// Tiles along world X.
    pub width: u32,
    /// Tiles along world Z.
    pub height: u32,
    /// Multiplier applied to elapsed time before interpolating a fade.
    pub cycle_speed: f32,
    /// Seconds between successive tile launches within a sequence.
    pub delay_between_tiles: f32,
    /// Position of the grid root; tile (0, 0) sits at its x and z.
    pub origin: Vec3,
    pub busy_until: BusyUntil,
    /// Seed for random orderings. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub tile_prefab: Prefab,
    pub keys: KeyBindings,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            cycle_speed: 0.5,
            delay_between_tiles: 0.01,
            origin: Vec3::ZERO,
            busy_until: BusyUntil::default(),
            seed: None,
            tile_prefab: Prefab::default(),
            keys: KeyBindings::default(),
        }
    }
}

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

impl DissolveConfig {
    /// Reject values the controller cannot animate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.cycle_speed.is_finite() || self.cycle_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cycle_speed must be positive, got {}",
                self.cycle_speed
            )));
        }
        if !self.delay_between_tiles.is_finite() || self.delay_between_tiles < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "delay_between_tiles must be non-negative, got {}",
                self.delay_between_tiles
            )));
        }
        Ok(())
    }

    /// Load and validate a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let data = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Yaml => serde_yaml::from_str(&data)?,
            Format::Json => serde_json::from_str(&data)?,
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded dissolve config");
        Ok(config)
    }

    /// Write the config in the format chosen by the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let data = match format_of(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, data)?;
        Ok(())
    }
}
