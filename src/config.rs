//! Application settings with defaults and RON loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors while reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),
}

/// Default file looked up in the working directory.
pub const CONFIG_FILE: &str = "orrery.ron";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub simulation: SimulationConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Width over height of the letterboxed viewport.
    pub aspect_ratio: f32,
}

/// Which shading the bodies get.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderMode {
    Unlit,
    Lit,
    TexturedLit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// Minimum duration of one loop iteration.
    pub frame_budget_ms: u64,
    pub clear_colour: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated days per real second.
    pub time_speed: f32,
    /// Days added or removed by one manual step.
    pub time_step: f32,
    /// Scene units per km of body diameter.
    pub size_scale: f32,
    /// Scene units per km of orbital distance.
    pub distance_scale: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Every other asset path is relative to this.
    pub root: PathBuf,
    /// OBJ used for bodies; a procedural sphere otherwise.
    pub sphere_mesh: Option<PathBuf>,
    /// OBJ used for the skybox; a procedural cube otherwise.
    pub skybox_mesh: Option<PathBuf>,
    pub starfield: PathBuf,
    pub textures: PathBuf,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Orrery".to_string(),
            width: 754,
            height: 512,
            fullscreen: false,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::TexturedLit,
            frame_budget_ms: 30,
            clear_colour: [0.05, 0.05, 0.05],
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_speed: 1.0,
            time_step: 1.0,
            size_scale: 0.0001,
            distance_scale: 0.000001,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            sphere_mesh: None,
            skybox_mesh: None,
            starfield: PathBuf::from("textures/starfield"),
            textures: PathBuf::from("textures"),
        }
    }
}

impl AssetConfig {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl AppConfig {
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_ron(&contents)
    }

    /// `path` when given, else [`CONFIG_FILE`] if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_ron(
            "(window: (title: \"Sol\", width: 1280), simulation: (time_speed: 10.0))",
        )
        .unwrap();
        assert_eq!(config.window.title, "Sol");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 512);
        assert_eq!(config.simulation.time_speed, 10.0);
        assert_eq!(config.simulation.time_step, 1.0);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn render_mode_and_meshes_parse() {
        let config = AppConfig::from_ron(
            "(render: (mode: Lit, frame_budget_ms: 16), assets: (sphere_mesh: Some(\"sphere.obj\")))",
        )
        .unwrap();
        assert_eq!(config.render.mode, RenderMode::Lit);
        assert_eq!(config.render.frame_budget_ms, 16);
        assert_eq!(config.assets.sphere_mesh, Some(PathBuf::from("sphere.obj")));
        assert_eq!(
            config.assets.resolve(&config.assets.textures),
            PathBuf::from("assets/textures")
        );
    }

    #[test]
    fn invalid_ron_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_ron("(window: [oops"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn explicit_missing_file_is_a_read_error() {
        assert!(matches!(
            AppConfig::discover(Some(Path::new("no/such/orrery.ron"))),
            Err(ConfigError::ReadError(_))
        ));
    }
}
