//! Cafe settings read from a TOML file.
//!
//! ```toml
//! [session]
//! expression = "sin(x)*exp(y)"
//! point = [0.5, 1.0]
//! direction = [1.0, 0.0]
//!
//! [service]
//! model = "gemini-2.5-flash"
//! timeout_secs = 30
//! api_key_env = "GEMINI_API_KEY"
//!
//! [plot]
//! width = 1024
//! samples = 60
//!
//! [logging]
//! level = "debug"
//! file = "cafe.log"
//! ```
//! Every field is optional. API keys are never stored in the file, only the name of the
//! environment variable that holds one.
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "cannot read {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Starting values of the workbench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub expression: String,
    pub point: [f64; 2],
    pub direction: [f64; 2],
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            expression: "x^2 - y^2".to_string(),
            point: [0.0, 0.0],
            direction: [1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 30,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl ServiceSettings {
    /// Key from the environment, `None` when unset or empty.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok().filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub width: u32,
    pub height: u32,
    /// grid points per axis
    pub samples: usize,
    /// the surface spans `point ± half_range` on both axes
    pub half_range: f64,
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            width: 800,
            height: 600,
            samples: 40,
            half_range: 3.0,
            yaw: 0.7,
            pitch: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CafeConfig {
    pub session: SessionSettings,
    pub service: ServiceSettings,
    pub plot: PlotSettings,
    pub logging: LoggingSettings,
}

impl CafeConfig {
    /// `<config dir>/matchaberry/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("matchaberry").join("config.toml"))
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// An explicit path must exist. Without one, the default path is used when present
    /// and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
