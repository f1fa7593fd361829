use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::GpioError;
use crate::gpio::NumberingMode;

pub const ENV_CONFIG_PATH: &str = "GPIO_BRIDGE_CONFIG";
pub const ENV_REMOTE_ENABLED: &str = "GPIO_BRIDGE_REMOTE_ENABLED";
pub const ENV_REMOTE_URL: &str = "GPIO_BRIDGE_REMOTE_URL";
pub const ENV_REMOTE_API_KEY: &str = "GPIO_BRIDGE_REMOTE_API_KEY";
pub const ENV_NUMBERING: &str = "GPIO_BRIDGE_NUMBERING";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
    /// Required `X-API-Key` value for incoming requests, if any.
    pub api_key: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            unix_socket: None,
            host: Some("0.0.0.0:5000".to_string()),
            path: String::new(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReconfigurePolicy {
    #[default]
    Overwrite,
    Reject,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GpioConfig {
    pub numbering: NumberingMode,
    /// Pin ids are accepted in `0..pin_count`.
    pub pin_count: u32,
    /// Reads of unconfigured pins fail instead of returning LOW.
    pub strict: bool,
    /// Permissive substitutions log at warn level instead of debug.
    pub warnings: bool,
    pub reconfigure: ReconfigurePolicy,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            numbering: NumberingMode::Bcm,
            pin_count: 40,
            strict: true,
            warnings: false,
            reconfigure: ReconfigurePolicy::Overwrite,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    /// Contact the peer during initialization and fall back to local GPIO if it does not answer.
    pub probe: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://raspberrypi:8000".to_string(),
            api_key: None,
            timeout_ms: 5000,
            probe: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HardwareConfig {
    pub enabled: bool,
    pub chip: String,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chip: "/dev/gpiochip0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub gpio: GpioConfig,
    pub remote: RemoteConfig,
    pub hardware: HardwareConfig,
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GpioError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| GpioError::Config(format!("Failed to read config: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| GpioError::Config(format!("Invalid config json: {e}")))
    }

    /// Applies `GPIO_BRIDGE_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<(), GpioError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), GpioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup(ENV_REMOTE_ENABLED) {
            self.remote.enabled = parse_flag(&enabled).ok_or_else(|| {
                GpioError::Config(format!("{ENV_REMOTE_ENABLED} must be a boolean"))
            })?;
        }
        if let Some(url) = lookup(ENV_REMOTE_URL) {
            self.remote.base_url = url;
        }
        if let Some(key) = lookup(ENV_REMOTE_API_KEY) {
            self.remote.api_key = (!key.is_empty()).then_some(key);
        }
        if let Some(numbering) = lookup(ENV_NUMBERING) {
            self.gpio.numbering = numbering
                .parse()
                .map_err(|e| GpioError::Config(format!("{ENV_NUMBERING}: {e}")))?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
