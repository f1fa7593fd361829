//! JSON shapes exchanged between a GPIO peer and [`RemoteBackend`](crate::RemoteBackend).
//!
//! Every response is wrapped in an [`Envelope`]: `{"status":"success","data":...}`
//! on success and `{"status":"error","message":...}` on failure. Pin modes, pulls
//! and levels travel as the numeric codes of the RPi.GPIO convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GpioError;
use crate::gpio::{BackendKind, PinArg, PinInfo, PinMode, PinState, PullMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl ServiceInfo {
    pub fn for_backend(kind: Option<BackendKind>) -> Self {
        let description = match kind {
            Some(kind) => format!("GPIO bridge serving a {kind} backend over HTTP"),
            None => "GPIO bridge (backend not initialized)".to_string(),
        };
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description,
        }
    }
}

/// Body of `POST /pins/{pin}/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRequest {
    pub state: PinArg,
}

/// Pin description as it appears on the wire, e.g. `{"mode":0,"pull_up_down":33,"value":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePinInfo {
    pub mode: u8,
    pub pull_up_down: u8,
    pub value: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&PinInfo> for WirePinInfo {
    fn from(info: &PinInfo) -> Self {
        Self {
            mode: info.mode.code(),
            pull_up_down: info.pull.code(),
            value: info.state.code(),
            description: info.description.clone(),
        }
    }
}

impl TryFrom<WirePinInfo> for PinInfo {
    type Error = GpioError;

    fn try_from(wire: WirePinInfo) -> Result<Self, Self::Error> {
        let mode = PinMode::from_code(wire.mode.into())
            .ok_or_else(|| GpioError::InvalidMode(format!("unknown mode code {}", wire.mode)))?;
        let pull = PullMode::from_code(wire.pull_up_down.into()).ok_or_else(|| {
            GpioError::InvalidPull(format!("unknown pull code {}", wire.pull_up_down))
        })?;
        let state = match wire.value {
            0 => PinState::Low,
            1 => PinState::High,
            v => return Err(GpioError::InvalidState(format!("unknown level {v}"))),
        };
        Ok(PinInfo {
            mode,
            pull,
            state,
            description: wire.description,
        })
    }
}

/// Body of `GET /pins`: pin id to level code, ordered by pin.
pub type PinLevels = BTreeMap<u32, u8>;

pub fn pin_levels<I>(pins: I) -> PinLevels
where
    I: IntoIterator<Item = (u32, PinState)>,
{
    pins.into_iter().map(|(pin, state)| (pin, state.code())).collect()
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub initialized: bool,
    pub backend: Option<BackendKind>,
    pub remote: bool,
    pub mode: String,
    pub pins: PinLevels,
}
