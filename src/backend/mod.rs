#[cfg(feature = "hardware-gpio")]
pub mod libgpiod;
pub mod remote;
pub mod simulated;

use log::{info, warn};
use rustc_hash::FxHashMap;

#[cfg(feature = "hardware-gpio")]
pub use libgpiod::LibgpiodBackend;
pub use remote::RemoteBackend;
pub use simulated::SimulatedBackend;

use crate::config::AppConfig;
use crate::error::GpioError;
use crate::gpio::{BackendKind, GpioBackend, NumberingMode, PinConfig, PinInfo, PinState};

/// The backend chosen at initialization. Dispatch is a plain `match`.
pub enum Backend {
    #[cfg(feature = "hardware-gpio")]
    Hardware(LibgpiodBackend),
    Simulated(SimulatedBackend),
    Remote(RemoteBackend),
}

macro_rules! dispatch {
    ($self:ident, $b:ident => $body:expr) => {
        match $self {
            #[cfg(feature = "hardware-gpio")]
            Backend::Hardware($b) => $body,
            Backend::Simulated($b) => $body,
            Backend::Remote($b) => $body,
        }
    };
}

impl Backend {
    /// Picks the backend for `config`: remote when enabled, otherwise local.
    /// A remote that cannot be reached degrades to local GPIO, and local GPIO
    /// degrades from hardware to the simulator.
    pub async fn select(config: &AppConfig) -> Result<Self, GpioError> {
        let backend = if config.remote.enabled {
            match Self::connect_remote(config).await {
                Ok(backend) => backend,
                Err(e) => {
                    warn!(
                        "Failed to initialize remote GPIO at {}: {e}",
                        config.remote.base_url
                    );
                    info!("Falling back to local GPIO");
                    Self::open_local(config)
                }
            }
        } else {
            Self::open_local(config)
        };

        backend.set_numbering(config.gpio.numbering)?;
        Ok(backend)
    }

    async fn connect_remote(config: &AppConfig) -> Result<Self, GpioError> {
        let remote = RemoteBackend::new(&config.remote, &config.gpio)?;
        if config.remote.probe {
            remote
                .probe()
                .await
                .map_err(|e| GpioError::BackendUnavailable(e.to_string()))?;
        }
        Ok(Backend::Remote(remote))
    }

    fn open_local(config: &AppConfig) -> Self {
        match Self::open_hardware(config) {
            Ok(backend) => backend,
            Err(e) => {
                info!("Hardware GPIO unavailable ({e}), using the GPIO simulator");
                Backend::Simulated(SimulatedBackend::new(&config.gpio))
            }
        }
    }

    #[cfg(feature = "hardware-gpio")]
    fn open_hardware(config: &AppConfig) -> Result<Self, GpioError> {
        LibgpiodBackend::new(&config.hardware, &config.gpio).map(Backend::Hardware)
    }

    #[cfg(not(feature = "hardware-gpio"))]
    fn open_hardware(_config: &AppConfig) -> Result<Self, GpioError> {
        Err(GpioError::BackendUnavailable(
            "built without the hardware-gpio feature".into(),
        ))
    }

    pub fn as_simulated(&self) -> Option<&SimulatedBackend> {
        match self {
            Backend::Simulated(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_remote(&self) -> Option<&RemoteBackend> {
        match self {
            Backend::Remote(b) => Some(b),
            _ => None,
        }
    }
}

impl From<SimulatedBackend> for Backend {
    fn from(backend: SimulatedBackend) -> Self {
        Backend::Simulated(backend)
    }
}

impl From<RemoteBackend> for Backend {
    fn from(backend: RemoteBackend) -> Self {
        Backend::Remote(backend)
    }
}

impl GpioBackend for Backend {
    fn kind(&self) -> BackendKind {
        dispatch!(self, b => b.kind())
    }

    fn numbering(&self) -> NumberingMode {
        dispatch!(self, b => b.numbering())
    }

    fn set_numbering(&self, mode: NumberingMode) -> Result<(), GpioError> {
        dispatch!(self, b => b.set_numbering(mode))
    }

    async fn configure(&self, pin: u32, config: &PinConfig) -> Result<(), GpioError> {
        dispatch!(self, b => b.configure(pin, config).await)
    }

    async fn write(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        dispatch!(self, b => b.write(pin, state).await)
    }

    async fn read(&self, pin: u32) -> Result<PinState, GpioError> {
        dispatch!(self, b => b.read(pin).await)
    }

    async fn clear(&self, pin: Option<u32>) -> Result<(), GpioError> {
        dispatch!(self, b => b.clear(pin).await)
    }

    async fn describe(&self, pin: u32) -> Result<Option<PinInfo>, GpioError> {
        dispatch!(self, b => b.describe(pin).await)
    }

    async fn configured(&self) -> Result<FxHashMap<u32, PinState>, GpioError> {
        dispatch!(self, b => b.configured().await)
    }
}
