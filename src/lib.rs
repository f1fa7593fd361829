pub mod backend;
pub mod config;
pub mod error;
pub mod gpio;
pub mod protocol;
pub mod registry;
pub mod routes;

pub use config::{AppConfig, GpioConfig, HardwareConfig, HttpConfig, ReconfigurePolicy, RemoteConfig};
pub use error::GpioError;
pub use gpio::{
    BackendKind, GenericGpioManager, GpioBackend, GpioManager, NumberingMode, PinArg, PinConfig,
    PinInfo, PinMode, PinSet, PinState, PullMode, SetupRequest,
};
pub use registry::{PinEntry, PinRegistry};
pub use routes::AppState;

#[cfg(feature = "hardware-gpio")]
pub use backend::LibgpiodBackend;
pub use backend::{Backend, RemoteBackend, SimulatedBackend};
