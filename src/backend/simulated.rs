use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::config::GpioConfig;
use crate::error::GpioError;
use crate::gpio::{
    BackendKind, GpioBackend, NumberingMode, NumberingSlot, PinConfig, PinInfo, PinState,
};
use crate::registry::PinRegistry;

/// Pure in-memory backend. Inputs read LOW until driven with
/// [`simulate_input`](Self::simulate_input).
pub struct SimulatedBackend {
    registry: PinRegistry,
    numbering: NumberingSlot,
}

impl SimulatedBackend {
    pub fn new(config: &GpioConfig) -> Self {
        info!("GPIO simulator initialized");
        Self {
            registry: PinRegistry::new(config),
            numbering: NumberingSlot::new(config),
        }
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    /// Sets the level an input pin will read, standing in for an external signal.
    pub fn simulate_input(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        self.registry.inject(pin, state)
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(&GpioConfig::default())
    }
}

impl GpioBackend for SimulatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Simulated
    }

    fn numbering(&self) -> NumberingMode {
        self.numbering.get()
    }

    fn set_numbering(&self, mode: NumberingMode) -> Result<(), GpioError> {
        self.numbering.set(mode)
    }

    async fn configure(&self, pin: u32, config: &PinConfig) -> Result<(), GpioError> {
        self.registry.configure(pin, config)
    }

    async fn write(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        self.registry.write(pin, state)
    }

    async fn read(&self, pin: u32) -> Result<PinState, GpioError> {
        self.registry.read(pin)
    }

    async fn clear(&self, pin: Option<u32>) -> Result<(), GpioError> {
        self.registry.clear(pin);
        match pin {
            Some(pin) => debug!("GPIO cleanup on channel {pin}"),
            None => debug!("GPIO cleanup on all channels"),
        }
        Ok(())
    }

    async fn describe(&self, pin: u32) -> Result<Option<PinInfo>, GpioError> {
        Ok(self.registry.entry(pin).map(|entry| entry.info()))
    }

    async fn configured(&self) -> Result<FxHashMap<u32, PinState>, GpioError> {
        Ok(self.registry.snapshot())
    }
}
