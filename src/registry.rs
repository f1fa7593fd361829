use log::{debug, log};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::{GpioConfig, ReconfigurePolicy};
use crate::error::GpioError;
use crate::gpio::{PinConfig, PinInfo, PinMode, PinState, PullMode, lenient_level};

/// Per-pin record. `state` is the last written level for outputs and the
/// last sampled level for inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEntry {
    pub pin: u32,
    pub mode: PinMode,
    pub pull: PullMode,
    pub state: PinState,
    pub description: Option<String>,
}

impl PinEntry {
    pub fn new(pin: u32, config: &PinConfig) -> Self {
        let (pull, state) = match config.mode {
            PinMode::Output => (PullMode::None, config.initial.unwrap_or_default()),
            PinMode::Input => (config.pull, PinState::Low),
        };
        Self {
            pin,
            mode: config.mode,
            pull,
            state,
            description: config.description.clone(),
        }
    }

    pub fn info(&self) -> PinInfo {
        PinInfo {
            mode: self.mode,
            pull: self.pull,
            state: self.state,
            description: self.description.clone(),
        }
    }

    pub(crate) fn expect_mode(&self, mode: PinMode) -> Result<(), GpioError> {
        if self.mode != mode {
            return Err(GpioError::WrongMode {
                pin: self.pin,
                expected: mode,
            });
        }
        Ok(())
    }
}

/// In-memory pin table. Every operation takes the single table lock, so
/// concurrent setups of the same pin never interleave.
pub struct PinRegistry {
    pins: Mutex<FxHashMap<u32, PinEntry>>,
    strict: bool,
    warnings: bool,
    reconfigure: ReconfigurePolicy,
}

impl PinRegistry {
    pub fn new(config: &GpioConfig) -> Self {
        Self {
            pins: Mutex::new(FxHashMap::default()),
            strict: config.strict,
            warnings: config.warnings,
            reconfigure: config.reconfigure,
        }
    }

    pub fn configure(&self, pin: u32, config: &PinConfig) -> Result<(), GpioError> {
        let mut pins = self.pins.lock();

        if pins.contains_key(&pin) {
            match self.reconfigure {
                ReconfigurePolicy::Reject => return Err(GpioError::AlreadyConfigured(pin)),
                ReconfigurePolicy::Overwrite => debug!("pin {pin} reconfigured"),
            }
        }
        pins.insert(pin, PinEntry::new(pin, config));

        Ok(())
    }

    pub fn write(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        let mut pins = self.pins.lock();
        let entry = pins.get_mut(&pin).ok_or(GpioError::NotConfigured(pin))?;
        entry.expect_mode(PinMode::Output)?;

        entry.state = state;
        debug!("GPIO {pin} set to {state}");
        Ok(())
    }

    /// Drives the sampled level of an input pin.
    pub fn inject(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        let mut pins = self.pins.lock();
        let entry = pins.get_mut(&pin).ok_or(GpioError::NotConfigured(pin))?;
        entry.expect_mode(PinMode::Input)?;

        entry.state = state;
        Ok(())
    }

    /// Reads a pin. An unconfigured pin fails in strict mode and reads LOW otherwise.
    pub fn read(&self, pin: u32) -> Result<PinState, GpioError> {
        match self.pins.lock().get(&pin) {
            Some(entry) => Ok(entry.state),
            None if self.strict => Err(GpioError::NotConfigured(pin)),
            None => {
                log!(
                    lenient_level(self.warnings),
                    "channel {pin} is not set up, reading low"
                );
                Ok(PinState::Low)
            }
        }
    }

    pub fn clear(&self, pin: Option<u32>) {
        let mut pins = self.pins.lock();
        match pin {
            Some(pin) => {
                pins.remove(&pin);
            }
            None => pins.clear(),
        }
    }

    pub fn mode_of(&self, pin: u32) -> Option<PinMode> {
        self.pins.lock().get(&pin).map(|e| e.mode)
    }

    pub fn pull_of(&self, pin: u32) -> Option<PullMode> {
        self.pins.lock().get(&pin).map(|e| e.pull)
    }

    pub fn entry(&self, pin: u32) -> Option<PinEntry> {
        self.pins.lock().get(&pin).cloned()
    }

    pub fn snapshot(&self) -> FxHashMap<u32, PinState> {
        self.pins
            .lock()
            .iter()
            .map(|(pin, entry)| (*pin, entry.state))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pins.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.lock().is_empty()
    }
}
