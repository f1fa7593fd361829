use log::{debug, info, log};
use std::path::PathBuf;

use libgpiod::{chip::Chip, line, request};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::config::{GpioConfig, HardwareConfig, ReconfigurePolicy};
use crate::error::GpioError;
use crate::gpio::{
    BackendKind, GpioBackend, NumberingMode, NumberingSlot, PinConfig, PinInfo, PinMode,
    PinState, PullMode, lenient_level,
};
use crate::registry::PinEntry;

/// BCM line behind each physical position of the 40-pin header; `None` for
/// power and ground positions.
const BOARD_TO_BCM: [Option<u32>; 41] = [
    None,     // 0 (unused)
    None,     // 1: 3v3
    None,     // 2: 5v
    Some(2),  // 3
    None,     // 4: 5v
    Some(3),  // 5
    None,     // 6: gnd
    Some(4),  // 7
    Some(14), // 8
    None,     // 9: gnd
    Some(15), // 10
    Some(17), // 11
    Some(18), // 12
    Some(27), // 13
    None,     // 14: gnd
    Some(22), // 15
    Some(23), // 16
    None,     // 17: 3v3
    Some(24), // 18
    Some(10), // 19
    None,     // 20: gnd
    Some(9),  // 21
    Some(25), // 22
    Some(11), // 23
    Some(8),  // 24
    None,     // 25: gnd
    Some(7),  // 26
    Some(0),  // 27
    Some(1),  // 28
    Some(5),  // 29
    None,     // 30: gnd
    Some(6),  // 31
    Some(12), // 32
    Some(13), // 33
    None,     // 34: gnd
    Some(19), // 35
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    None,     // 39: gnd
    Some(21), // 40
];

pub fn board_to_bcm(position: u32) -> Option<u32> {
    BOARD_TO_BCM.get(position as usize).copied().flatten()
}

/// Physical GPIO through the character device. One line request per
/// configured pin; dropping the request releases the line.
pub struct LibgpiodBackend {
    chip: String,
    pins: Mutex<FxHashMap<u32, PinHandle>>, // keyed by pin id
    reconfigure: ReconfigurePolicy,
    strict: bool,
    warnings: bool,
    numbering: NumberingSlot,
}

struct PinHandle {
    line: u32,
    entry: PinEntry,
    request: request::Request,
}

impl LibgpiodBackend {
    /// Opens `hardware.chip` to confirm the driver is usable on this host.
    pub fn new(hardware: &HardwareConfig, gpio: &GpioConfig) -> Result<Self, GpioError> {
        if !hardware.enabled {
            return Err(GpioError::BackendUnavailable(
                "hardware GPIO disabled in config".into(),
            ));
        }

        open_chip(&hardware.chip).map_err(|e| GpioError::BackendUnavailable(e.to_string()))?;
        info!("Using libgpiod on {}", hardware.chip);

        Ok(Self {
            chip: hardware.chip.clone(),
            pins: Mutex::new(FxHashMap::default()),
            reconfigure: gpio.reconfigure,
            strict: gpio.strict,
            warnings: gpio.warnings,
            numbering: NumberingSlot::new(gpio),
        })
    }

    fn line_for(&self, pin: u32) -> Result<u32, GpioError> {
        match self.numbering.get() {
            NumberingMode::Board => board_to_bcm(pin).ok_or_else(|| {
                GpioError::InvalidPin(format!("header position {pin} is not a GPIO"))
            }),
            _ => Ok(pin),
        }
    }

    fn make_line_settings(config: &PinConfig) -> Result<line::Settings, GpioError> {
        let mut ls =
            line::Settings::new().map_err(|e| GpioError::Gpio(format!("libgpiod settings: {e}")))?;

        match config.mode {
            PinMode::Output => {
                ls.set_direction(line::Direction::Output)
                    .map_err(|e| GpioError::Gpio(format!("set direction: {e}")))?;
                ls.set_output_value(to_value(config.initial.unwrap_or_default()))
                    .map_err(|e| GpioError::Gpio(format!("set output value: {e}")))?;
            }
            PinMode::Input => {
                ls.set_direction(line::Direction::Input)
                    .map_err(|e| GpioError::Gpio(format!("set direction: {e}")))?;
                let bias = match config.pull {
                    PullMode::None => None,
                    PullMode::PullUp => Some(line::Bias::PullUp),
                    PullMode::PullDown => Some(line::Bias::PullDown),
                };
                ls.set_bias(bias)
                    .map_err(|e| GpioError::Gpio(format!("set bias: {e}")))?;
            }
        }

        Ok(ls)
    }

    fn make_line_config(offset: u32, settings: line::Settings) -> Result<line::Config, GpioError> {
        let mut cfg =
            line::Config::new().map_err(|e| GpioError::Gpio(format!("line config: {e}")))?;
        cfg.add_line_settings(&[offset], settings)
            .map_err(|e| GpioError::Gpio(format!("line config add settings: {e}")))?;
        Ok(cfg)
    }

    fn request_line(&self, line_cfg: &line::Config) -> Result<request::Request, GpioError> {
        let chip = open_chip(&self.chip)?;
        let mut req_cfg =
            request::Config::new().map_err(|e| GpioError::Gpio(format!("request config: {e}")))?;
        req_cfg
            .set_consumer(env!("CARGO_PKG_NAME"))
            .map_err(|e| GpioError::Gpio(format!("request consumer: {e}")))?;
        chip.request_lines(Some(&req_cfg), line_cfg)
            .map_err(|e| GpioError::Gpio(format!("request lines: {e}")))
    }

    fn sample(handle: &PinHandle) -> Result<PinState, GpioError> {
        if handle.entry.mode == PinMode::Output {
            return Ok(handle.entry.state);
        }
        let value = handle
            .request
            .value(handle.line)
            .map_err(|e| GpioError::Gpio(format!("get value: {e}")))?;
        Ok(from_value(value))
    }
}

fn open_chip(path: &str) -> Result<Chip, GpioError> {
    let p = PathBuf::from(path);
    Chip::open(&p).map_err(|e| GpioError::Gpio(format!("open chip {path}: {e}")))
}

fn to_value(state: PinState) -> line::Value {
    match state {
        PinState::Low => line::Value::InActive,
        PinState::High => line::Value::Active,
    }
}

fn from_value(value: line::Value) -> PinState {
    match value {
        line::Value::InActive => PinState::Low,
        line::Value::Active => PinState::High,
    }
}

impl GpioBackend for LibgpiodBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Hardware
    }

    fn numbering(&self) -> NumberingMode {
        self.numbering.get()
    }

    fn set_numbering(&self, mode: NumberingMode) -> Result<(), GpioError> {
        self.numbering.set(mode)
    }

    async fn configure(&self, pin: u32, config: &PinConfig) -> Result<(), GpioError> {
        let line = self.line_for(pin)?;
        let line_settings = Self::make_line_settings(config)?;
        let line_cfg = Self::make_line_config(line, line_settings)?;

        let mut pins = self.pins.lock();
        match pins.get_mut(&pin) {
            Some(_) if self.reconfigure == ReconfigurePolicy::Reject => {
                Err(GpioError::AlreadyConfigured(pin))
            }
            Some(handle) => {
                handle
                    .request
                    .reconfigure_lines(&line_cfg)
                    .map_err(|e| GpioError::Gpio(format!("reconfigure lines: {e}")))?;
                handle.entry = PinEntry::new(pin, config);
                debug!("line {line} reconfigured as {}", config.mode);
                Ok(())
            }
            None => {
                let request = self.request_line(&line_cfg)?;
                pins.insert(
                    pin,
                    PinHandle {
                        line,
                        entry: PinEntry::new(pin, config),
                        request,
                    },
                );
                debug!("line {line} requested as {}", config.mode);
                Ok(())
            }
        }
    }

    async fn write(&self, pin: u32, state: PinState) -> Result<(), GpioError> {
        let mut pins = self.pins.lock();
        let handle = pins.get_mut(&pin).ok_or(GpioError::NotConfigured(pin))?;
        handle.entry.expect_mode(PinMode::Output)?;

        let offset = handle.line;
        handle
            .request
            .set_value(offset, to_value(state))
            .map_err(|e| GpioError::Gpio(format!("set value: {e}")))?;
        handle.entry.state = state;
        Ok(())
    }

    async fn read(&self, pin: u32) -> Result<PinState, GpioError> {
        let mut pins = self.pins.lock();
        let Some(handle) = pins.get_mut(&pin) else {
            if self.strict {
                return Err(GpioError::NotConfigured(pin));
            }
            log!(
                lenient_level(self.warnings),
                "channel {pin} is not set up, reading low"
            );
            return Ok(PinState::Low);
        };

        let state = Self::sample(handle)?;
        handle.entry.state = state;
        Ok(state)
    }

    async fn clear(&self, pin: Option<u32>) -> Result<(), GpioError> {
        let mut pins = self.pins.lock();
        match pin {
            Some(pin) => {
                pins.remove(&pin);
            }
            None => pins.clear(),
        }
        Ok(())
    }

    async fn describe(&self, pin: u32) -> Result<Option<PinInfo>, GpioError> {
        let pins = self.pins.lock();
        let Some(handle) = pins.get(&pin) else {
            return Ok(None);
        };

        let mut info = handle.entry.info();
        info.state = Self::sample(handle)?;
        Ok(Some(info))
    }

    async fn configured(&self) -> Result<FxHashMap<u32, PinState>, GpioError> {
        let pins = self.pins.lock();
        pins.iter()
            .map(|(pin, handle)| Ok((*pin, Self::sample(handle)?)))
            .collect()
    }
}
