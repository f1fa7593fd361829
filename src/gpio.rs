use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::ops::Range;
use std::str::FromStr;
use std::sync::Arc;

use log::{Level, debug, info, log, warn};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::backend::Backend;
use crate::config::{AppConfig, GpioConfig};
use crate::error::GpioError;

pub type GpioManager<B = Backend> = GenericGpioManager<B>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    Input,
    Output,
}

impl PinMode {
    /// Wire code, `OUT = 0` and `IN = 1`.
    pub const fn code(self) -> u8 {
        match self {
            PinMode::Output => 0,
            PinMode::Input => 1,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PinMode::Output),
            1 => Some(PinMode::Input),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PinMode::Input => "input",
            PinMode::Output => "output",
        }
    }
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinMode {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" => Ok(PinMode::Input),
            "output" | "out" => Ok(PinMode::Output),
            _ => Err(GpioError::InvalidMode(format!(
                "{s:?}, must be \"input\" or \"output\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    #[default]
    Low,
    High,
}

impl PinState {
    pub const fn code(self) -> u8 {
        match self {
            PinState::Low => 0,
            PinState::High => 1,
        }
    }

    pub const fn is_high(self) -> bool {
        matches!(self, PinState::High)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PinState::Low => "low",
            PinState::High => "high",
        }
    }
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value { PinState::High } else { PinState::Low }
    }
}

impl From<PinState> for bool {
    fn from(state: PinState) -> Self {
        state.is_high()
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinState {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "1" | "true" | "on" => Ok(PinState::High),
            "low" | "0" | "false" | "off" => Ok(PinState::Low),
            _ => Err(GpioError::InvalidState(format!(
                "{s:?}, must be \"high\" or \"low\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PullMode {
    #[default]
    None,
    PullUp,
    PullDown,
}

impl PullMode {
    /// Wire code: `PUD_UP = 31`, `PUD_DOWN = 32`, `PUD_OFF = 33`.
    pub const fn code(self) -> u8 {
        match self {
            PullMode::PullUp => 31,
            PullMode::PullDown => 32,
            PullMode::None => 33,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            31 => Some(PullMode::PullUp),
            32 => Some(PullMode::PullDown),
            33 => Some(PullMode::None),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PullMode::None => "off",
            PullMode::PullUp => "up",
            PullMode::PullDown => "down",
        }
    }
}

impl FromStr for PullMode {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "pud_off" | "floating" => Ok(PullMode::None),
            "up" | "pull_up" | "pull-up" | "pud_up" => Ok(PullMode::PullUp),
            "down" | "pull_down" | "pull-down" | "pud_down" => Ok(PullMode::PullDown),
            _ => Err(GpioError::InvalidPull(format!(
                "{s:?}, must be \"up\", \"down\" or \"off\""
            ))),
        }
    }
}

/// Pin numbering scheme. `Unknown` is what an uninitialized manager reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NumberingMode {
    #[serde(alias = "bcm")]
    Bcm,
    #[serde(alias = "board")]
    Board,
    #[serde(alias = "unknown")]
    Unknown,
}

impl NumberingMode {
    pub const fn code(self) -> Option<u8> {
        match self {
            NumberingMode::Bcm => Some(11),
            NumberingMode::Board => Some(10),
            NumberingMode::Unknown => None,
        }
    }

    /// Accepted pin ids for a header of `pin_count` positions. BOARD
    /// positions count from 1, BCM lines from 0.
    pub const fn pin_range(self, pin_count: u32) -> Range<u32> {
        match self {
            NumberingMode::Board => 1..pin_count.saturating_add(1),
            NumberingMode::Bcm | NumberingMode::Unknown => 0..pin_count,
        }
    }
}

impl fmt::Display for NumberingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumberingMode::Bcm => "BCM",
            NumberingMode::Board => "BOARD",
            NumberingMode::Unknown => "UNKNOWN",
        })
    }
}

impl FromStr for NumberingMode {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BCM" => Ok(NumberingMode::Bcm),
            "BOARD" => Ok(NumberingMode::Board),
            _ => Err(GpioError::InvalidMode(format!(
                "{s:?}, numbering must be BCM or BOARD"
            ))),
        }
    }
}

/// A caller-friendly value: a string such as `"high"` or `"output"`, an
/// integer code, or a boolean. Normalized into the canonical enums before
/// any backend sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinArg {
    Bool(bool),
    Int(i64),
    Text(String),
}

macro_rules! pin_arg_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for PinArg {
            fn from(value: $t) -> Self {
                PinArg::Int(i64::from(value))
            }
        })*
    };
}

pin_arg_from_int!(u8, i32, u32, i64);

impl From<bool> for PinArg {
    fn from(value: bool) -> Self {
        PinArg::Bool(value)
    }
}

impl From<&str> for PinArg {
    fn from(value: &str) -> Self {
        PinArg::Text(value.to_string())
    }
}

impl From<String> for PinArg {
    fn from(value: String) -> Self {
        PinArg::Text(value)
    }
}

impl From<PinMode> for PinArg {
    fn from(mode: PinMode) -> Self {
        PinArg::Text(mode.as_str().to_string())
    }
}

impl From<PinState> for PinArg {
    fn from(state: PinState) -> Self {
        PinArg::Text(state.as_str().to_string())
    }
}

impl From<PullMode> for PinArg {
    fn from(pull: PullMode) -> Self {
        PinArg::Text(pull.as_str().to_string())
    }
}

impl TryFrom<&PinArg> for PinMode {
    type Error = GpioError;

    fn try_from(arg: &PinArg) -> Result<Self, Self::Error> {
        match arg {
            PinArg::Text(s) => s.parse(),
            PinArg::Int(code) => PinMode::from_code(*code)
                .ok_or_else(|| GpioError::InvalidMode(format!("unknown mode code {code}"))),
            PinArg::Bool(b) => Err(GpioError::InvalidMode(format!("{b} is not a pin mode"))),
        }
    }
}

impl TryFrom<&PinArg> for PinState {
    type Error = GpioError;

    fn try_from(arg: &PinArg) -> Result<Self, Self::Error> {
        match arg {
            PinArg::Text(s) => s.parse(),
            PinArg::Bool(b) => Ok(PinState::from(*b)),
            PinArg::Int(0) => Ok(PinState::Low),
            PinArg::Int(1) => Ok(PinState::High),
            PinArg::Int(v) => Err(GpioError::InvalidState(format!(
                "{v}, must be 0 or 1"
            ))),
        }
    }
}

impl TryFrom<&PinArg> for PullMode {
    type Error = GpioError;

    fn try_from(arg: &PinArg) -> Result<Self, Self::Error> {
        match arg {
            PinArg::Text(s) => s.parse(),
            PinArg::Int(code) => PullMode::from_code(*code)
                .ok_or_else(|| GpioError::InvalidPull(format!("unknown pull code {code}"))),
            PinArg::Bool(b) => Err(GpioError::InvalidPull(format!("{b} is not a pull mode"))),
        }
    }
}

/// Loosely typed pin setup parameters, as accepted from callers and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRequest {
    pub mode: PinArg,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<PinArg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_up_down: Option<PinArg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SetupRequest {
    pub fn new(mode: impl Into<PinArg>) -> Self {
        Self {
            mode: mode.into(),
            initial: None,
            pull_up_down: None,
            description: None,
        }
    }

    pub fn with_initial(mut self, initial: impl Into<PinArg>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    pub fn with_pull(mut self, pull: impl Into<PinArg>) -> Self {
        self.pull_up_down = Some(pull.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Resolves every loose field into its canonical form.
    ///
    /// A pull setting on an output and an initial level on an input carry no
    /// meaning; both are dropped here so backends only see coherent configs.
    pub fn normalize(&self) -> Result<PinConfig, GpioError> {
        let mode = PinMode::try_from(&self.mode)?;
        let pull = self
            .pull_up_down
            .as_ref()
            .map(PullMode::try_from)
            .transpose()?
            .unwrap_or_default();
        let initial = self
            .initial
            .as_ref()
            .map(PinState::try_from)
            .transpose()?;

        let config = match mode {
            PinMode::Input => {
                if initial.is_some() {
                    debug!("ignoring initial level for input pin");
                }
                PinConfig {
                    mode,
                    pull,
                    initial: None,
                    description: self.description.clone(),
                }
            }
            PinMode::Output => {
                if pull != PullMode::None {
                    debug!("ignoring pull {} for output pin", pull.as_str());
                }
                PinConfig {
                    mode,
                    pull: PullMode::None,
                    initial,
                    description: self.description.clone(),
                }
            }
        };
        Ok(config)
    }
}

impl From<&PinConfig> for SetupRequest {
    fn from(config: &PinConfig) -> Self {
        Self {
            mode: config.mode.into(),
            initial: config.initial.map(PinArg::from),
            pull_up_down: (config.mode == PinMode::Input).then(|| config.pull.into()),
            description: config.description.clone(),
        }
    }
}

/// Canonical pin configuration handed to backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConfig {
    pub mode: PinMode,
    pub pull: PullMode,
    pub initial: Option<PinState>,
    pub description: Option<String>,
}

impl PinConfig {
    pub fn output(initial: PinState) -> Self {
        Self {
            mode: PinMode::Output,
            pull: PullMode::None,
            initial: Some(initial),
            description: None,
        }
    }

    pub fn input(pull: PullMode) -> Self {
        Self {
            mode: PinMode::Input,
            pull,
            initial: None,
            description: None,
        }
    }
}

/// One or more pin ids targeted by a single setup call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSet(Vec<u32>);

impl PinSet {
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl From<u32> for PinSet {
    fn from(pin: u32) -> Self {
        PinSet(vec![pin])
    }
}

impl From<Vec<u32>> for PinSet {
    fn from(pins: Vec<u32>) -> Self {
        PinSet(pins)
    }
}

impl From<&[u32]> for PinSet {
    fn from(pins: &[u32]) -> Self {
        PinSet(pins.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for PinSet {
    fn from(pins: [u32; N]) -> Self {
        PinSet(pins.to_vec())
    }
}

/// Introspection view of a configured pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinInfo {
    pub mode: PinMode,
    pub pull: PullMode,
    pub state: PinState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Hardware,
    Simulated,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Hardware => "hardware",
            BackendKind::Simulated => "simulated",
            BackendKind::Remote => "remote",
        })
    }
}

/// Log level for permissive substitutions: loud only when warnings are on.
pub(crate) fn lenient_level(warnings: bool) -> Level {
    if warnings { Level::Warn } else { Level::Debug }
}

/// Numbering mode shared by every backend, set during initialization.
pub(crate) struct NumberingSlot {
    mode: RwLock<NumberingMode>,
    strict: bool,
    warnings: bool,
}

impl NumberingSlot {
    pub(crate) fn new(config: &GpioConfig) -> Self {
        Self {
            mode: RwLock::new(NumberingMode::Unknown),
            strict: config.strict,
            warnings: config.warnings,
        }
    }

    pub(crate) fn get(&self) -> NumberingMode {
        *self.mode.read()
    }

    pub(crate) fn set(&self, mode: NumberingMode) -> Result<(), GpioError> {
        if mode == NumberingMode::Unknown {
            if self.strict {
                return Err(GpioError::InvalidMode(
                    "numbering mode must be BCM or BOARD".into(),
                ));
            }
            log!(
                lenient_level(self.warnings),
                "ignoring invalid numbering mode, keeping {}",
                self.get()
            );
            return Ok(());
        }

        *self.mode.write() = mode;
        debug!("GPIO numbering mode set to {mode}");
        Ok(())
    }
}

pub trait GpioBackend: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn numbering(&self) -> NumberingMode;
    fn set_numbering(&self, mode: NumberingMode) -> Result<(), GpioError>;

    fn configure(
        &self,
        pin: u32,
        config: &PinConfig,
    ) -> impl Future<Output = Result<(), GpioError>> + Send;
    fn write(&self, pin: u32, state: PinState)
    -> impl Future<Output = Result<(), GpioError>> + Send;
    fn read(&self, pin: u32) -> impl Future<Output = Result<PinState, GpioError>> + Send;
    /// Releases one pin, or every pin when `pin` is `None`. Clearing an
    /// unconfigured pin is not an error.
    fn clear(&self, pin: Option<u32>) -> impl Future<Output = Result<(), GpioError>> + Send;
    /// `None` when the pin is not configured.
    fn describe(
        &self,
        pin: u32,
    ) -> impl Future<Output = Result<Option<PinInfo>, GpioError>> + Send;
    fn configured(
        &self,
    ) -> impl Future<Output = Result<FxHashMap<u32, PinState>, GpioError>> + Send;
}

pub struct GenericGpioManager<B: GpioBackend> {
    config: Arc<AppConfig>,
    backend: OnceCell<B>,
}

impl GenericGpioManager<Backend> {
    /// Creates an uninitialized manager; call [`initialize`](Self::initialize) before use.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            backend: OnceCell::new(),
        }
    }

    /// Selects the active backend once. Later calls return the existing choice.
    pub async fn initialize(&self) -> Result<BackendKind, GpioError> {
        let backend = self
            .backend
            .get_or_try_init(|| Backend::select(&self.config))
            .await?;
        info!(
            "GPIO manager initialized with {} backend in {} mode",
            backend.kind(),
            backend.numbering()
        );
        Ok(backend.kind())
    }
}

impl<B: GpioBackend> GenericGpioManager<B> {
    /// Creates a manager around an already constructed backend.
    pub fn with_backend(config: Arc<AppConfig>, backend: B) -> Self {
        Self {
            config,
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn active_backend(&self) -> Option<&B> {
        self.backend.get()
    }

    fn backend(&self) -> Result<&B, GpioError> {
        self.backend.get().ok_or(GpioError::NotInitialized)
    }

    fn pin_range(&self) -> Range<u32> {
        self.numbering_mode().pin_range(self.config.gpio.pin_count)
    }

    fn check_pin(&self, pin: u32) -> Result<(), GpioError> {
        let range = self.pin_range();
        if !range.contains(&pin) {
            return Err(GpioError::InvalidPin(format!(
                "{pin} is outside {}..{} in {} mode",
                range.start,
                range.end,
                self.numbering_mode()
            )));
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.get().map(GpioBackend::kind)
    }

    pub fn is_remote(&self) -> bool {
        self.backend_kind() == Some(BackendKind::Remote)
    }

    pub fn numbering_mode(&self) -> NumberingMode {
        self.backend
            .get()
            .map(GpioBackend::numbering)
            .unwrap_or(NumberingMode::Unknown)
    }

    /// Configures every pin in `pins` with the same parameters, in order.
    /// Stops at the first failure; pins configured before it stay configured.
    pub async fn setup(
        &self,
        pins: impl Into<PinSet>,
        request: &SetupRequest,
    ) -> Result<(), GpioError> {
        let backend = self.backend()?;
        let config = request.normalize()?;

        for pin in pins.into().iter() {
            self.check_pin(pin)?;
            backend.configure(pin, &config).await?;
            debug!("pin {pin} set up as {}", config.mode);
        }
        Ok(())
    }

    pub async fn output(&self, pin: u32, value: impl Into<PinArg>) -> Result<(), GpioError> {
        let backend = self.backend()?;
        let state = PinState::try_from(&value.into())?;
        self.check_pin(pin)?;

        backend.write(pin, state).await
    }

    pub async fn input(&self, pin: u32) -> Result<bool, GpioError> {
        let backend = self.backend()?;
        self.check_pin(pin)?;

        Ok(backend.read(pin).await?.is_high())
    }

    /// Releases one pin or all of them. A no-op before initialization.
    pub async fn cleanup(&self, pin: Option<u32>) -> Result<(), GpioError> {
        let Some(backend) = self.backend.get() else {
            return Ok(());
        };
        if let Some(pin) = pin {
            self.check_pin(pin)?;
        }

        backend.clear(pin).await
    }

    pub async fn pin_info(&self, pin: u32) -> Result<Option<PinInfo>, GpioError> {
        let backend = self.backend()?;
        self.check_pin(pin)?;

        backend.describe(pin).await
    }

    pub async fn configured_pins(&self) -> Result<FxHashMap<u32, PinState>, GpioError> {
        self.backend()?.configured().await
    }

    /// Best-effort snapshot of every accepted pin id, LOW for anything not
    /// configured or unreadable. Built from one `configured()` call so a
    /// remote peer is asked once. Empty before initialization.
    pub async fn all_pin_states(&self) -> BTreeMap<u32, PinState> {
        let Some(backend) = self.backend.get() else {
            return BTreeMap::new();
        };

        let levels = backend.configured().await.unwrap_or_else(|e| {
            debug!("pin states unavailable, reporting low: {e}");
            FxHashMap::default()
        });
        self.pin_range()
            .map(|pin| (pin, levels.get(&pin).copied().unwrap_or_default()))
            .collect()
    }

    /// Global cleanup for process exit; failures are logged, not returned.
    pub async fn shutdown(&self) {
        if let Err(e) = self.cleanup(None).await {
            warn!("GPIO cleanup on shutdown failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_accept_strings_and_codes() {
        assert_eq!(PinMode::try_from(&PinArg::from("INPUT")).unwrap(), PinMode::Input);
        assert_eq!(PinMode::try_from(&PinArg::from("out")).unwrap(), PinMode::Output);
        assert_eq!(PinMode::try_from(&PinArg::from(1)).unwrap(), PinMode::Input);
        assert!(matches!(
            PinMode::try_from(&PinArg::from("pwm")),
            Err(GpioError::InvalidMode(_))
        ));
        assert!(matches!(
            PinMode::try_from(&PinArg::from(true)),
            Err(GpioError::InvalidMode(_))
        ));
    }

    #[test]
    fn states_accept_strings_bools_and_bits() {
        assert_eq!(PinState::try_from(&PinArg::from("High")).unwrap(), PinState::High);
        assert_eq!(PinState::try_from(&PinArg::from(false)).unwrap(), PinState::Low);
        assert_eq!(PinState::try_from(&PinArg::from(1)).unwrap(), PinState::High);
        assert!(matches!(
            PinState::try_from(&PinArg::from(7)),
            Err(GpioError::InvalidState(_))
        ));
        assert!(matches!(
            PinState::try_from(&PinArg::from("maybe")),
            Err(GpioError::InvalidState(_))
        ));
    }

    #[test]
    fn pulls_accept_names_and_codes() {
        assert_eq!(PullMode::try_from(&PinArg::from("PUD_UP")).unwrap(), PullMode::PullUp);
        assert_eq!(PullMode::try_from(&PinArg::from("down")).unwrap(), PullMode::PullDown);
        assert_eq!(PullMode::try_from(&PinArg::from(33)).unwrap(), PullMode::None);
        assert!(matches!(
            PullMode::try_from(&PinArg::from(20)),
            Err(GpioError::InvalidPull(_))
        ));
    }

    #[test]
    fn normalize_drops_meaningless_fields() {
        let output = SetupRequest::new("output")
            .with_pull("up")
            .with_initial("high")
            .normalize()
            .unwrap();
        assert_eq!(output.pull, PullMode::None);
        assert_eq!(output.initial, Some(PinState::High));

        let input = SetupRequest::new("input")
            .with_pull("up")
            .with_initial(1)
            .normalize()
            .unwrap();
        assert_eq!(input.pull, PullMode::PullUp);
        assert_eq!(input.initial, None);
    }

    #[test]
    fn setup_request_reads_wire_json() {
        let request: SetupRequest =
            serde_json::from_str(r#"{"mode":"output","initial":"high","pull_up_down":null}"#)
                .unwrap();
        let config = request.normalize().unwrap();
        assert_eq!(config, PinConfig::output(PinState::High));
    }

    #[test]
    fn permissive_numbering_keeps_previous_mode() {
        let config = GpioConfig {
            strict: false,
            ..GpioConfig::default()
        };
        let slot = NumberingSlot::new(&config);
        slot.set(NumberingMode::Board).unwrap();
        slot.set(NumberingMode::Unknown).unwrap();
        assert_eq!(slot.get(), NumberingMode::Board);

        let strict = NumberingSlot::new(&GpioConfig::default());
        assert_eq!(NumberingMode::Board.pin_range(40), 1..41);
        assert_eq!(NumberingMode::Bcm.pin_range(40), 0..40);
        assert!(matches!(
            strict.set(NumberingMode::Unknown),
            Err(GpioError::InvalidMode(_))
        ));
    }
}
