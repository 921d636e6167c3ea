// crates/pinball-rs/src/hal.rs
use crate::types::{HwAddress, Rgb, SwitchChange, SwitchState};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Defines a portable, descriptive Error type for the pinball core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinballError {
    /// A device with the same symbolic name is already registered.
    DuplicateName(String),
    /// A device with the same hardware address is already registered.
    DuplicateAddress(HwAddress),
    /// A registration or rule helper referenced a name that does not exist.
    NoSuchDevice(String),
    /// `MachineConfig::configure` was called a second time.
    AlreadyConfigured,
    /// An operation requires `MachineConfig::configure` to have run first.
    NotConfigured,
    /// The same mode instance was added to the queue twice.
    ModeAlreadyActive(&'static str),
    /// The platform backend failed to connect, disconnect or execute a command.
    PlatformFault(&'static str),
    /// A persistence backend failed to load or save.
    Storage(String),
    /// Internal logic error.
    InternalError(&'static str),
}

impl fmt::Display for PinballError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "Duplicate device name: {}", name),
            Self::DuplicateAddress(addr) => write!(f, "Duplicate hardware address: {}", addr),
            Self::NoSuchDevice(name) => write!(f, "No such device: {}", name),
            Self::AlreadyConfigured => write!(f, "Machine configuration already applied"),
            Self::NotConfigured => write!(f, "Machine configuration has not been applied"),
            Self::ModeAlreadyActive(name) => {
                write!(f, "Mode '{}' is already in the queue", name)
            }
            Self::PlatformFault(s) => write!(f, "Platform fault: {}", s),
            Self::Storage(s) => write!(f, "Storage error: {}", s),
            Self::InternalError(s) => write!(f, "Internal error: {}", s),
        }
    }
}

impl std::error::Error for PinballError {}

/// Hardware platform seam.
///
/// This trait abstracts the physical driver board, enabling the core game
/// logic to remain board-agnostic. Every backend (real board, in-process
/// simulator, test double) satisfies the same contract.
///
/// `connect` must complete before any other method is called. Switch
/// transitions are delivered through the `Sender` handed to `subscribe`;
/// the producer may run on any thread and must not assume the consumer is
/// re-entrant. All other methods are invoked from the game loop only.
pub trait HardwarePlatform {
    /// Establishes the connection to the board.
    fn connect(&mut self) -> Result<(), PinballError>;

    /// Tears the connection down. Called once when the game loop exits.
    fn disconnect(&mut self) -> Result<(), PinballError>;

    /// Returns the ground-truth switch states at boot, keyed by hardware
    /// address.
    fn initial_switch_states(&mut self) -> Result<BTreeMap<HwAddress, SwitchState>, PinballError>;

    /// Registers the channel on which the platform publishes switch
    /// transitions. May be called exactly once, after `connect`.
    fn subscribe(&mut self, events: Sender<SwitchChange>);

    /// Fires a coil for `pulse_ms` milliseconds.
    fn pulse_coil(&mut self, addr: HwAddress, pulse_ms: u16) -> Result<(), PinballError>;

    /// Energizes a coil until `disable_coil` is issued.
    fn hold_coil(&mut self, addr: HwAddress) -> Result<(), PinballError>;

    /// De-energizes a coil. Idempotent.
    fn disable_coil(&mut self, addr: HwAddress) -> Result<(), PinballError>;

    /// Installs a flipper rule: the switch fires the coil locally, with an
    /// initial pulse followed by a PWM hold, without a host round-trip.
    /// The rule is authoritative until removed.
    fn configure_flipper_rule(
        &mut self,
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
        hold_power: f32,
    ) -> Result<(), PinballError>;

    /// Installs a bumper rule: the switch pulses the coil locally.
    fn configure_bumper_rule(
        &mut self,
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
    ) -> Result<(), PinballError>;

    /// Removes any local rule installed for the given switch.
    fn remove_hardware_rule(&mut self, switch: HwAddress) -> Result<(), PinballError>;

    /// Writes a single LED color.
    fn set_led(&mut self, addr: HwAddress, color: Rgb) -> Result<(), PinballError>;

    /// Writes a contiguous run of LED colors starting at `first`.
    fn set_led_run(&mut self, first: HwAddress, colors: &[Rgb]) -> Result<(), PinballError>;
}

/// Outbound named-event hook consumed by the game controller and modes.
///
/// `post` is called only from the game loop. Implementations are expected
/// to drop events silently on transport failure; they must never propagate
/// a failure back into the game.
pub trait MediaSink {
    fn post(&mut self, event: &str, payload: Option<Value>);
}

/// A media sink that discards every event. Useful for tests and headless
/// operation.
#[derive(Debug, Default)]
pub struct NullMediaSink;

impl MediaSink for NullMediaSink {
    fn post(&mut self, _event: &str, _payload: Option<Value>) {}
}

/// Operator-adjustable settings loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorSettings {
    pub balls_per_game: u32,
    pub max_players: usize,
    pub tilt_warnings: u32,
    pub ball_save_seconds: f64,
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            balls_per_game: 3,
            max_players: 4,
            tilt_warnings: 2,
            ball_save_seconds: 8.0,
        }
    }
}

/// A trait for abstracting the storage of operator settings.
///
/// `load` returns `OperatorSettings::default()` when the backing store does
/// not exist yet.
pub trait SettingsStore {
    fn load(&mut self) -> Result<OperatorSettings, PinballError>;
    fn save(&mut self, settings: &OperatorSettings) -> Result<(), PinballError>;
}

/// One row of the persisted high-score table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: i64,
    /// ISO `YYYY-MM-DD` date the score was recorded.
    pub date: String,
}

/// A trait for abstracting the storage of the high-score table.
///
/// `load` returns entries ordered highest first, or an empty list on empty
/// storage. `save` receives the list already ordered and truncated.
pub trait HighScoreStore {
    fn load(&mut self) -> Result<Vec<HighScoreEntry>, PinballError>;
    fn save(&mut self, entries: &[HighScoreEntry]) -> Result<(), PinballError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = OperatorSettings::default();
        assert_eq!(s.balls_per_game, 3);
        assert_eq!(s.max_players, 4);
        assert_eq!(s.tilt_warnings, 2);
        assert_eq!(s.ball_save_seconds, 8.0);
    }

    #[test]
    fn test_error_display() {
        let e = PinballError::NoSuchDevice("flipper_left".into());
        assert_eq!(format!("{}", e), "No such device: flipper_left");
    }
}
