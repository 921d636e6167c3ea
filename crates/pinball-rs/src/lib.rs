//! Runtime core of a pinball game framework.
//!
//! Turns raw hardware switch events into ordered, prioritized, cooperatively
//! scheduled game behavior: a priority mode queue, a named delay scheduler,
//! a single-threaded switch dispatch pipeline and a lifecycle registry, all
//! behind a small hardware platform seam that any board backend or simulator
//! can satisfy.

// --- Foundation Modules ---
pub mod hal;
pub mod types;

// --- Devices and Machine Configuration ---
pub mod device;
pub mod machine;

// --- Game Model ---
pub mod game;
pub mod mode;
pub mod player;

// --- Built-in Modes ---
pub mod modes;

#[cfg(test)]
pub(crate) mod testutil;

// Export the core types and the platform abstraction
pub use game::{GameAction, GameContext, GameController};
pub use hal::{
    HardwarePlatform, HighScoreEntry, HighScoreStore, MediaSink, NullMediaSink, OperatorSettings,
    PinballError, SettingsStore,
};
pub use machine::MachineConfig;
pub use mode::{mode_handle, Mode, ModeCore, ModeHandle, ModeQueue, SwitchEvent};
pub use player::{Player, StateValue};
pub use types::{
    Activation, EventResult, HwAddress, Lifecycle, Rgb, SwitchChange, SwitchState, SwitchTags,
    SwitchType,
};
