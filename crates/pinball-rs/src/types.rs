// crates/pinball-rs/src/types.rs
use core::fmt;
use core::ops::BitOr;

/// Physical state of a switch contact as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Open,
    Closed,
}

/// Wiring polarity of a switch.
///
/// Normally-open switches (most leaf and target switches) read `Closed` when
/// triggered; normally-closed switches (typical for trough optos) read `Open`
/// when triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchType {
    NormallyOpen,
    NormallyClosed,
}

/// The semantic direction of a switch transition a handler listens for.
///
/// `Active`/`Inactive` are polarity-aware; `Closed`/`Open` address the bare
/// wire and ignore the switch type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Active,
    Inactive,
    Closed,
    Open,
}

impl Activation {
    /// The activation a hold-duration handler is cancelled by.
    pub fn opposite(self) -> Activation {
        match self {
            Activation::Active => Activation::Inactive,
            Activation::Inactive => Activation::Active,
            Activation::Closed => Activation::Open,
            Activation::Open => Activation::Closed,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Active => write!(f, "active"),
            Activation::Inactive => write!(f, "inactive"),
            Activation::Closed => write!(f, "closed"),
            Activation::Open => write!(f, "open"),
        }
    }
}

/// A hardware address on the driver board, wrapping a `u16` for type safety.
///
/// Addresses are opaque to the core; only the platform backend interprets
/// them. The newtype prevents accidental use of a bare integer where an
/// address is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HwAddress(pub u16);

impl fmt::Display for HwAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Type-safe bitmask of switch tags used for group subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwitchTags(pub u32);

impl SwitchTags {
    pub const PLAYFIELD: Self = Self(1 << 0);
    pub const EOS: Self = Self(1 << 1);
    pub const SHOOTER_LANE: Self = Self(1 << 2);
    pub const SERVICE: Self = Self(1 << 3);
    pub const TILT: Self = Self(1 << 4);
    pub const TROUGH: Self = Self(1 << 5);
    pub const START: Self = Self(1 << 6);

    /// Returns an empty set of tags.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Checks whether all of the given tags are set.
    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Checks whether at least one of the given tags is set.
    pub fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for SwitchTags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Outcome of a switch handler invocation.
///
/// `Stop` is a dispatch-loop signal: once any handler of a mode returns it,
/// no lower-priority mode sees the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Stop,
}

/// Governs when a registered mode is automatically inserted and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Added at startup, never removed by the controller.
    System,
    /// Added by `StartGame`, removed by `EndGame`.
    Game,
    /// Added by `StartBall`, removed by `EndBall`.
    Ball,
    /// Never touched by the controller; the embedding game owns it.
    Manual,
}

/// An RGB color for LED writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const OFF: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
}

/// A raw switch transition as produced by the platform backend.
///
/// This is the only value that crosses the thread boundary between the
/// hardware producer and the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchChange {
    pub address: HwAddress,
    pub state: SwitchState,
}
