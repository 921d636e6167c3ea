// crates/pinball-rs/src/device/coil.rs
use super::Device;
use crate::hal::{HardwarePlatform, PinballError};
use crate::types::HwAddress;
use log::debug;

/// A solenoid driver.
///
/// Carries a software `enabled` gate owned by the game loop: while disabled,
/// `pulse` and `hold` are silently dropped and `Disable` is idempotently
/// issued to the hardware instead. The service mode uses this gate to make
/// the playfield safe.
#[derive(Debug, Clone)]
pub struct Coil {
    name: String,
    address: HwAddress,
    default_pulse_ms: u16,
    enabled: bool,
}

impl Coil {
    pub fn new(name: impl Into<String>, address: HwAddress, default_pulse_ms: u16) -> Self {
        Self {
            name: name.into(),
            address,
            default_pulse_ms,
            enabled: true,
        }
    }

    pub fn default_pulse_ms(&self) -> u16 {
        self.default_pulse_ms
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fires the coil for its default pulse duration.
    pub fn pulse(&self, platform: &mut dyn HardwarePlatform) -> Result<(), PinballError> {
        self.pulse_for(self.default_pulse_ms, platform)
    }

    /// Fires the coil for an explicit duration.
    pub fn pulse_for(
        &self,
        pulse_ms: u16,
        platform: &mut dyn HardwarePlatform,
    ) -> Result<(), PinballError> {
        if !self.enabled {
            debug!("[COIL] '{}' disabled, dropping pulse", self.name);
            return platform.disable_coil(self.address);
        }
        platform.pulse_coil(self.address, pulse_ms)
    }

    /// Energizes the coil until disabled.
    pub fn hold(&self, platform: &mut dyn HardwarePlatform) -> Result<(), PinballError> {
        if !self.enabled {
            debug!("[COIL] '{}' disabled, dropping hold", self.name);
            return platform.disable_coil(self.address);
        }
        platform.hold_coil(self.address)
    }

    /// De-energizes the coil.
    pub fn disable(&self, platform: &mut dyn HardwarePlatform) -> Result<(), PinballError> {
        platform.disable_coil(self.address)
    }

    /// Flips the software gate. Disabling also de-energizes the hardware so
    /// a held coil cannot stay live behind a closed gate.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        platform: &mut dyn HardwarePlatform,
    ) -> Result<(), PinballError> {
        self.enabled = enabled;
        if !enabled {
            platform.disable_coil(self.address)?;
        }
        Ok(())
    }
}

impl Device for Coil {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> HwAddress {
        self.address
    }
}
