// crates/pinball-rs/src/machine.rs
use crate::device::{Coil, DeviceCollection, Led, Switch};
use crate::hal::{HardwarePlatform, PinballError};
use crate::types::HwAddress;
use log::{debug, info};

/// A flipper reflex recorded at declaration time.
///
/// Parameters are kept after installation so the tilt mode can remove the
/// rule and later re-install it with identical values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipperRule {
    pub switch: HwAddress,
    pub coil: HwAddress,
    pub pulse_ms: u16,
    pub hold_power: f32,
}

/// A bumper reflex recorded at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumperRule {
    pub switch: HwAddress,
    pub coil: HwAddress,
    pub pulse_ms: u16,
}

/// Declarative registration of devices and hardware rules.
///
/// The embedding game populates the collections and rule lists up front;
/// device name resolution fails fast at declaration time. `configure`
/// forwards the recorded rules to the platform and runs exactly once,
/// after the platform is connected and before the game loop starts.
#[derive(Debug, Default)]
pub struct MachineConfig {
    pub switches: DeviceCollection<Switch>,
    pub coils: DeviceCollection<Coil>,
    pub leds: DeviceCollection<Led>,
    flipper_rules: Vec<FlipperRule>,
    bumper_rules: Vec<BumperRule>,
    configured: bool,
}

impl MachineConfig {
    pub fn new() -> Self {
        Self {
            switches: DeviceCollection::new(),
            coils: DeviceCollection::new(),
            leds: DeviceCollection::new(),
            flipper_rules: Vec::new(),
            bumper_rules: Vec::new(),
            configured: false,
        }
    }

    pub fn add_switch(&mut self, switch: Switch) -> Result<(), PinballError> {
        self.switches.insert(switch)
    }

    pub fn add_coil(&mut self, coil: Coil) -> Result<(), PinballError> {
        self.coils.insert(coil)
    }

    pub fn add_led(&mut self, led: Led) -> Result<(), PinballError> {
        self.leds.insert(led)
    }

    /// Declares a flipper rule by device names, failing fast on a typo.
    pub fn add_flipper_rule(
        &mut self,
        switch_name: &str,
        coil_name: &str,
        pulse_ms: u16,
        hold_power: f32,
    ) -> Result<(), PinballError> {
        let rule = FlipperRule {
            switch: self.switches.address_of(switch_name)?,
            coil: self.coils.address_of(coil_name)?,
            pulse_ms,
            hold_power,
        };
        debug!(
            "[MACHINE] Flipper rule declared: {} -> {} ({} ms, hold {})",
            switch_name, coil_name, pulse_ms, hold_power
        );
        self.flipper_rules.push(rule);
        Ok(())
    }

    /// Declares a bumper rule by device names, failing fast on a typo.
    pub fn add_bumper_rule(
        &mut self,
        switch_name: &str,
        coil_name: &str,
        pulse_ms: u16,
    ) -> Result<(), PinballError> {
        let rule = BumperRule {
            switch: self.switches.address_of(switch_name)?,
            coil: self.coils.address_of(coil_name)?,
            pulse_ms,
        };
        debug!(
            "[MACHINE] Bumper rule declared: {} -> {} ({} ms)",
            switch_name, coil_name, pulse_ms
        );
        self.bumper_rules.push(rule);
        Ok(())
    }

    /// Installs every declared hardware rule on the platform. Runs exactly
    /// once; a second call is a configuration error.
    pub fn configure(&mut self, platform: &mut dyn HardwarePlatform) -> Result<(), PinballError> {
        if self.configured {
            return Err(PinballError::AlreadyConfigured);
        }
        for rule in &self.flipper_rules {
            platform.configure_flipper_rule(rule.switch, rule.coil, rule.pulse_ms, rule.hold_power)?;
        }
        for rule in &self.bumper_rules {
            platform.configure_bumper_rule(rule.switch, rule.coil, rule.pulse_ms)?;
        }
        self.configured = true;
        info!(
            "[MACHINE] Configured: {} switches, {} coils, {} LEDs, {} flipper rules, {} bumper rules",
            self.switches.len(),
            self.coils.len(),
            self.leds.len(),
            self.flipper_rules.len(),
            self.bumper_rules.len()
        );
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn flipper_rules(&self) -> &[FlipperRule] {
        &self.flipper_rules
    }

    pub fn bumper_rules(&self) -> &[BumperRule] {
        &self.bumper_rules
    }
}
