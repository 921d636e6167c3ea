// crates/pinball-rs/tests/simulator/platform.rs
use crossbeam_channel::Sender;
use pinball_rs::{HardwarePlatform, HwAddress, PinballError, Rgb, SwitchChange, SwitchState};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Every command the core issued to the simulated board, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCommand {
    Pulse { coil: HwAddress, pulse_ms: u16 },
    Hold { coil: HwAddress },
    Disable { coil: HwAddress },
    FlipperRule {
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
        hold_power: f32,
    },
    BumperRule {
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
    },
    RemoveRule { switch: HwAddress },
    Led { addr: HwAddress, color: Rgb },
}

/// A board that records every command into a shared log.
///
/// The test keeps a clone of the log handle; the platform itself moves
/// into the controller.
pub struct SimulatedPlatform {
    initial: BTreeMap<HwAddress, SwitchState>,
    commands: Rc<RefCell<Vec<HardwareCommand>>>,
    connected: bool,
}

impl SimulatedPlatform {
    pub fn new(commands: Rc<RefCell<Vec<HardwareCommand>>>) -> Self {
        Self {
            initial: BTreeMap::new(),
            commands,
            connected: false,
        }
    }

    pub fn with_initial_state(mut self, address: HwAddress, state: SwitchState) -> Self {
        self.initial.insert(address, state);
        self
    }

    fn record(&self, command: HardwareCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl HardwarePlatform for SimulatedPlatform {
    fn connect(&mut self) -> Result<(), PinballError> {
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), PinballError> {
        self.connected = false;
        Ok(())
    }

    fn initial_switch_states(&mut self) -> Result<BTreeMap<HwAddress, SwitchState>, PinballError> {
        if !self.connected {
            return Err(PinballError::PlatformFault("not connected"));
        }
        Ok(self.initial.clone())
    }

    fn subscribe(&mut self, _events: Sender<SwitchChange>) {
        // Tests inject events through the controller's own sender; nothing
        // is produced from this side.
    }

    fn pulse_coil(&mut self, addr: HwAddress, pulse_ms: u16) -> Result<(), PinballError> {
        self.record(HardwareCommand::Pulse {
            coil: addr,
            pulse_ms,
        });
        Ok(())
    }

    fn hold_coil(&mut self, addr: HwAddress) -> Result<(), PinballError> {
        self.record(HardwareCommand::Hold { coil: addr });
        Ok(())
    }

    fn disable_coil(&mut self, addr: HwAddress) -> Result<(), PinballError> {
        self.record(HardwareCommand::Disable { coil: addr });
        Ok(())
    }

    fn configure_flipper_rule(
        &mut self,
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
        hold_power: f32,
    ) -> Result<(), PinballError> {
        self.record(HardwareCommand::FlipperRule {
            switch,
            coil,
            pulse_ms,
            hold_power,
        });
        Ok(())
    }

    fn configure_bumper_rule(
        &mut self,
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
    ) -> Result<(), PinballError> {
        self.record(HardwareCommand::BumperRule {
            switch,
            coil,
            pulse_ms,
        });
        Ok(())
    }

    fn remove_hardware_rule(&mut self, switch: HwAddress) -> Result<(), PinballError> {
        self.record(HardwareCommand::RemoveRule { switch });
        Ok(())
    }

    fn set_led(&mut self, addr: HwAddress, color: Rgb) -> Result<(), PinballError> {
        self.record(HardwareCommand::Led { addr, color });
        Ok(())
    }

    fn set_led_run(&mut self, first: HwAddress, colors: &[Rgb]) -> Result<(), PinballError> {
        for (offset, color) in colors.iter().enumerate() {
            self.record(HardwareCommand::Led {
                addr: HwAddress(first.0 + offset as u16),
                color: *color,
            });
        }
        Ok(())
    }
}
