// crates/pinball-rs/tests/simulator/mod.rs
#![allow(dead_code)]

pub mod platform;

pub use platform::{HardwareCommand, SimulatedPlatform};

use pinball_rs::device::{Coil, Led, Switch};
use pinball_rs::{
    GameController, HwAddress, MachineConfig, MediaSink, OperatorSettings, SwitchChange,
    SwitchState, SwitchTags, SwitchType,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// A media sink that appends every posted event to a shared list.
pub struct RecordingMediaSink {
    events: Rc<RefCell<Vec<(String, Option<Value>)>>>,
}

impl RecordingMediaSink {
    pub fn new(events: Rc<RefCell<Vec<(String, Option<Value>)>>>) -> Self {
        Self { events }
    }
}

impl MediaSink for RecordingMediaSink {
    fn post(&mut self, event: &str, payload: Option<Value>) {
        self.events.borrow_mut().push((event.to_string(), payload));
    }
}

/// The canonical three-ball test machine used across the integration tests.
pub fn test_machine() -> MachineConfig {
    let mut machine = MachineConfig::new();

    machine
        .add_switch(
            Switch::new("start", HwAddress(0x01), SwitchType::NormallyOpen)
                .with_tags(SwitchTags::START),
        )
        .unwrap();
    machine
        .add_switch(
            Switch::new("tilt_bob", HwAddress(0x02), SwitchType::NormallyOpen)
                .with_tags(SwitchTags::TILT),
        )
        .unwrap();
    machine
        .add_switch(Switch::new(
            "slam_tilt",
            HwAddress(0x03),
            SwitchType::NormallyOpen,
        ))
        .unwrap();
    machine
        .add_switch(
            Switch::new("shooter_lane", HwAddress(0x04), SwitchType::NormallyOpen)
                .with_tags(SwitchTags::SHOOTER_LANE),
        )
        .unwrap();
    for (name, addr) in [
        ("trough_1", 0x05u16),
        ("trough_2", 0x06),
        ("trough_3", 0x07),
    ] {
        machine
            .add_switch(
                Switch::new(name, HwAddress(addr), SwitchType::NormallyClosed)
                    .with_tags(SwitchTags::TROUGH),
            )
            .unwrap();
    }
    machine
        .add_switch(Switch::new(
            "flipper_left",
            HwAddress(0x08),
            SwitchType::NormallyOpen,
        ))
        .unwrap();
    machine
        .add_switch(Switch::new(
            "flipper_right",
            HwAddress(0x09),
            SwitchType::NormallyOpen,
        ))
        .unwrap();
    for (name, addr) in [
        ("sling_left", 0x0Au16),
        ("target_a", 0x0B),
        ("target_b", 0x0C),
    ] {
        machine
            .add_switch(
                Switch::new(name, HwAddress(addr), SwitchType::NormallyOpen)
                    .with_tags(SwitchTags::PLAYFIELD),
            )
            .unwrap();
    }
    machine
        .add_switch(
            Switch::new("eos_left", HwAddress(0x0D), SwitchType::NormallyOpen)
                .with_tags(SwitchTags::EOS),
        )
        .unwrap();
    machine
        .add_switch(
            Switch::new("service_enter", HwAddress(0x0E), SwitchType::NormallyOpen)
                .with_tags(SwitchTags::SERVICE),
        )
        .unwrap();

    machine
        .add_coil(Coil::new("trough_eject", HwAddress(0x40), 20))
        .unwrap();
    machine
        .add_coil(Coil::new("flipper_left_main", HwAddress(0x41), 30))
        .unwrap();
    machine
        .add_coil(Coil::new("flipper_right_main", HwAddress(0x42), 30))
        .unwrap();
    machine
        .add_coil(Coil::new("sling_left_kicker", HwAddress(0x43), 15))
        .unwrap();
    machine
        .add_coil(Coil::new("bank_reset", HwAddress(0x44), 40))
        .unwrap();
    machine
        .add_led(Led::new("start_button", HwAddress(0x80)))
        .unwrap();

    machine
        .add_flipper_rule("flipper_left", "flipper_left_main", 30, 0.25)
        .unwrap();
    machine
        .add_flipper_rule("flipper_right", "flipper_right_main", 30, 0.25)
        .unwrap();
    machine
        .add_bumper_rule("sling_left", "sling_left_kicker", 15)
        .unwrap();

    machine
}

/// Wraps a controller, the simulated board's command log and the recorded
/// media stream behind a virtual clock.
pub struct GameHarness {
    pub game: GameController,
    pub commands: Rc<RefCell<Vec<HardwareCommand>>>,
    pub media: Rc<RefCell<Vec<(String, Option<Value>)>>>,
    pub now_us: u64,
}

impl GameHarness {
    pub fn new(settings: OperatorSettings) -> Self {
        let commands = Rc::new(RefCell::new(Vec::new()));
        let media = Rc::new(RefCell::new(Vec::new()));
        // All three balls start in the trough (NC optos read Open).
        let platform = SimulatedPlatform::new(commands.clone())
            .with_initial_state(HwAddress(0x05), SwitchState::Open)
            .with_initial_state(HwAddress(0x06), SwitchState::Open)
            .with_initial_state(HwAddress(0x07), SwitchState::Open);
        let game = GameController::new(
            Box::new(platform),
            test_machine(),
            Box::new(RecordingMediaSink::new(media.clone())),
            settings,
        );
        Self {
            game,
            commands,
            media,
            now_us: 0,
        }
    }

    pub fn startup(&mut self) {
        self.game.startup().unwrap();
        self.step();
    }

    /// Runs one loop iteration at the current virtual time.
    pub fn step(&mut self) {
        self.game.step(self.now_us);
    }

    /// Advances the virtual clock and runs one loop iteration.
    pub fn advance(&mut self, secs: f64) {
        self.now_us += (secs * 1_000_000.0) as u64;
        self.step();
    }

    /// Injects a raw switch transition and processes it.
    pub fn set_switch(&mut self, name: &str, state: SwitchState) {
        let address = self.game.cx.machine.switches.address_of(name).unwrap();
        self.game
            .event_sender()
            .send(SwitchChange { address, state })
            .unwrap();
        self.step();
    }

    /// A full press-and-release of a normally-open switch.
    pub fn press(&mut self, name: &str) {
        self.set_switch(name, SwitchState::Closed);
        self.set_switch(name, SwitchState::Open);
    }

    pub fn media_names(&self) -> Vec<String> {
        self.media.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn has_media(&self, name: &str) -> bool {
        self.media.borrow().iter().any(|(n, _)| n == name)
    }

    pub fn count_media(&self, name: &str) -> usize {
        self.media.borrow().iter().filter(|(n, _)| n == name).count()
    }

    pub fn last_payload(&self, name: &str) -> Option<Value> {
        self.media
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .and_then(|(_, p)| p.clone())
    }

    pub fn pulses_of(&self, coil: HwAddress) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| matches!(c, HardwareCommand::Pulse { coil: a, .. } if *a == coil))
            .count()
    }

    pub fn clear_logs(&mut self) {
        self.commands.borrow_mut().clear();
        self.media.borrow_mut().clear();
    }
}
