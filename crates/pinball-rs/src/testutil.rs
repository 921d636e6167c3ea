// crates/pinball-rs/src/testutil.rs
//! Shared helpers for in-crate unit tests.

use crate::device::Switch;
use crate::game::GameContext;
use crate::hal::{HardwarePlatform, NullMediaSink, OperatorSettings, PinballError};
use crate::machine::MachineConfig;
use crate::mode::{Mode, ModeCore, SwitchEvent};
use crate::types::{
    Activation, EventResult, HwAddress, Lifecycle, Rgb, SwitchChange, SwitchState, SwitchTags,
    SwitchType,
};
use crossbeam_channel::Sender;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A platform that accepts every command and reports no switches.
pub(crate) struct NoopPlatform;

impl HardwarePlatform for NoopPlatform {
    fn connect(&mut self) -> Result<(), PinballError> {
        Ok(())
    }
    fn disconnect(&mut self) -> Result<(), PinballError> {
        Ok(())
    }
    fn initial_switch_states(&mut self) -> Result<BTreeMap<HwAddress, SwitchState>, PinballError> {
        Ok(BTreeMap::new())
    }
    fn subscribe(&mut self, _events: Sender<SwitchChange>) {}
    fn pulse_coil(&mut self, _addr: HwAddress, _pulse_ms: u16) -> Result<(), PinballError> {
        Ok(())
    }
    fn hold_coil(&mut self, _addr: HwAddress) -> Result<(), PinballError> {
        Ok(())
    }
    fn disable_coil(&mut self, _addr: HwAddress) -> Result<(), PinballError> {
        Ok(())
    }
    fn configure_flipper_rule(
        &mut self,
        _switch: HwAddress,
        _coil: HwAddress,
        _pulse_ms: u16,
        _hold_power: f32,
    ) -> Result<(), PinballError> {
        Ok(())
    }
    fn configure_bumper_rule(
        &mut self,
        _switch: HwAddress,
        _coil: HwAddress,
        _pulse_ms: u16,
    ) -> Result<(), PinballError> {
        Ok(())
    }
    fn remove_hardware_rule(&mut self, _switch: HwAddress) -> Result<(), PinballError> {
        Ok(())
    }
    fn set_led(&mut self, _addr: HwAddress, _color: Rgb) -> Result<(), PinballError> {
        Ok(())
    }
    fn set_led_run(&mut self, _first: HwAddress, _colors: &[Rgb]) -> Result<(), PinballError> {
        Ok(())
    }
}

/// A minimal machine with a few switches for dispatch tests.
pub(crate) fn get_test_machine() -> MachineConfig {
    let mut machine = MachineConfig::new();
    machine
        .add_switch(
            Switch::new("x", HwAddress(0x01), SwitchType::NormallyOpen)
                .with_tags(SwitchTags::PLAYFIELD),
        )
        .unwrap();
    machine
        .add_switch(Switch::new("y", HwAddress(0x02), SwitchType::NormallyOpen))
        .unwrap();
    machine
        .add_switch(Switch::new(
            "opto",
            HwAddress(0x03),
            SwitchType::NormallyClosed,
        ))
        .unwrap();
    machine
}

pub(crate) fn get_test_context() -> GameContext {
    GameContext::new(
        get_test_machine(),
        Box::new(NoopPlatform),
        Box::new(NullMediaSink),
        OperatorSettings::default(),
    )
}

/// Builds the event a dispatch of `name` -> `state` would produce against
/// the test machine.
pub(crate) fn make_event(cx: &mut GameContext, name: &str, state: SwitchState) -> SwitchEvent {
    let now = cx.now_us;
    let sw = cx.machine.switches.get_mut(name).unwrap();
    sw.set_state(state, now);
    cx.switch_event(name).unwrap()
}

/// A mode that records every hook invocation into a shared log.
pub(crate) struct ProbeMode {
    core: ModeCore,
    pub log: Rc<RefCell<Vec<String>>>,
    /// (switch name, activation, hold) rows registered in `mode_started`.
    pub watch: Vec<(String, Activation, Option<f64>)>,
    /// When set, every matched handler returns `Stop`.
    pub stop: bool,
}

impl ProbeMode {
    pub fn new(name: &'static str, priority: i32, log: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            core: ModeCore::new(name, priority, Lifecycle::Manual),
            log,
            watch: Vec::new(),
            stop: false,
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.core = ModeCore::new(self.core.name(), self.core.priority(), lifecycle);
        self
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl Mode for ProbeMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        self.record(format!("{}:started", self.core.name()));
        for (switch, activation, hold) in self.watch.clone() {
            match hold {
                Some(secs) => self
                    .core
                    .handle_switch_held(switch, activation, secs, "hit"),
                None => self.core.handle_switch(switch, activation, "hit"),
            }
        }
    }

    fn mode_stopped(&mut self, _cx: &mut GameContext) {
        self.record(format!("{}:stopped", self.core.name()));
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        event: &SwitchEvent,
        _cx: &mut GameContext,
    ) -> EventResult {
        self.record(format!("{}:{}:{}", self.core.name(), action, event.name));
        if self.stop {
            EventResult::Stop
        } else {
            EventResult::Continue
        }
    }

    fn delay_fired(&mut self, name: &str, _cx: &mut GameContext) {
        self.record(format!("{}:delay:{}", self.core.name(), name));
    }
}
