// crates/pinball-rs/examples/sim_game.rs
//
// Runs a three-ball game against an in-process simulated board. The
// "player" is a background thread replaying a scripted sequence of switch
// transitions, which also exercises the cross-thread event pipeline.
//
// Run with: RUST_LOG=info cargo run --example sim_game

use crossbeam_channel::Sender;
use log::info;
use pinball_rs::device::{Coil, Switch};
use pinball_rs::modes::{AttractMode, TroughMode};
use pinball_rs::{
    mode_handle, GameController, HardwarePlatform, HwAddress, MachineConfig, MediaSink,
    OperatorSettings, PinballError, Rgb, SwitchChange, SwitchState, SwitchTags, SwitchType,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A board whose "player" is a scripted background thread.
struct ScriptedPlatform {
    script: Vec<(u64, SwitchChange)>,
    initial: BTreeMap<HwAddress, SwitchState>,
}

impl ScriptedPlatform {
    fn new(script: Vec<(u64, SwitchChange)>, initial: BTreeMap<HwAddress, SwitchState>) -> Self {
        Self { script, initial }
    }
}

impl HardwarePlatform for ScriptedPlatform {
    fn connect(&mut self) -> Result<(), PinballError> {
        info!("[SIM] Board connected");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), PinballError> {
        info!("[SIM] Board disconnected");
        Ok(())
    }

    fn initial_switch_states(&mut self) -> Result<BTreeMap<HwAddress, SwitchState>, PinballError> {
        Ok(self.initial.clone())
    }

    fn subscribe(&mut self, events: Sender<SwitchChange>) {
        let script = self.script.clone();
        // The producer runs on its own thread, like a real board driver.
        thread::spawn(move || {
            for (delay_ms, change) in script {
                thread::sleep(Duration::from_millis(delay_ms));
                if events.send(change).is_err() {
                    break;
                }
            }
        });
    }

    fn pulse_coil(&mut self, addr: HwAddress, pulse_ms: u16) -> Result<(), PinballError> {
        info!("[SIM] PULSE {} for {} ms", addr, pulse_ms);
        Ok(())
    }

    fn hold_coil(&mut self, addr: HwAddress) -> Result<(), PinballError> {
        info!("[SIM] HOLD {}", addr);
        Ok(())
    }

    fn disable_coil(&mut self, addr: HwAddress) -> Result<(), PinballError> {
        info!("[SIM] DISABLE {}", addr);
        Ok(())
    }

    fn configure_flipper_rule(
        &mut self,
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
        hold_power: f32,
    ) -> Result<(), PinballError> {
        info!(
            "[SIM] Flipper rule {} -> {} ({} ms, hold {})",
            switch, coil, pulse_ms, hold_power
        );
        Ok(())
    }

    fn configure_bumper_rule(
        &mut self,
        switch: HwAddress,
        coil: HwAddress,
        pulse_ms: u16,
    ) -> Result<(), PinballError> {
        info!("[SIM] Bumper rule {} -> {} ({} ms)", switch, coil, pulse_ms);
        Ok(())
    }

    fn remove_hardware_rule(&mut self, switch: HwAddress) -> Result<(), PinballError> {
        info!("[SIM] Rule removed for {}", switch);
        Ok(())
    }

    fn set_led(&mut self, _addr: HwAddress, _color: Rgb) -> Result<(), PinballError> {
        Ok(())
    }

    fn set_led_run(&mut self, _first: HwAddress, _colors: &[Rgb]) -> Result<(), PinballError> {
        Ok(())
    }
}

/// Prints every media event to the console.
struct ConsoleMedia;

impl MediaSink for ConsoleMedia {
    fn post(&mut self, event: &str, payload: Option<serde_json::Value>) {
        match payload {
            Some(p) => println!(">> {} {}", event, p),
            None => println!(">> {}", event),
        }
    }
}

const SW_START: HwAddress = HwAddress(0x01);
const SW_SHOOTER: HwAddress = HwAddress(0x02);
const SW_TROUGH_1: HwAddress = HwAddress(0x03);
const SW_SLING: HwAddress = HwAddress(0x04);

fn build_machine() -> Result<MachineConfig, PinballError> {
    let mut machine = MachineConfig::new();
    machine.add_switch(
        Switch::new("start", SW_START, SwitchType::NormallyOpen).with_tags(SwitchTags::START),
    )?;
    machine.add_switch(
        Switch::new("shooter_lane", SW_SHOOTER, SwitchType::NormallyOpen)
            .with_tags(SwitchTags::SHOOTER_LANE),
    )?;
    machine.add_switch(
        Switch::new("trough_1", SW_TROUGH_1, SwitchType::NormallyClosed)
            .with_tags(SwitchTags::TROUGH),
    )?;
    machine.add_switch(
        Switch::new("sling_left", SW_SLING, SwitchType::NormallyOpen)
            .with_tags(SwitchTags::PLAYFIELD),
    )?;
    machine.add_coil(Coil::new("trough_eject", HwAddress(0x40), 20))?;
    Ok(machine)
}

/// One ball of play: press start (first ball only), serve, plunge, a few
/// playfield hits, then drain.
fn script() -> Vec<(u64, SwitchChange)> {
    let mut steps = Vec::new();
    let mut push = |delay_ms, address, state| {
        steps.push((delay_ms, SwitchChange { address, state }));
    };

    push(500, SW_START, SwitchState::Closed);
    push(50, SW_START, SwitchState::Open);
    for _ in 0..3 {
        // Ball leaves the trough and reaches the shooter lane.
        push(300, SW_TROUGH_1, SwitchState::Closed);
        push(200, SW_SHOOTER, SwitchState::Closed);
        // Plunge.
        push(400, SW_SHOOTER, SwitchState::Open);
        // Some playfield action.
        for _ in 0..4 {
            push(250, SW_SLING, SwitchState::Closed);
            push(50, SW_SLING, SwitchState::Open);
        }
        // Drain.
        push(500, SW_TROUGH_1, SwitchState::Open);
    }

    steps
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = OperatorSettings {
        ball_save_seconds: 0.0,
        ..OperatorSettings::default()
    };
    let initial = BTreeMap::from([(SW_TROUGH_1, SwitchState::Open)]);
    let platform = ScriptedPlatform::new(script(), initial);

    let mut game = GameController::new(
        Box::new(platform),
        build_machine()?,
        Box::new(ConsoleMedia),
        settings.clone(),
    );

    game.register_mode(mode_handle(AttractMode::new("start")), None);
    game.register_mode(
        mode_handle(TroughMode::new(
            vec!["trough_1".to_string()],
            "trough_eject",
            "shooter_lane",
            settings.ball_save_seconds,
        )),
        None,
    );
    // Let the scripted game play out, then stop the loop.
    let shutdown = Arc::new(AtomicBool::new(false));
    let stopper = shutdown.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(15));
        stopper.store(true, Ordering::Relaxed);
    });

    game.run(&shutdown)?;
    info!("[SIM] Done");
    Ok(())
}
