// crates/pinball-rs/src/modes/tilt.rs
use crate::game::{GameAction, GameContext};
use crate::mode::{Mode, ModeCore, SwitchEvent};
use crate::types::{Activation, EventResult, Lifecycle};
use log::{debug, info, warn};
use serde_json::json;

const ACTION_TILT_BOB: &str = "tilt_bob";
const ACTION_SLAM: &str = "slam_tilt";

/// Watches the tilt bob and the slam-tilt switch.
///
/// Each debounced bob hit costs a warning; past the operator's allowance
/// the ball tilts: every flipper hardware rule is removed so the player
/// loses the flippers for the rest of the ball, and they are re-installed
/// with identical parameters when the mode stops at ball end.
pub struct TiltMode {
    core: ModeCore,
    tilt_switch: String,
    slam_switch: Option<String>,
    /// Bob hits closer together than this are one swing, not two.
    pub cooldown_secs: f64,
    warnings: u32,
    tilted: bool,
    last_hit_us: Option<u64>,
}

impl TiltMode {
    pub fn new(tilt_switch: impl Into<String>, slam_switch: Option<String>) -> Self {
        Self {
            core: ModeCore::new("tilt", 40, Lifecycle::Ball),
            tilt_switch: tilt_switch.into(),
            slam_switch,
            cooldown_secs: 0.5,
            warnings: 0,
            tilted: false,
            last_hit_us: None,
        }
    }

    pub fn is_tilted(&self) -> bool {
        self.tilted
    }

    pub fn warnings(&self) -> u32 {
        self.warnings
    }

    fn tilt(&mut self, cx: &mut GameContext) {
        info!("[TILT] Tilted, removing flipper rules");
        self.tilted = true;
        for rule in cx.machine.flipper_rules().to_vec() {
            if let Err(e) = cx.platform.remove_hardware_rule(rule.switch) {
                warn!("[TILT] Could not remove flipper rule: {}", e);
            }
        }
        cx.post("tilt", None);
    }

    fn bob_hit(&mut self, cx: &mut GameContext) -> EventResult {
        if self.tilted {
            return EventResult::Stop;
        }
        let cooldown_us = (self.cooldown_secs * 1_000_000.0) as u64;
        if let Some(last) = self.last_hit_us {
            if cx.now_us.saturating_sub(last) < cooldown_us {
                debug!("[TILT] Bob bounce swallowed");
                return EventResult::Stop;
            }
        }
        self.last_hit_us = Some(cx.now_us);
        self.warnings += 1;
        let allowed = cx.settings.tilt_warnings;
        if self.warnings <= allowed {
            info!("[TILT] Warning {}/{}", self.warnings, allowed);
            let warning = self.warnings;
            cx.post(
                "tilt_warning",
                Some(json!({ "warning": warning, "allowed": allowed })),
            );
        } else {
            self.tilt(cx);
        }
        EventResult::Stop
    }
}

impl Mode for TiltMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        self.warnings = 0;
        self.tilted = false;
        self.last_hit_us = None;
        let tilt_switch = self.tilt_switch.clone();
        self.core
            .handle_switch(tilt_switch, Activation::Active, ACTION_TILT_BOB);
        if let Some(slam) = self.slam_switch.clone() {
            self.core.handle_switch(slam, Activation::Active, ACTION_SLAM);
        }
    }

    fn mode_stopped(&mut self, cx: &mut GameContext) {
        if !self.tilted {
            return;
        }
        info!("[TILT] Restoring flipper rules for the next ball");
        for rule in cx.machine.flipper_rules().to_vec() {
            if let Err(e) = cx.platform.configure_flipper_rule(
                rule.switch,
                rule.coil,
                rule.pulse_ms,
                rule.hold_power,
            ) {
                warn!("[TILT] Could not restore flipper rule: {}", e);
            }
        }
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        _event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        match action {
            ACTION_TILT_BOB => self.bob_hit(cx),
            ACTION_SLAM => {
                warn!("[TILT] Slam tilt");
                cx.post("slam_tilt", None);
                cx.push_action(GameAction::EndGame);
                EventResult::Stop
            }
            _ => EventResult::Continue,
        }
    }
}
