// crates/pinball-rs/src/modes/trough.rs
use crate::game::{GameAction, GameContext};
use crate::mode::{Mode, ModeCore, SwitchEvent};
use crate::types::{Activation, EventResult, Lifecycle};
use log::{debug, info, warn};
use serde_json::json;

const ACTION_TROUGH: &str = "trough_ball";
const ACTION_LAUNCH: &str = "shooter_lane_cleared";
const DELAY_BALL_SAVE: &str = "ball_save";

/// Owns the ball lifecycle: serving balls out of the trough, counting balls
/// in play, multiball detection, the ball-save window and the drain policy.
///
/// Trough switches are normally-closed optos, so Active means a ball is
/// resting on the switch.
pub struct TroughMode {
    core: ModeCore,
    trough_switches: Vec<String>,
    eject_coil: String,
    shooter_lane: String,
    /// Ball-save window length; 0 disables the save entirely.
    pub auto_ball_save_secs: f64,
    launch_pending: bool,
    save_active: bool,
    drained_handlers: Vec<Box<dyn FnMut(&mut GameContext)>>,
}

impl TroughMode {
    pub fn new(
        trough_switches: Vec<String>,
        eject_coil: impl Into<String>,
        shooter_lane: impl Into<String>,
        auto_ball_save_secs: f64,
    ) -> Self {
        Self {
            core: ModeCore::new("trough", 20, Lifecycle::Game),
            trough_switches,
            eject_coil: eject_coil.into(),
            shooter_lane: shooter_lane.into(),
            auto_ball_save_secs,
            launch_pending: false,
            save_active: false,
            drained_handlers: Vec::new(),
        }
    }

    /// Registers a drain subscriber. When any subscriber exists, a drain
    /// that empties the playfield notifies the subscribers instead of
    /// ending the ball, and one of them owns the `EndBall` call.
    pub fn on_ball_drained(&mut self, handler: impl FnMut(&mut GameContext) + 'static) {
        self.drained_handlers.push(Box::new(handler));
    }

    /// Ejects one ball into the shooter lane. Game code calls this to add
    /// balls for multiball; the launch is counted when the shooter lane
    /// clears.
    pub fn serve_ball(&mut self, cx: &mut GameContext) {
        self.eject(cx);
    }

    fn eject(&mut self, cx: &mut GameContext) {
        info!("[TROUGH] Ejecting ball");
        cx.pulse(&self.eject_coil);
        self.launch_pending = true;
    }

    fn handle_drain(&mut self, cx: &mut GameContext) {
        if self.save_active {
            info!("[TROUGH] Ball drained inside save window, re-ejecting");
            cx.post("ball_saved", None);
            self.eject(cx);
            return;
        }
        if !self.drained_handlers.is_empty() {
            debug!(
                "[TROUGH] Drain deferred to {} subscriber(s)",
                self.drained_handlers.len()
            );
            let mut handlers = std::mem::take(&mut self.drained_handlers);
            for handler in handlers.iter_mut() {
                handler(cx);
            }
            self.drained_handlers = handlers;
            return;
        }
        cx.push_action(GameAction::EndBall);
    }
}

impl Mode for TroughMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        let switches = self.trough_switches.clone();
        for switch in switches {
            self.core
                .handle_switch(switch, Activation::Active, ACTION_TROUGH);
        }
        let shooter = self.shooter_lane.clone();
        self.core
            .handle_switch(shooter, Activation::Inactive, ACTION_LAUNCH);
    }

    fn ball_starting(&mut self, cx: &mut GameContext) {
        cx.balls_in_play = 0;
        self.save_active = self.auto_ball_save_secs > 0.0;
        self.core.cancel_delay(DELAY_BALL_SAVE);
        self.eject(cx);
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        match action {
            ACTION_LAUNCH => {
                if self.launch_pending {
                    self.launch_pending = false;
                    cx.balls_in_play += 1;
                    info!("[TROUGH] Ball launched, {} in play", cx.balls_in_play);
                    if cx.balls_in_play == 2 {
                        let balls = cx.balls_in_play;
                        cx.post("multiball_started", Some(json!({ "balls_in_play": balls })));
                    }
                    // The save clock runs from the launch, not the eject.
                    if self.save_active && self.auto_ball_save_secs > 0.0 {
                        self.core.delay(
                            cx.now_us,
                            self.auto_ball_save_secs,
                            Some(DELAY_BALL_SAVE),
                        );
                    }
                }
                EventResult::Continue
            }
            ACTION_TROUGH => {
                if !cx.game_in_progress() {
                    return EventResult::Continue;
                }
                if self.launch_pending {
                    // Settling after an eject; not a drain.
                    debug!("[TROUGH] '{}' settled during eject", event.name);
                    return EventResult::Continue;
                }
                let was = cx.balls_in_play;
                cx.balls_in_play = cx.balls_in_play.saturating_sub(1);
                info!(
                    "[TROUGH] Ball drained ({} -> {} in play)",
                    was, cx.balls_in_play
                );
                if was == 2 && cx.balls_in_play == 1 {
                    cx.post("multiball_ended", None);
                }
                if cx.balls_in_play == 0 {
                    self.handle_drain(cx);
                }
                EventResult::Continue
            }
            _ => {
                warn!("[TROUGH] Unexpected action '{}'", action);
                EventResult::Continue
            }
        }
    }

    fn delay_fired(&mut self, name: &str, _cx: &mut GameContext) {
        if name == DELAY_BALL_SAVE {
            debug!("[TROUGH] Ball-save window closed");
            self.save_active = false;
        }
    }
}
