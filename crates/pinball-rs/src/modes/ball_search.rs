// crates/pinball-rs/src/modes/ball_search.rs
use crate::game::GameContext;
use crate::mode::{Mode, ModeCore, SwitchEvent};
use crate::types::{Activation, EventResult, Lifecycle, SwitchTags};
use log::{debug, info};

const ACTION_PLAYFIELD: &str = "playfield_activity";
const ACTION_EOS: &str = "eos_activity";
const ACTION_SHOOTER_ACTIVE: &str = "shooter_occupied";
const ACTION_SHOOTER_INACTIVE: &str = "shooter_cleared";
const DELAY_IDLE: &str = "ball_search_idle";
const DELAY_PULSE: &str = "ball_search_pulse";

/// Finds a stuck ball by round-robin pulsing a list of coils after the
/// playfield has been silent too long.
///
/// A ball resting in the shooter lane is not stuck; the lane switch going
/// Active suspends the idle timer and clearing the lane restarts it.
pub struct BallSearchMode {
    core: ModeCore,
    coils: Vec<String>,
    /// Playfield silence before a search starts, in seconds.
    pub idle_secs: f64,
    /// Pause between search pulses, in seconds.
    pub pulse_interval_secs: f64,
    searching: bool,
    next_coil: usize,
}

impl BallSearchMode {
    pub fn new(coils: Vec<String>) -> Self {
        Self {
            core: ModeCore::new("ball_search", 15, Lifecycle::Ball),
            coils,
            idle_secs: 15.0,
            pulse_interval_secs: 0.25,
            searching: false,
            next_coil: 0,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    fn restart_idle_timer(&mut self, cx: &GameContext) {
        self.core.delay(cx.now_us, self.idle_secs, Some(DELAY_IDLE));
    }

    fn stop_search(&mut self, cx: &mut GameContext) {
        info!("[SEARCH] Ball found, stopping search");
        self.searching = false;
        self.core.cancel_delay(DELAY_PULSE);
        cx.post("ball_search_stopped", None);
    }
}

impl Mode for BallSearchMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, cx: &mut GameContext) {
        self.searching = false;
        self.next_coil = 0;
        self.core
            .handle_tagged(SwitchTags::PLAYFIELD, Activation::Active, ACTION_PLAYFIELD);
        self.core
            .handle_tagged(SwitchTags::EOS, Activation::Active, ACTION_EOS);
        self.core.handle_tagged(
            SwitchTags::SHOOTER_LANE,
            Activation::Active,
            ACTION_SHOOTER_ACTIVE,
        );
        self.core.handle_tagged(
            SwitchTags::SHOOTER_LANE,
            Activation::Inactive,
            ACTION_SHOOTER_INACTIVE,
        );
        self.restart_idle_timer(cx);
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        _event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        match action {
            ACTION_PLAYFIELD => {
                if self.searching {
                    self.stop_search(cx);
                }
                self.restart_idle_timer(cx);
            }
            ACTION_EOS => {
                if !self.searching {
                    self.restart_idle_timer(cx);
                }
            }
            ACTION_SHOOTER_ACTIVE => {
                debug!("[SEARCH] Ball in shooter lane, idle timer suspended");
                self.core.cancel_delay(DELAY_IDLE);
            }
            ACTION_SHOOTER_INACTIVE => {
                self.restart_idle_timer(cx);
            }
            _ => {}
        }
        EventResult::Continue
    }

    fn delay_fired(&mut self, name: &str, cx: &mut GameContext) {
        match name {
            DELAY_IDLE => {
                if self.coils.is_empty() {
                    return;
                }
                info!(
                    "[SEARCH] Playfield idle for {}s, starting search",
                    self.idle_secs
                );
                self.searching = true;
                cx.post("ball_search_started", None);
                self.core.delay(cx.now_us, 0.0, Some(DELAY_PULSE));
            }
            DELAY_PULSE => {
                if !self.searching {
                    return;
                }
                let coil = self.coils[self.next_coil].clone();
                self.next_coil = (self.next_coil + 1) % self.coils.len();
                debug!("[SEARCH] Pulsing '{}'", coil);
                cx.pulse(&coil);
                self.core
                    .delay(cx.now_us, self.pulse_interval_secs, Some(DELAY_PULSE));
            }
            _ => {}
        }
    }
}
