// crates/pinball-rs/src/modes/bonus.rs
use crate::game::{GameAction, GameContext};
use crate::mode::{Mode, ModeCore};
use crate::types::Lifecycle;
use log::{debug, info};
use serde_json::json;

const DELAY_STEP: &str = "bonus_step";

/// End-of-ball bonus countdown.
///
/// Bonus accumulates during the ball; `start_bonus` awards
/// `bonus * multiplier` points in fixed-size steps separated by the step
/// interval, then ends the ball. A zero total ends the ball immediately.
pub struct BonusMode {
    core: ModeCore,
    bonus: i64,
    multiplier: i64,
    /// Points awarded per countdown step.
    pub step_size: i64,
    /// Pause between countdown steps, in seconds.
    pub step_interval_secs: f64,
    remaining: i64,
    awarded: i64,
    running: bool,
}

impl BonusMode {
    pub fn new() -> Self {
        Self {
            core: ModeCore::new("bonus", 30, Lifecycle::Ball),
            bonus: 0,
            multiplier: 1,
            step_size: 1000,
            step_interval_secs: 0.1,
            remaining: 0,
            awarded: 0,
            running: false,
        }
    }

    pub fn bonus(&self) -> i64 {
        self.bonus
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier
    }

    pub fn add_bonus(&mut self, points: i64) {
        self.bonus += points;
        debug!("[BONUS] +{} (total {})", points, self.bonus);
    }

    /// Sets the bonus multiplier, clamped to at least 1.
    pub fn set_multiplier(&mut self, multiplier: i64) {
        self.multiplier = multiplier.max(1);
    }

    /// Starts the countdown. The ball ends when it completes.
    pub fn start_bonus(&mut self, cx: &mut GameContext) {
        let total = self.bonus * self.multiplier;
        info!(
            "[BONUS] Countdown: {} x {} = {}",
            self.bonus, self.multiplier, total
        );
        let (bonus, multiplier) = (self.bonus, self.multiplier);
        cx.post(
            "bonus_started",
            Some(json!({ "bonus": bonus, "multiplier": multiplier, "total": total })),
        );
        if total == 0 {
            cx.post("bonus_completed", Some(json!({ "awarded": 0 })));
            cx.push_action(GameAction::EndBall);
            return;
        }
        self.remaining = total;
        self.awarded = 0;
        self.running = true;
        self.core
            .delay(cx.now_us, self.step_interval_secs, Some(DELAY_STEP));
    }
}

impl Default for BonusMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for BonusMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        self.bonus = 0;
        self.multiplier = 1;
        self.remaining = 0;
        self.awarded = 0;
        self.running = false;
    }

    fn delay_fired(&mut self, name: &str, cx: &mut GameContext) {
        if name != DELAY_STEP || !self.running {
            return;
        }
        let step = self.step_size.min(self.remaining);
        self.remaining -= step;
        self.awarded += step;
        if let Some(player) = cx.player_mut() {
            player.add_score(step);
        }
        let remaining = self.remaining;
        cx.post(
            "bonus_step",
            Some(json!({ "awarded": step, "remaining": remaining })),
        );
        if self.remaining == 0 {
            self.running = false;
            let awarded = self.awarded;
            info!("[BONUS] Countdown complete, {} awarded", awarded);
            cx.post("bonus_completed", Some(json!({ "awarded": awarded })));
            cx.push_action(GameAction::EndBall);
        } else {
            self.core
                .delay(cx.now_us, self.step_interval_secs, Some(DELAY_STEP));
        }
    }
}
