// crates/pinball-rs/src/modes/attract.rs
use crate::game::{GameAction, GameContext};
use crate::mode::{mode_handle, Mode, ModeCore, SwitchEvent};
use crate::types::{Activation, EventResult, Lifecycle};
use log::{debug, info};

const ACTION_START: &str = "start_pressed";
const DELAY_IDLE: &str = "attract_idle";
const IDLE_INTERVAL_SECS: f64 = 10.0;

/// Waits for the Start button.
///
/// With no game in progress a Start press starts one; during ball 1,
/// before the first plunge, further presses add players up to the
/// operator's maximum. On game end it spawns a game-over dwell mode.
pub struct AttractMode {
    core: ModeCore,
    start_switch: String,
    /// How long the game-over mode displays final scores.
    pub game_over_dwell_secs: f64,
}

impl AttractMode {
    pub fn new(start_switch: impl Into<String>) -> Self {
        Self {
            core: ModeCore::new("attract", 5, Lifecycle::System),
            start_switch: start_switch.into(),
            game_over_dwell_secs: 12.0,
        }
    }
}

impl Mode for AttractMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, cx: &mut GameContext) {
        let start = self.start_switch.clone();
        self.core.handle_switch(start, Activation::Active, ACTION_START);
        self.core
            .delay(cx.now_us, IDLE_INTERVAL_SECS, Some(DELAY_IDLE));
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        _event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        if action != ACTION_START {
            return EventResult::Continue;
        }
        if !cx.game_in_progress() {
            info!("[ATTRACT] Start pressed, starting game");
            cx.push_action(GameAction::StartGame);
            return EventResult::Stop;
        }
        // Player add policy: only on ball 1 and only before the first
        // plunge puts a ball in play.
        if cx.ball == 1 && cx.balls_in_play == 0 && cx.players.len() < cx.settings.max_players {
            debug!("[ATTRACT] Start pressed on ball 1, adding player");
            cx.push_action(GameAction::AddPlayer);
            return EventResult::Stop;
        }
        EventResult::Continue
    }

    fn delay_fired(&mut self, name: &str, cx: &mut GameContext) {
        if name != DELAY_IDLE {
            return;
        }
        if !cx.game_in_progress() {
            cx.post("attract_idle", None);
        }
        self.core
            .delay(cx.now_us, IDLE_INTERVAL_SECS, Some(DELAY_IDLE));
    }

    fn game_ended(&mut self, cx: &mut GameContext) {
        let game_over = mode_handle(GameOverMode::new(
            self.start_switch.clone(),
            self.game_over_dwell_secs,
        ));
        cx.push_action(GameAction::AddMode(game_over));
    }
}

/// Displays the final scores for a dwell period after a game, then removes
/// itself. A Start press during the dwell removes it immediately *without*
/// consuming the event, so the attract mode can start the next game from
/// the same press.
pub struct GameOverMode {
    core: ModeCore,
    start_switch: String,
    dwell_secs: f64,
}

const DELAY_DWELL: &str = "game_over_dwell";

impl GameOverMode {
    pub fn new(start_switch: String, dwell_secs: f64) -> Self {
        Self {
            core: ModeCore::new("game_over", 8, Lifecycle::Manual),
            start_switch,
            dwell_secs,
        }
    }
}

impl Mode for GameOverMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, cx: &mut GameContext) {
        let start = self.start_switch.clone();
        self.core.handle_switch(start, Activation::Active, ACTION_START);
        self.core.delay(cx.now_us, self.dwell_secs, Some(DELAY_DWELL));
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        _event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        if action == ACTION_START {
            debug!("[ATTRACT] Start pressed during game-over dwell");
            cx.push_action(GameAction::RemoveModeByName("game_over"));
        }
        EventResult::Continue
    }

    fn delay_fired(&mut self, name: &str, cx: &mut GameContext) {
        if name == DELAY_DWELL {
            cx.push_action(GameAction::RemoveModeByName("game_over"));
        }
    }
}
