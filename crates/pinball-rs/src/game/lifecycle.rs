// crates/pinball-rs/src/game/lifecycle.rs
//
// The game lifecycle state machine: Idle (ball = 0) and BallInProgress
// (ball >= 1), driven by start_game / start_ball / end_ball / end_game.

use super::GameController;
use crate::mode::queue::LifecycleEvent;
use crate::player::Player;
use crate::types::Lifecycle;
use log::{debug, info, warn};
use serde_json::json;

impl GameController {
    /// Starts a new game: clears players, creates player 1, sets ball = 1,
    /// adds Game-lifecycle modes and starts the first ball. Idempotent when
    /// a game is already in progress.
    pub fn start_game(&mut self) {
        if self.cx.game_in_progress() {
            debug!("[GAME] start_game ignored, game already in progress");
            return;
        }
        info!("[GAME] Game started");
        self.cx.players.clear();
        self.cx.players.push(Player::new("Player 1"));
        self.cx.current_player = 0;
        self.cx.ball = 1;
        let balls_per_game = self.cx.settings.balls_per_game;
        self.cx.post(
            "game_started",
            Some(json!({ "player": 1, "balls_per_game": balls_per_game })),
        );
        self.add_lifecycle_modes(Lifecycle::Game);
        self.queue.broadcast(LifecycleEvent::GameStarted, &mut self.cx);
        self.start_ball();
    }

    /// Appends a player. The attract mode owns the "ball 1, before the
    /// first plunge" policy; this only enforces the hard limits.
    pub fn add_player(&mut self) {
        if !self.cx.game_in_progress() {
            warn!("[GAME] add_player ignored, no game in progress");
            return;
        }
        if self.cx.players.len() >= self.cx.settings.max_players {
            debug!("[GAME] add_player ignored, table is full");
            return;
        }
        let number = self.cx.players.len() + 1;
        self.cx.players.push(Player::new(format!("Player {}", number)));
        info!("[GAME] Player {} added", number);
        let total = self.cx.players.len();
        self.cx.post(
            "player_added",
            Some(json!({ "player": number, "total_players": total })),
        );
    }

    /// Starts a ball for the current player: adds Ball-lifecycle modes not
    /// already active, clears the player's ball-scoped state before any
    /// handler can run on the new ball, and records the ball start time.
    pub fn start_ball(&mut self) {
        let player_number = self.cx.current_player + 1;
        info!(
            "[GAME] Ball {} starting for player {}",
            self.cx.ball, player_number
        );
        self.add_lifecycle_modes(Lifecycle::Ball);
        if let Some(player) = self.cx.player_mut() {
            player.clear_ball_state();
        }
        let ball = self.cx.ball;
        self.cx.post(
            "ball_starting",
            Some(json!({ "ball": ball, "player": player_number })),
        );
        self.queue.broadcast(LifecycleEvent::BallStarting, &mut self.cx);
        self.cx.ball_start_us = self.cx.now_us;
    }

    /// Ends the current ball: books elapsed time, removes Ball-lifecycle
    /// modes, then either replays (extra ball), advances the player, or
    /// ends the game once the last player has played the last ball.
    pub fn end_ball(&mut self) {
        if !self.cx.game_in_progress() {
            warn!("[GAME] end_ball ignored, no game in progress");
            return;
        }
        let elapsed_secs = (self.cx.now_us.saturating_sub(self.cx.ball_start_us)) as f64 / 1e6;
        let player_number = self.cx.current_player + 1;
        let ball = self.cx.ball;
        let score = match self.cx.player_mut() {
            Some(player) => {
                player.game_time_secs += elapsed_secs;
                player.score
            }
            None => 0,
        };
        info!(
            "[GAME] Ball {} ended for player {} (score {})",
            ball, player_number, score
        );
        self.cx.post(
            "ball_ended",
            Some(json!({ "ball": ball, "player": player_number, "score": score })),
        );
        self.queue.broadcast(LifecycleEvent::BallEnded, &mut self.cx);
        self.remove_lifecycle_modes(Lifecycle::Ball);

        let replay = match self.cx.player_mut() {
            Some(player) if player.extra_balls > 0 => {
                player.extra_balls -= 1;
                true
            }
            _ => false,
        };
        if replay {
            info!("[GAME] Extra ball for player {}", player_number);
            self.start_ball();
            return;
        }

        if self.cx.current_player + 1 >= self.cx.players.len() {
            self.cx.current_player = 0;
            self.cx.ball += 1;
        } else {
            self.cx.current_player += 1;
        }

        if self.cx.ball > self.cx.settings.balls_per_game {
            self.end_game();
        } else {
            self.start_ball();
        }
    }

    /// Ends the game: removes any remaining Ball-lifecycle modes (the slam
    /// tilt path arrives here mid-ball) and all Game-lifecycle modes, then
    /// returns to idle.
    pub fn end_game(&mut self) {
        if !self.cx.game_in_progress() {
            debug!("[GAME] end_game ignored, no game in progress");
            return;
        }
        info!("[GAME] Game ended");
        self.remove_lifecycle_modes(Lifecycle::Ball);
        self.remove_lifecycle_modes(Lifecycle::Game);
        let scores: Vec<_> = self
            .cx
            .players
            .iter()
            .map(|p| json!({ "name": p.name, "score": p.score }))
            .collect();
        self.cx.post("game_ended", Some(json!({ "scores": scores })));
        self.cx.ball = 0;
        self.queue.broadcast(LifecycleEvent::GameEnded, &mut self.cx);
    }

    pub(super) fn add_lifecycle_modes(&mut self, lifecycle: Lifecycle) {
        for (mode, mode_lifecycle) in self.registered.clone() {
            if mode_lifecycle == lifecycle && !self.queue.contains(&mode) {
                if let Err(e) = self.queue.add(mode, &mut self.cx) {
                    warn!("[GAME] Could not add {:?} mode: {}", lifecycle, e);
                }
            }
        }
    }

    pub(super) fn remove_lifecycle_modes(&mut self, lifecycle: Lifecycle) {
        for (mode, mode_lifecycle) in self.registered.clone() {
            if mode_lifecycle == lifecycle {
                self.queue.remove(&mode, &mut self.cx);
            }
        }
    }
}
