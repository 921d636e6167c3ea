// crates/pinball-rs/src/player.rs
use std::collections::HashMap;

/// A tagged value held in a player's dynamic state maps.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Flag(bool),
}

/// Per-player game data.
///
/// Two key-value maps carry mode-defined state: *game state* lives for the
/// whole game, *ball state* is cleared at the start of every new ball.
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub score: i64,
    pub extra_balls: u32,
    /// Accumulated time at the flippers, in seconds.
    pub game_time_secs: f64,
    game_state: HashMap<String, StateValue>,
    ball_state: HashMap<String, StateValue>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            extra_balls: 0,
            game_time_secs: 0.0,
            game_state: HashMap::new(),
            ball_state: HashMap::new(),
        }
    }

    pub fn add_score(&mut self, points: i64) {
        self.score += points;
    }

    /// Drops all ball-scoped state. Called by `StartBall` before any handler
    /// runs on the new ball.
    pub fn clear_ball_state(&mut self) {
        self.ball_state.clear();
    }

    pub fn set_game_state(&mut self, key: impl Into<String>, value: StateValue) {
        self.game_state.insert(key.into(), value);
    }

    pub fn set_ball_state(&mut self, key: impl Into<String>, value: StateValue) {
        self.ball_state.insert(key.into(), value);
    }

    pub fn game_integer(&self, key: &str, default: i64) -> i64 {
        match self.game_state.get(key) {
            Some(StateValue::Integer(v)) => *v,
            _ => default,
        }
    }

    pub fn game_float(&self, key: &str, default: f64) -> f64 {
        match self.game_state.get(key) {
            Some(StateValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn game_text<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.game_state.get(key) {
            Some(StateValue::Text(v)) => v,
            _ => default,
        }
    }

    pub fn game_flag(&self, key: &str, default: bool) -> bool {
        match self.game_state.get(key) {
            Some(StateValue::Flag(v)) => *v,
            _ => default,
        }
    }

    pub fn ball_integer(&self, key: &str, default: i64) -> i64 {
        match self.ball_state.get(key) {
            Some(StateValue::Integer(v)) => *v,
            _ => default,
        }
    }

    pub fn ball_float(&self, key: &str, default: f64) -> f64 {
        match self.ball_state.get(key) {
            Some(StateValue::Float(v)) => *v,
            _ => default,
        }
    }

    pub fn ball_text<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.ball_state.get(key) {
            Some(StateValue::Text(v)) => v,
            _ => default,
        }
    }

    pub fn ball_flag(&self, key: &str, default: bool) -> bool {
        match self.ball_state.get(key) {
            Some(StateValue::Flag(v)) => *v,
            _ => default,
        }
    }

    /// Adds `by` to an integer ball-state counter, creating it at zero if
    /// missing, and returns the new value.
    pub fn increment_ball_integer(&mut self, key: &str, by: i64) -> i64 {
        let next = self.ball_integer(key, 0) + by;
        self.ball_state
            .insert(key.to_string(), StateValue::Integer(next));
        next
    }
}
