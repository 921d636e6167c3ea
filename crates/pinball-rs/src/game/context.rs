// crates/pinball-rs/src/game/context.rs
use crate::hal::{HardwarePlatform, MediaSink, OperatorSettings};
use crate::machine::MachineConfig;
use crate::mode::{ModeHandle, SwitchEvent};
use crate::player::Player;
use log::{debug, warn};
use serde_json::Value;
use std::collections::VecDeque;

/// A lifecycle effect requested by a mode callback.
///
/// Handlers and delay callbacks run while the queue is mid-dispatch, so
/// they never mutate the queue or the lifecycle directly; they enqueue an
/// action and the controller executes it between dispatch phases.
pub enum GameAction {
    StartGame,
    AddPlayer,
    StartBall,
    EndBall,
    EndGame,
    AddMode(ModeHandle),
    AddChildMode { parent: ModeHandle, child: ModeHandle },
    RemoveMode(ModeHandle),
    RemoveModeByName(&'static str),
}

impl GameAction {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            GameAction::StartGame => "StartGame",
            GameAction::AddPlayer => "AddPlayer",
            GameAction::StartBall => "StartBall",
            GameAction::EndBall => "EndBall",
            GameAction::EndGame => "EndGame",
            GameAction::AddMode(_) => "AddMode",
            GameAction::AddChildMode { .. } => "AddChildMode",
            GameAction::RemoveMode(_) => "RemoveMode",
            GameAction::RemoveModeByName(_) => "RemoveModeByName",
        }
    }
}

/// Everything a mode can reach while one of its hooks runs: devices, the
/// platform, the media sink, player data and the current game position.
///
/// The mode queue itself is deliberately not here; see `GameAction`.
pub struct GameContext {
    pub machine: MachineConfig,
    pub platform: Box<dyn HardwarePlatform>,
    pub media: Box<dyn MediaSink>,
    pub settings: OperatorSettings,
    pub players: Vec<Player>,
    /// Index into `players`; meaningless while no game is in progress.
    pub current_player: usize,
    /// Current ball number; 0 means no game is in progress.
    pub ball: u32,
    /// Live ball count, maintained by the trough mode.
    pub balls_in_play: u32,
    /// Monotonic time of the current loop iteration, in microseconds.
    pub now_us: u64,
    pub(crate) ball_start_us: u64,
    actions: VecDeque<GameAction>,
}

impl GameContext {
    pub fn new(
        machine: MachineConfig,
        platform: Box<dyn HardwarePlatform>,
        media: Box<dyn MediaSink>,
        settings: OperatorSettings,
    ) -> Self {
        Self {
            machine,
            platform,
            media,
            settings,
            players: Vec::new(),
            current_player: 0,
            ball: 0,
            balls_in_play: 0,
            now_us: 0,
            ball_start_us: 0,
            actions: VecDeque::new(),
        }
    }

    pub fn game_in_progress(&self) -> bool {
        self.ball > 0
    }

    pub fn player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.players.get_mut(self.current_player)
    }

    /// Posts a named event to the media sink.
    pub fn post(&mut self, event: &str, payload: Option<Value>) {
        debug!("[MEDIA] {} {:?}", event, payload);
        self.media.post(event, payload);
    }

    /// Pulses a coil by name for its default duration. Unknown devices and
    /// platform failures are logged and swallowed; a bad pulse must never
    /// take the game loop down.
    pub fn pulse(&mut self, coil_name: &str) {
        let Some(coil) = self.machine.coils.get(coil_name) else {
            warn!("[GAME] Pulse requested for unknown coil '{}'", coil_name);
            return;
        };
        if let Err(e) = coil.pulse(self.platform.as_mut()) {
            warn!("[GAME] Pulse of '{}' failed: {}", coil_name, e);
        }
    }

    /// Split borrow of the device tables and the platform, for callers
    /// that drive coils while iterating devices.
    pub fn devices_and_platform(&mut self) -> (&mut MachineConfig, &mut dyn HardwarePlatform) {
        (&mut self.machine, self.platform.as_mut())
    }

    /// Snapshot of a switch's current state as a dispatchable event, or
    /// `None` for an unknown name.
    pub fn switch_event(&self, name: &str) -> Option<SwitchEvent> {
        let sw = self.machine.switches.get(name)?;
        Some(SwitchEvent {
            name: name.to_string(),
            state: sw.state(),
            active: sw.is_active(),
            tags: sw.tags(),
        })
    }

    pub fn is_switch_active(&self, name: &str) -> bool {
        self.machine
            .switches
            .get(name)
            .is_some_and(|sw| sw.is_active())
    }

    /// Queues a lifecycle effect for the controller to execute after the
    /// current dispatch phase.
    pub fn push_action(&mut self, action: GameAction) {
        self.actions.push_back(action);
    }

    pub(crate) fn take_action(&mut self) -> Option<GameAction> {
        self.actions.pop_front()
    }
}
