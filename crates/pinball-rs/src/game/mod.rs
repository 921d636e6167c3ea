// crates/pinball-rs/src/game/mod.rs
pub mod context;
mod lifecycle;

pub use context::{GameAction, GameContext};

use crate::device::Device;
use crate::hal::{HardwarePlatform, MediaSink, OperatorSettings, PinballError};
use crate::machine::MachineConfig;
use crate::mode::{ModeHandle, ModeQueue, SwitchEvent};
use crate::types::{Lifecycle, SwitchChange};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// The game controller: owns the mode queue, the lifecycle registry and the
/// switch-event pipeline, and runs the cooperative single-threaded game
/// loop.
///
/// The platform's switch producer is the only thing that runs off this
/// thread; its events are serialized through an MPSC channel drained at the
/// top of every loop iteration.
pub struct GameController {
    pub cx: GameContext,
    pub queue: ModeQueue,
    pub(crate) registered: Vec<(ModeHandle, Lifecycle)>,
    events_tx: Sender<SwitchChange>,
    events_rx: Receiver<SwitchChange>,
    last_tick_us: Option<u64>,
    started_up: bool,
}

impl GameController {
    pub fn new(
        platform: Box<dyn HardwarePlatform>,
        machine: MachineConfig,
        media: Box<dyn MediaSink>,
        settings: OperatorSettings,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            cx: GameContext::new(machine, platform, media, settings),
            queue: ModeQueue::new(),
            registered: Vec::new(),
            events_tx,
            events_rx,
            last_tick_us: None,
            started_up: false,
        }
    }

    /// Records a mode under a lifecycle. `None` uses the mode's declared
    /// default. System modes registered after startup are added
    /// immediately; Game and Ball modes are added by the lifecycle
    /// transitions, Manual modes never.
    pub fn register_mode(&mut self, mode: ModeHandle, lifecycle: Option<Lifecycle>) {
        let lifecycle = lifecycle.unwrap_or_else(|| mode.borrow().core().lifecycle());
        debug!(
            "[GAME] Registered mode '{}' as {:?}",
            mode.borrow().core().name(),
            lifecycle
        );
        self.registered.push((mode.clone(), lifecycle));
        if lifecycle == Lifecycle::System && self.started_up {
            if let Err(e) = self.queue.add(mode, &mut self.cx) {
                warn!("[GAME] Could not add system mode: {}", e);
            }
        }
    }

    /// Startup sequence: connect the platform, apply the machine
    /// configuration, seed switch states, subscribe to the change stream
    /// and add System-lifecycle modes.
    pub fn startup(&mut self) -> Result<(), PinballError> {
        if self.started_up {
            return Err(PinballError::InternalError("startup called twice"));
        }
        info!("[GAME] Starting up");
        self.cx.platform.connect()?;
        {
            let (machine, platform) = self.cx.devices_and_platform();
            machine.configure(platform)?;
        }
        let initial = self.cx.platform.initial_switch_states()?;
        for (address, state) in initial {
            match self.cx.machine.switches.get_by_address_mut(address) {
                Some(sw) => sw.set_state(state, 0),
                None => warn!(
                    "[GAME] Initial state for unknown switch address {}",
                    address
                ),
            }
        }
        self.cx.platform.subscribe(self.events_tx.clone());
        self.started_up = true;
        self.add_lifecycle_modes(Lifecycle::System);
        self.process_actions();
        info!("[GAME] Startup complete, {} modes active", self.queue.len());
        Ok(())
    }

    /// One loop iteration at the given monotonic time: drain the inbound
    /// switch queue, fire due delays, then tick every mode. Deferred
    /// lifecycle actions are executed between phases.
    pub fn step(&mut self, now_us: u64) {
        self.cx.now_us = now_us;
        let delta_secs = match self.last_tick_us {
            Some(last) => (now_us.saturating_sub(last)) as f64 / 1e6,
            None => 0.0,
        };
        self.last_tick_us = Some(now_us);

        while let Ok(change) = self.events_rx.try_recv() {
            self.handle_switch_change(change, now_us);
            self.process_actions();
        }

        self.queue.dispatch_delays(now_us, &mut self.cx);
        self.process_actions();

        self.queue.tick_modes(delta_secs, &mut self.cx);
        self.process_actions();
    }

    /// Runs the game loop until `shutdown` is raised, then disconnects the
    /// platform cleanly. Calls `startup` first if the caller has not.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), PinballError> {
        if !self.started_up {
            self.startup()?;
        }
        let start = Instant::now();
        info!("[GAME] Entering main loop");
        while !shutdown.load(Ordering::Relaxed) {
            let now_us = start.elapsed().as_micros() as u64;
            self.step(now_us);
            // Cooperative yield; delays are the only timing primitive modes
            // get, so the loop just has to come around often enough.
            thread::sleep(Duration::from_millis(1));
        }
        info!("[GAME] Shutdown requested, disconnecting platform");
        self.cx.platform.disconnect()
    }

    fn handle_switch_change(&mut self, change: SwitchChange, now_us: u64) {
        let event = {
            let Some(sw) = self.cx.machine.switches.get_by_address_mut(change.address) else {
                warn!(
                    "[GAME] Ignoring event from unknown switch address {}",
                    change.address
                );
                return;
            };
            if sw.state() == change.state {
                trace!(
                    "[GAME] Duplicate state {:?} for '{}', dropped",
                    change.state,
                    sw.name()
                );
                return;
            }
            sw.set_state(change.state, now_us);
            SwitchEvent {
                name: sw.name().to_string(),
                state: sw.state(),
                active: sw.is_active(),
                tags: sw.tags(),
            }
        };
        debug!(
            "[GAME] Switch '{}' -> {:?} (active: {})",
            event.name, event.state, event.active
        );
        self.queue.dispatch(&event, now_us, &mut self.cx);
    }

    /// Executes every deferred lifecycle action queued by mode callbacks.
    /// Actions may queue further actions (EndBall chains into StartBall);
    /// the drain runs until the queue is empty.
    pub(crate) fn process_actions(&mut self) {
        while let Some(action) = self.cx.take_action() {
            trace!("[GAME] Executing action {}", action.kind());
            match action {
                GameAction::StartGame => self.start_game(),
                GameAction::AddPlayer => self.add_player(),
                GameAction::StartBall => self.start_ball(),
                GameAction::EndBall => self.end_ball(),
                GameAction::EndGame => self.end_game(),
                GameAction::AddMode(mode) => {
                    if let Err(e) = self.queue.add(mode, &mut self.cx) {
                        warn!("[GAME] AddMode failed: {}", e);
                    }
                }
                GameAction::AddChildMode { parent, child } => {
                    if let Err(e) = self.queue.add_child(&parent, child, &mut self.cx) {
                        warn!("[GAME] AddChildMode failed: {}", e);
                    }
                }
                GameAction::RemoveMode(mode) => {
                    self.queue.remove(&mode, &mut self.cx);
                }
                GameAction::RemoveModeByName(name) => {
                    self.queue.remove_by_name(name, &mut self.cx);
                }
            }
        }
    }

    /// The sender half of the switch-change channel, for platforms that are
    /// constructed around an externally owned producer.
    pub fn event_sender(&self) -> Sender<SwitchChange> {
        self.events_tx.clone()
    }
}
