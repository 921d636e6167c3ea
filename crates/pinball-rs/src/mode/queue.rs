// crates/pinball-rs/src/mode/queue.rs
use super::delay::DelayKind;
use super::{hold_delay_name, Mode, SwitchEvent};
use crate::game::GameContext;
use crate::hal::PinballError;
use crate::types::EventResult;
use log::{debug, info, trace};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to an active or registered mode.
pub type ModeHandle = Rc<RefCell<dyn Mode>>;

struct Entry {
    mode: ModeHandle,
    priority: i32,
    /// Set when this mode was added as a child; removal of the owner
    /// cascades here.
    owner: Option<ModeHandle>,
}

/// Which lifecycle notification to broadcast to active modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    GameStarted,
    BallStarting,
    BallEnded,
    GameEnded,
}

/// The ordered collection of active modes.
///
/// Modes are kept sorted by descending priority with stable ties
/// (first-added wins). Dispatch and ticking iterate a snapshot so that
/// adds and removes requested during a pass are tolerated.
#[derive(Default)]
pub struct ModeQueue {
    entries: Vec<Entry>,
}

impl ModeQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, mode: &ModeHandle) -> bool {
        self.entries.iter().any(|e| Rc::ptr_eq(&e.mode, mode))
    }

    /// Active mode names in dispatch order.
    pub fn active_names(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|e| e.mode.borrow().core().name())
            .collect()
    }

    /// Adds a mode, re-sorts by priority and invokes `mode_started`.
    /// Adding an instance that is already in the queue is an error.
    pub fn add(&mut self, mode: ModeHandle, cx: &mut GameContext) -> Result<(), PinballError> {
        self.insert(mode, None, cx)
    }

    /// Adds `child` owned by `parent`: removing the parent cascades to the
    /// child. Adding a child that is already active is a no-op.
    pub fn add_child(
        &mut self,
        parent: &ModeHandle,
        child: ModeHandle,
        cx: &mut GameContext,
    ) -> Result<(), PinballError> {
        if self.contains(&child) {
            debug!(
                "[QUEUE] Child mode '{}' already active, ignoring",
                child.borrow().core().name()
            );
            return Ok(());
        }
        self.insert(child, Some(parent.clone()), cx)
    }

    fn insert(
        &mut self,
        mode: ModeHandle,
        owner: Option<ModeHandle>,
        cx: &mut GameContext,
    ) -> Result<(), PinballError> {
        let (name, priority) = {
            let m = mode.borrow();
            (m.core().name(), m.core().priority())
        };
        if self.contains(&mode) {
            return Err(PinballError::ModeAlreadyActive(name));
        }
        self.entries.push(Entry {
            mode: mode.clone(),
            priority,
            owner,
        });
        // Stable sort: equal priorities keep insertion order, so the
        // first-added mode wins ties.
        self.entries.sort_by(|a, b| b.priority.cmp(&a.priority));
        info!("[QUEUE] Added mode '{}' (priority {})", name, priority);
        mode.borrow_mut().mode_started(cx);
        Ok(())
    }

    /// Removes a mode and cascades to its children. `mode_stopped` runs
    /// after removal, so queue queries from within it observe the
    /// post-removal state. Removing a non-member is a silent no-op.
    pub fn remove(&mut self, mode: &ModeHandle, cx: &mut GameContext) -> bool {
        let Some(pos) = self.entries.iter().position(|e| Rc::ptr_eq(&e.mode, mode)) else {
            return false;
        };
        let entry = self.entries.remove(pos);
        info!(
            "[QUEUE] Removed mode '{}'",
            entry.mode.borrow().core().name()
        );
        // Handlers and delays live only while the mode is in the queue.
        entry.mode.borrow_mut().core_mut().clear_registrations();
        entry.mode.borrow_mut().mode_stopped(cx);
        let children: Vec<ModeHandle> = self
            .entries
            .iter()
            .filter(|e| e.owner.as_ref().is_some_and(|o| Rc::ptr_eq(o, mode)))
            .map(|e| e.mode.clone())
            .collect();
        for child in children {
            self.remove(&child, cx);
        }
        true
    }

    /// Removes the first active mode with the given name. Used by modes
    /// that retire themselves through a deferred action.
    pub fn remove_by_name(&mut self, name: &str, cx: &mut GameContext) -> bool {
        let handle = self
            .entries
            .iter()
            .find(|e| e.mode.borrow().core().name() == name)
            .map(|e| e.mode.clone());
        match handle {
            Some(h) => self.remove(&h, cx),
            None => false,
        }
    }

    fn snapshot(&self) -> Vec<ModeHandle> {
        self.entries.iter().map(|e| e.mode.clone()).collect()
    }

    /// Dispatches a switch event through the active modes in descending
    /// priority order. A `Stop` from any handler of a mode ends the pass;
    /// lower-priority modes never see the event.
    pub fn dispatch(&mut self, event: &SwitchEvent, now_us: u64, cx: &mut GameContext) {
        trace!(
            "[QUEUE] Dispatching {} -> {:?} (active: {})",
            event.name,
            event.state,
            self.entries.len()
        );
        for handle in self.snapshot() {
            let mut mode = handle.borrow_mut();
            let mode = &mut *mode;

            // Plan against the handler table first, then run the matched
            // actions; a callback may mutate the table for the next event
            // but never for this one.
            let mut matched: Vec<(usize, &'static str, Option<f64>)> = Vec::new();
            let mut cancelled_holds: Vec<String> = Vec::new();
            for (index, handler) in mode.core().handlers().iter().enumerate() {
                if handler.matches(event) {
                    matched.push((index, handler.action, handler.hold_secs));
                } else if let Some(hold) = handler.hold_secs {
                    if handler.matches_opposite(event) {
                        cancelled_holds.push(hold_delay_name(
                            &event.name,
                            handler.activation,
                            hold,
                        ));
                    }
                }
            }

            for name in cancelled_holds {
                mode.core_mut().delays.cancel(&name);
            }

            let mut result = EventResult::Continue;
            for (index, action, hold_secs) in matched {
                match hold_secs {
                    Some(hold) => {
                        let activation = mode.core().handlers()[index].activation;
                        let name = hold_delay_name(&event.name, activation, hold);
                        mode.core_mut().delays.schedule_kind(
                            now_us,
                            hold,
                            Some(&name),
                            DelayKind::HoldHandler {
                                handler: index,
                                switch: event.name.clone(),
                            },
                        );
                    }
                    None => {
                        if mode.switch_action(action, event, cx) == EventResult::Stop {
                            result = EventResult::Stop;
                        }
                    }
                }
            }

            if result == EventResult::Stop {
                debug!(
                    "[QUEUE] Mode '{}' stopped propagation of {}",
                    mode.core().name(),
                    event.name
                );
                break;
            }
        }
    }

    /// Fires every due delay of every active mode. Within a mode, delays
    /// fire in ascending deadline order with scheduling-order ties, and are
    /// removed before their callback runs.
    pub fn dispatch_delays(&mut self, now_us: u64, cx: &mut GameContext) {
        for handle in self.snapshot() {
            // One due batch per pass: a callback re-scheduling its own name,
            // even with a zero interval, waits for the next loop iteration.
            let due = handle.borrow_mut().core_mut().delays.take_due(now_us);
            for delay in due {
                let mut mode = handle.borrow_mut();
                let mode = &mut *mode;
                match delay.kind {
                    DelayKind::Named => {
                        trace!(
                            "[QUEUE] Delay '{}' fired for mode '{}'",
                            delay.name,
                            mode.core().name()
                        );
                        mode.delay_fired(&delay.name, cx);
                    }
                    DelayKind::HoldHandler { handler, switch } => {
                        let action = mode.core().handlers().get(handler).map(|h| h.action);
                        let event = cx.switch_event(&switch);
                        if let (Some(action), Some(event)) = (action, event) {
                            let _ = mode.switch_action(action, &event, cx);
                        }
                    }
                }
            }
        }
    }

    /// Calls every active mode's `tick` with the elapsed time.
    pub fn tick_modes(&mut self, delta_secs: f64, cx: &mut GameContext) {
        for handle in self.snapshot() {
            handle.borrow_mut().tick(cx, delta_secs);
        }
    }

    /// Broadcasts a game lifecycle notification to the active modes in
    /// priority order.
    pub(crate) fn broadcast(&mut self, event: LifecycleEvent, cx: &mut GameContext) {
        for handle in self.snapshot() {
            let mut mode = handle.borrow_mut();
            match event {
                LifecycleEvent::GameStarted => mode.game_started(cx),
                LifecycleEvent::BallStarting => mode.ball_starting(cx),
                LifecycleEvent::BallEnded => mode.ball_ended(cx),
                LifecycleEvent::GameEnded => mode.game_ended(cx),
            }
        }
    }
}
