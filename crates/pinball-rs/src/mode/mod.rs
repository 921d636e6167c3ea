// crates/pinball-rs/src/mode/mod.rs
pub mod delay;
pub mod queue;

pub use delay::DelaySet;
pub use queue::{ModeHandle, ModeQueue};

use crate::game::GameContext;
use crate::types::{Activation, EventResult, Lifecycle, SwitchState, SwitchTags};
use std::cell::RefCell;
use std::rc::Rc;

/// A resolved switch transition as seen by mode handlers.
///
/// Copied out of the device table at dispatch time so handlers never hold a
/// borrow into the registry while they run.
#[derive(Debug, Clone)]
pub struct SwitchEvent {
    pub name: String,
    pub state: SwitchState,
    /// Polarity-resolved: whether the switch is now in its triggered
    /// position.
    pub active: bool,
    pub tags: SwitchTags,
}

impl SwitchEvent {
    fn matches_activation(&self, activation: Activation) -> bool {
        match activation {
            Activation::Active => self.active,
            Activation::Inactive => !self.active,
            Activation::Closed => self.state == SwitchState::Closed,
            Activation::Open => self.state == SwitchState::Open,
        }
    }
}

/// What a handler listens to.
#[derive(Debug, Clone)]
pub enum HandlerTarget {
    /// One switch, by symbolic name (case-insensitive).
    Switch(String),
    /// Every switch carrying at least one of the given tags.
    Tagged(SwitchTags),
    /// Every switch.
    Any,
}

/// One registered switch handler row.
///
/// The action tag is routed back into `Mode::switch_action`; each mode
/// declares its own tag constants and matches on them.
#[derive(Debug, Clone)]
pub struct SwitchHandler {
    pub target: HandlerTarget,
    pub activation: Activation,
    pub action: &'static str,
    /// When set, the handler only fires after the switch has stayed in the
    /// requested activation for this long.
    pub hold_secs: Option<f64>,
}

impl SwitchHandler {
    fn target_matches(&self, event: &SwitchEvent) -> bool {
        match &self.target {
            HandlerTarget::Switch(name) => name.eq_ignore_ascii_case(&event.name),
            HandlerTarget::Tagged(tags) => event.tags.intersects(*tags),
            HandlerTarget::Any => true,
        }
    }

    pub(crate) fn matches(&self, event: &SwitchEvent) -> bool {
        self.target_matches(event) && event.matches_activation(self.activation)
    }

    /// True when the event is the opposite activation for this handler's
    /// switch, which cancels a pending hold timer.
    pub(crate) fn matches_opposite(&self, event: &SwitchEvent) -> bool {
        self.target_matches(event) && event.matches_activation(self.activation.opposite())
    }
}

/// Key under which a hold-duration handler parks its private timer.
pub(crate) fn hold_delay_name(switch: &str, activation: Activation, hold_secs: f64) -> String {
    format!("sw_{}_{}_{}", switch, activation, hold_secs)
}

/// State shared by every mode: identity, handler rows and pending delays.
///
/// Concrete modes embed a `ModeCore` and expose it through
/// `Mode::core`/`core_mut`; the queue drives dispatch through those
/// accessors.
#[derive(Debug)]
pub struct ModeCore {
    name: &'static str,
    priority: i32,
    lifecycle: Lifecycle,
    handlers: Vec<SwitchHandler>,
    pub(crate) delays: DelaySet,
}

impl ModeCore {
    pub fn new(name: &'static str, priority: i32, lifecycle: Lifecycle) -> Self {
        Self {
            name,
            priority,
            lifecycle,
            handlers: Vec::new(),
            delays: DelaySet::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn handlers(&self) -> &[SwitchHandler] {
        &self.handlers
    }

    /// Drops every handler row and pending delay. Called by the queue when
    /// the mode is removed; `mode_started` re-registers on the next add.
    pub(crate) fn clear_registrations(&mut self) {
        self.handlers.clear();
        self.delays = DelaySet::new();
    }

    /// Registers a handler for one switch. Registration order is preserved.
    pub fn handle_switch(
        &mut self,
        switch: impl Into<String>,
        activation: Activation,
        action: &'static str,
    ) {
        self.handlers.push(SwitchHandler {
            target: HandlerTarget::Switch(switch.into()),
            activation,
            action,
            hold_secs: None,
        });
    }

    /// Registers a handler that fires only after the switch has remained in
    /// `activation` for `hold_secs`. The pending fire is cancelled when the
    /// switch transitions to the opposite activation first.
    pub fn handle_switch_held(
        &mut self,
        switch: impl Into<String>,
        activation: Activation,
        hold_secs: f64,
        action: &'static str,
    ) {
        self.handlers.push(SwitchHandler {
            target: HandlerTarget::Switch(switch.into()),
            activation,
            action,
            hold_secs: Some(hold_secs),
        });
    }

    /// Registers a handler for every switch carrying one of `tags`.
    pub fn handle_tagged(&mut self, tags: SwitchTags, activation: Activation, action: &'static str) {
        self.handlers.push(SwitchHandler {
            target: HandlerTarget::Tagged(tags),
            activation,
            action,
            hold_secs: None,
        });
    }

    /// Registers a handler for every switch.
    pub fn handle_any(&mut self, activation: Activation, action: &'static str) {
        self.handlers.push(SwitchHandler {
            target: HandlerTarget::Any,
            activation,
            action,
            hold_secs: None,
        });
    }

    /// Schedules a delay, replacing any pending delay of the same name.
    /// Returns the (possibly generated) name.
    pub fn delay(&mut self, now_us: u64, seconds: f64, name: Option<&str>) -> String {
        self.delays.schedule(now_us, seconds, name)
    }

    pub fn cancel_delay(&mut self, name: &str) {
        self.delays.cancel(name);
    }

    pub fn is_delayed(&self, name: &str) -> bool {
        self.delays.is_delayed(name)
    }
}

/// A composable, priority-ranked unit of game behavior.
///
/// Handlers are registered inside `mode_started` and live until the mode is
/// removed. Matched handlers and due delays are routed back through
/// `switch_action` and `delay_fired` with the tags the mode registered, so
/// a mode is a small state machine keyed on its own action constants.
///
/// Every hook runs on the game loop; lifecycle effects are requested
/// through `GameContext::push_action` rather than performed re-entrantly.
pub trait Mode: 'static {
    fn core(&self) -> &ModeCore;
    fn core_mut(&mut self) -> &mut ModeCore;

    /// Invoked exactly once per entry into the queue. Register handlers
    /// here.
    fn mode_started(&mut self, _cx: &mut GameContext) {}

    /// Invoked exactly once per exit from the queue, after removal.
    fn mode_stopped(&mut self, _cx: &mut GameContext) {}

    /// Called every loop iteration with the elapsed time in seconds.
    fn tick(&mut self, _cx: &mut GameContext, _delta_secs: f64) {}

    /// A registered handler matched a switch transition.
    fn switch_action(
        &mut self,
        _action: &'static str,
        _event: &SwitchEvent,
        _cx: &mut GameContext,
    ) -> EventResult {
        EventResult::Continue
    }

    /// A named delay came due. The delay was removed before this call, so
    /// re-scheduling the same name is safe.
    fn delay_fired(&mut self, _name: &str, _cx: &mut GameContext) {}

    // Game lifecycle notifications, broadcast to active modes by the
    // controller.
    fn game_started(&mut self, _cx: &mut GameContext) {}
    fn ball_starting(&mut self, _cx: &mut GameContext) {}
    fn ball_ended(&mut self, _cx: &mut GameContext) {}
    fn game_ended(&mut self, _cx: &mut GameContext) {}
}

/// Shared handle to a mode. Handles live in the lifecycle registry for the
/// life of the controller and in the queue while the mode is active.
pub fn mode_handle<M: Mode>(mode: M) -> Rc<RefCell<M>> {
    Rc::new(RefCell::new(mode))
}
