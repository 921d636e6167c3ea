// crates/pinball-rs/src/modes/drop_targets.rs
use crate::game::GameContext;
use crate::mode::{Mode, ModeCore, SwitchEvent};
use crate::types::{Activation, EventResult, Lifecycle};
use log::{debug, info};
use serde_json::json;
use std::collections::BTreeSet;

const ACTION_TARGET: &str = "target_down";
const DELAY_RESET: &str = "drop_target_reset";

/// A bank of drop targets with a shared reset coil.
///
/// The first Active transition of each target counts; re-activations while
/// a target is already down are bounce noise and ignored. A completed bank
/// optionally resets itself after a delay.
pub struct DropTargetBankMode {
    core: ModeCore,
    targets: Vec<String>,
    reset_coil: String,
    /// Seconds between bank completion and automatic reset; 0 disables.
    pub auto_reset_secs: f64,
    down: BTreeSet<String>,
}

impl DropTargetBankMode {
    pub fn new(targets: Vec<String>, reset_coil: impl Into<String>, auto_reset_secs: f64) -> Self {
        Self {
            core: ModeCore::new("drop_targets", 25, Lifecycle::Ball),
            targets,
            reset_coil: reset_coil.into(),
            auto_reset_secs,
            down: BTreeSet::new(),
        }
    }

    pub fn down_count(&self) -> usize {
        self.down.len()
    }

    pub fn is_complete(&self) -> bool {
        self.down.len() == self.targets.len()
    }

    /// Raises the bank: cancels any pending auto-reset, clears the down
    /// set and pulses the reset coil.
    pub fn reset(&mut self, cx: &mut GameContext) {
        info!("[DROPS] Bank reset");
        self.core.cancel_delay(DELAY_RESET);
        self.down.clear();
        cx.pulse(&self.reset_coil);
        cx.post("drop_target_bank_reset", None);
    }
}

impl Mode for DropTargetBankMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        self.down.clear();
        for target in self.targets.clone() {
            self.core
                .handle_switch(target, Activation::Active, ACTION_TARGET);
        }
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        if action != ACTION_TARGET {
            return EventResult::Continue;
        }
        if !self.down.insert(event.name.clone()) {
            debug!("[DROPS] '{}' already down, bounce ignored", event.name);
            return EventResult::Continue;
        }
        info!(
            "[DROPS] '{}' down ({}/{})",
            event.name,
            self.down.len(),
            self.targets.len()
        );
        cx.post("drop_target_hit", Some(json!({ "target": event.name })));
        if self.is_complete() {
            let targets = self.targets.clone();
            cx.post(
                "drop_target_bank_complete",
                Some(json!({ "targets": targets })),
            );
            if self.auto_reset_secs > 0.0 {
                self.core
                    .delay(cx.now_us, self.auto_reset_secs, Some(DELAY_RESET));
            }
        }
        EventResult::Continue
    }

    fn delay_fired(&mut self, name: &str, cx: &mut GameContext) {
        if name == DELAY_RESET {
            self.reset(cx);
        }
    }
}
