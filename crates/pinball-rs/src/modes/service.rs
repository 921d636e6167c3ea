// crates/pinball-rs/src/modes/service.rs
use crate::game::GameContext;
use crate::mode::{Mode, ModeCore, SwitchEvent};
use crate::types::{Activation, EventResult, Lifecycle, SwitchTags};
use log::{info, warn};
use serde_json::json;

const ACTION_TOGGLE: &str = "service_toggle";
const ACTION_INTERCEPT: &str = "service_intercept";

/// Operator service mode. Highest priority in the machine.
///
/// While active every coil is gated off, and every non-service switch
/// activation is reported to the media sink and swallowed before any game
/// mode can see it, so the playfield is safe to reach into.
pub struct ServiceMode {
    core: ModeCore,
    active: bool,
}

impl ServiceMode {
    pub fn new() -> Self {
        Self {
            core: ModeCore::new("service", 100, Lifecycle::System),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Briefly fires a coil for bench testing: enables the software gate,
    /// pulses, and disables again.
    pub fn test_coil(&mut self, name: &str, cx: &mut GameContext) {
        if !self.active {
            warn!("[SERVICE] test_coil ignored outside service mode");
            return;
        }
        let (machine, platform) = cx.devices_and_platform();
        let Some(coil) = machine.coils.get_mut(name) else {
            warn!("[SERVICE] test_coil: unknown coil '{}'", name);
            return;
        };
        info!("[SERVICE] Testing coil '{}'", name);
        let result = (|| {
            coil.set_enabled(true, platform)?;
            coil.pulse(platform)?;
            coil.set_enabled(false, platform)
        })();
        if let Err(e) = result {
            warn!("[SERVICE] test_coil '{}' failed: {}", name, e);
        }
    }

    fn set_all_coils_enabled(enabled: bool, cx: &mut GameContext) {
        let (machine, platform) = cx.devices_and_platform();
        for coil in machine.coils.iter_mut() {
            if let Err(e) = coil.set_enabled(enabled, platform) {
                warn!("[SERVICE] Could not gate coil: {}", e);
            }
        }
    }
}

impl Default for ServiceMode {
    fn default() -> Self {
        Self::new()
    }
}

impl Mode for ServiceMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        // The toggle row comes first so the service switch itself is never
        // treated as a playfield activation below.
        self.core
            .handle_tagged(SwitchTags::SERVICE, Activation::Active, ACTION_TOGGLE);
        self.core.handle_any(Activation::Active, ACTION_INTERCEPT);
    }

    fn switch_action(
        &mut self,
        action: &'static str,
        event: &SwitchEvent,
        cx: &mut GameContext,
    ) -> EventResult {
        match action {
            ACTION_TOGGLE => {
                self.active = !self.active;
                if self.active {
                    info!("[SERVICE] Entering service mode");
                    Self::set_all_coils_enabled(false, cx);
                    cx.post("service_mode_entered", None);
                } else {
                    info!("[SERVICE] Leaving service mode");
                    Self::set_all_coils_enabled(true, cx);
                    cx.post("service_mode_exited", None);
                }
                EventResult::Stop
            }
            ACTION_INTERCEPT => {
                if self.active && !event.tags.contains(SwitchTags::SERVICE) {
                    cx.post(
                        "service_switch_activated",
                        Some(json!({ "name": event.name })),
                    );
                    EventResult::Stop
                } else {
                    EventResult::Continue
                }
            }
            _ => EventResult::Continue,
        }
    }
}
