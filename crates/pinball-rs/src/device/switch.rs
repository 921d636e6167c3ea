// crates/pinball-rs/src/device/switch.rs
use super::Device;
use crate::types::{Activation, HwAddress, SwitchState, SwitchTags, SwitchType};

/// A playfield or cabinet switch.
///
/// Identity (name, address, type, tags) is fixed at registration; only the
/// physical state and its timestamp change afterwards, and only from the
/// game loop.
#[derive(Debug, Clone)]
pub struct Switch {
    name: String,
    address: HwAddress,
    switch_type: SwitchType,
    debounce: bool,
    tags: SwitchTags,
    state: SwitchState,
    last_change_us: u64,
}

impl Switch {
    pub fn new(name: impl Into<String>, address: HwAddress, switch_type: SwitchType) -> Self {
        Self {
            name: name.into(),
            address,
            switch_type,
            debounce: true,
            tags: SwitchTags::empty(),
            // Until the platform reports initial states, assume the resting
            // position for the wiring polarity.
            state: match switch_type {
                SwitchType::NormallyOpen => SwitchState::Open,
                SwitchType::NormallyClosed => SwitchState::Closed,
            },
            last_change_us: 0,
        }
    }

    pub fn with_tags(mut self, tags: SwitchTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn without_debounce(mut self) -> Self {
        self.debounce = false;
        self
    }

    pub fn switch_type(&self) -> SwitchType {
        self.switch_type
    }

    pub fn debounce(&self) -> bool {
        self.debounce
    }

    pub fn tags(&self) -> SwitchTags {
        self.tags
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn last_change_us(&self) -> u64 {
        self.last_change_us
    }

    /// Whether the switch is in the triggered position for its wiring
    /// polarity: `Closed` for normally-open, `Open` for normally-closed.
    pub fn is_active(&self) -> bool {
        matches!(
            (self.switch_type, self.state),
            (SwitchType::NormallyOpen, SwitchState::Closed)
                | (SwitchType::NormallyClosed, SwitchState::Open)
        )
    }

    /// Records a confirmed state transition. Callers are responsible for
    /// deduplication; this unconditionally overwrites state and timestamp.
    pub fn set_state(&mut self, state: SwitchState, now_us: u64) {
        self.state = state;
        self.last_change_us = now_us;
    }

    /// Whether a transition to `state` satisfies `activation` for this
    /// switch's polarity.
    pub fn activation_matches(&self, state: SwitchState, activation: Activation) -> bool {
        match activation {
            Activation::Closed => state == SwitchState::Closed,
            Activation::Open => state == SwitchState::Open,
            Activation::Active | Activation::Inactive => {
                let active = matches!(
                    (self.switch_type, state),
                    (SwitchType::NormallyOpen, SwitchState::Closed)
                        | (SwitchType::NormallyClosed, SwitchState::Open)
                );
                (activation == Activation::Active) == active
            }
        }
    }
}

impl Device for Switch {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> HwAddress {
        self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normally_open_activation() {
        let mut sw = Switch::new("target", HwAddress(0x10), SwitchType::NormallyOpen);
        assert!(!sw.is_active());
        sw.set_state(SwitchState::Closed, 100);
        assert!(sw.is_active());
        assert_eq!(sw.last_change_us(), 100);
    }

    #[test]
    fn test_normally_closed_activation() {
        // Trough optos: beam broken (ball present) opens the circuit.
        let mut sw = Switch::new("trough_1", HwAddress(0x20), SwitchType::NormallyClosed);
        assert!(!sw.is_active());
        sw.set_state(SwitchState::Open, 0);
        assert!(sw.is_active());
    }

    #[test]
    fn test_activation_matching_is_polarity_aware() {
        let sw = Switch::new("opto", HwAddress(0x21), SwitchType::NormallyClosed);
        assert!(sw.activation_matches(SwitchState::Open, Activation::Active));
        assert!(sw.activation_matches(SwitchState::Closed, Activation::Inactive));
        // Polarity-blind forms address the bare wire.
        assert!(sw.activation_matches(SwitchState::Open, Activation::Open));
        assert!(!sw.activation_matches(SwitchState::Open, Activation::Closed));
    }
}
