// crates/pinball-rs/src/device/led.rs
use super::Device;
use crate::hal::{HardwarePlatform, PinballError};
use crate::types::{HwAddress, Rgb};

/// An RGB lamp. Stateless from the core's view; colors are write-through
/// to the platform.
#[derive(Debug, Clone)]
pub struct Led {
    name: String,
    address: HwAddress,
}

impl Led {
    pub fn new(name: impl Into<String>, address: HwAddress) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    pub fn set_color(
        &self,
        color: Rgb,
        platform: &mut dyn HardwarePlatform,
    ) -> Result<(), PinballError> {
        platform.set_led(self.address, color)
    }
}

impl Device for Led {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> HwAddress {
        self.address
    }
}
