// crates/pinball-rs/src/device/mod.rs
pub mod coil;
pub mod led;
pub mod switch;

pub use coil::Coil;
pub use led::Led;
pub use switch::Switch;

use crate::hal::PinballError;
use crate::types::HwAddress;
use std::collections::BTreeMap;

/// Common identity shared by all registered devices.
pub trait Device {
    fn name(&self) -> &str;
    fn address(&self) -> HwAddress;
}

/// A table of one device type, keyed by symbolic name and by hardware
/// address.
///
/// Name lookup is case-insensitive; iteration order is insertion order.
/// Both keys are unique within one machine configuration and duplicate
/// insertion fails fast.
#[derive(Debug)]
pub struct DeviceCollection<T: Device> {
    items: Vec<T>,
    by_name: BTreeMap<String, usize>,
    by_address: BTreeMap<HwAddress, usize>,
}

impl<T: Device> Default for DeviceCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Device> DeviceCollection<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            by_name: BTreeMap::new(),
            by_address: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Registers a device, failing fast on a duplicate name or address.
    pub fn insert(&mut self, device: T) -> Result<(), PinballError> {
        let key = device.name().to_ascii_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(PinballError::DuplicateName(device.name().to_string()));
        }
        if self.by_address.contains_key(&device.address()) {
            return Err(PinballError::DuplicateAddress(device.address()));
        }
        let index = self.items.len();
        self.by_name.insert(key, index);
        self.by_address.insert(device.address(), index);
        self.items.push(device);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.items[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let index = *self.by_name.get(&name.to_ascii_lowercase())?;
        Some(&mut self.items[index])
    }

    pub fn get_by_address(&self, address: HwAddress) -> Option<&T> {
        self.by_address.get(&address).map(|&i| &self.items[i])
    }

    pub fn get_by_address_mut(&mut self, address: HwAddress) -> Option<&mut T> {
        let index = *self.by_address.get(&address)?;
        Some(&mut self.items[index])
    }

    /// Resolves a name to its hardware address, with the "no such device"
    /// error the registration helpers rely on.
    pub fn address_of(&self, name: &str) -> Result<HwAddress, PinballError> {
        self.get(name)
            .map(Device::address)
            .ok_or_else(|| PinballError::NoSuchDevice(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SwitchType;

    fn get_test_collection() -> DeviceCollection<Switch> {
        let mut switches = DeviceCollection::new();
        switches
            .insert(Switch::new(
                "Left_Flipper",
                HwAddress(0x01),
                SwitchType::NormallyOpen,
            ))
            .unwrap();
        switches
            .insert(Switch::new(
                "right_flipper",
                HwAddress(0x02),
                SwitchType::NormallyOpen,
            ))
            .unwrap();
        switches
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let switches = get_test_collection();
        assert!(switches.get("left_flipper").is_some());
        assert!(switches.get("LEFT_FLIPPER").is_some());
        assert!(switches.get("RIGHT_flipper").is_some());
        assert!(switches.get("launch").is_none());
    }

    #[test]
    fn test_lookup_by_address() {
        let switches = get_test_collection();
        assert_eq!(
            switches.get_by_address(HwAddress(0x02)).unwrap().name(),
            "right_flipper"
        );
        assert!(switches.get_by_address(HwAddress(0x99)).is_none());
    }

    #[test]
    fn test_duplicate_name_fails_fast() {
        let mut switches = get_test_collection();
        let result = switches.insert(Switch::new(
            "LEFT_flipper",
            HwAddress(0x03),
            SwitchType::NormallyOpen,
        ));
        assert_eq!(
            result,
            Err(PinballError::DuplicateName("LEFT_flipper".to_string()))
        );
    }

    #[test]
    fn test_duplicate_address_fails_fast() {
        let mut switches = get_test_collection();
        let result = switches.insert(Switch::new(
            "launch",
            HwAddress(0x01),
            SwitchType::NormallyOpen,
        ));
        assert_eq!(result, Err(PinballError::DuplicateAddress(HwAddress(0x01))));
    }

    #[test]
    fn test_iteration_is_insertion_order() {
        let switches = get_test_collection();
        let names: Vec<&str> = switches.iter().map(Device::name).collect();
        assert_eq!(names, vec!["Left_Flipper", "right_flipper"]);
    }

    #[test]
    fn test_address_of_unknown_device() {
        let switches = get_test_collection();
        assert_eq!(
            switches.address_of("slingshot"),
            Err(PinballError::NoSuchDevice("slingshot".to_string()))
        );
    }
}
