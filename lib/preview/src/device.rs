//! Simulated devices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device form factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Phone,
    Tablet,
}

/// Screen orientation of the simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Returns the other orientation.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Portrait => Self::Landscape,
            Self::Landscape => Self::Portrait,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::Landscape => write!(f, "landscape"),
        }
    }
}

/// A device the preview can simulate.
///
/// Sizes are in portrait orientation, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub width: u32,
    pub height: u32,
    pub has_notch: bool,
    pub has_home_indicator: bool,
}

const DEVICES: &[Device] = &[
    Device {
        id: "iphone-14-pro",
        name: "iPhone 14 Pro",
        device_type: DeviceType::Phone,
        width: 393,
        height: 852,
        has_notch: true,
        has_home_indicator: true,
    },
    Device {
        id: "iphone-se",
        name: "iPhone SE",
        device_type: DeviceType::Phone,
        width: 375,
        height: 667,
        has_notch: false,
        has_home_indicator: false,
    },
    Device {
        id: "pixel-7",
        name: "Pixel 7",
        device_type: DeviceType::Phone,
        width: 412,
        height: 915,
        has_notch: false,
        has_home_indicator: true,
    },
    Device {
        id: "galaxy-s23",
        name: "Galaxy S23",
        device_type: DeviceType::Phone,
        width: 360,
        height: 780,
        has_notch: false,
        has_home_indicator: true,
    },
    Device {
        id: "ipad-pro-11",
        name: "iPad Pro 11\"",
        device_type: DeviceType::Tablet,
        width: 834,
        height: 1194,
        has_notch: false,
        has_home_indicator: true,
    },
    Device {
        id: "ipad-mini",
        name: "iPad Mini",
        device_type: DeviceType::Tablet,
        width: 744,
        height: 1133,
        has_notch: false,
        has_home_indicator: true,
    },
    Device {
        id: "galaxy-tab-s8",
        name: "Galaxy Tab S8",
        device_type: DeviceType::Tablet,
        width: 800,
        height: 1280,
        has_notch: false,
        has_home_indicator: false,
    },
];

impl Device {
    /// Every built-in device.
    #[must_use]
    pub fn all() -> &'static [Device] {
        DEVICES
    }

    /// Looks up a built-in device by id.
    #[must_use]
    pub fn lookup(id: &str) -> Option<&'static Device> {
        DEVICES.iter().find(|device| device.id == id)
    }

    /// The device a new preview starts on.
    #[must_use]
    pub fn default_device() -> &'static Device {
        &DEVICES[0]
    }

    /// Returns `(width, height)` of the viewport in an orientation.
    #[must_use]
    pub const fn viewport_size(&self, orientation: Orientation) -> (u32, u32) {
        match orientation {
            Orientation::Portrait => (self.width, self.height),
            Orientation::Landscape => (self.height, self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = Device::all().iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Device::all().len());
    }

    #[test]
    fn lookup_by_id() {
        let pixel = Device::lookup("pixel-7").expect("pixel 7");
        assert_eq!(pixel.device_type, DeviceType::Phone);
        assert!(Device::lookup("nokia-3310").is_none());
        assert_eq!(Device::default_device().id, "iphone-14-pro");
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let ipad = Device::lookup("ipad-mini").expect("ipad mini");
        assert_eq!(ipad.viewport_size(Orientation::Portrait), (744, 1133));
        assert_eq!(ipad.viewport_size(Orientation::Landscape), (1133, 744));
        assert_eq!(Orientation::Portrait.toggled(), Orientation::Landscape);
    }
}
