//! App definition model.
//!
//! The preview consumes a read-only tree loaded wholesale from the builder:
//!
//! ```json
//! {"screens": [{"id": "home", "title": "Home", "isHome": true,
//!   "components": [{"id": "btn", "type": "button",
//!     "events": {"onTap": [{"action": {"type": "navigate",
//!                                      "parameters": {"screenId": "s2"}}}]}}]}]}
//! ```
//!
//! Screen and component ids are chosen by the builder, so they stay strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_key!(
    /// Identifier of a screen within an app definition.
    ScreenId
);

define_key!(
    /// Identifier of a component within an app definition.
    ComponentId
);

/// A complete app definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub screens: Vec<Screen>,
}

impl AppDefinition {
    /// Returns the screen with the given id.
    #[must_use]
    pub fn screen(&self, id: &ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|screen| &screen.id == id)
    }

    /// Returns the screen the preview opens on: the first screen flagged as
    /// home, else the first screen.
    #[must_use]
    pub fn home_screen(&self) -> Option<&Screen> {
        self.screens
            .iter()
            .find(|screen| screen.is_home)
            .or_else(|| self.screens.first())
    }
}

/// One navigable page of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: ScreenId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_home: bool,
    /// Background color or image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Components in paint order.
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Screen {
    #[must_use]
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|component| &component.id == id)
    }
}

/// Position of a component on its screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Size of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A UI element placed on a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    /// Component kind, e.g. `button` or `text-input`. Opaque to the preview.
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Event name (`onTap`, `onChange`, ...) to the bindings run for it.
    #[serde(default)]
    pub events: BTreeMap<String, Vec<BoundEvent>>,
}

impl Component {
    /// Returns the bindings for an event name, in execution order.
    #[must_use]
    pub fn bound_events(&self, event_name: &str) -> &[BoundEvent] {
        self.events.get(event_name).map_or(&[], Vec::as_slice)
    }
}

/// A binding from a component event to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundEvent {
    pub action: Action,
}

/// An action as stored in the app definition.
///
/// The type is kept as written so unknown kinds survive loading; the
/// dispatcher decides what it can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}
