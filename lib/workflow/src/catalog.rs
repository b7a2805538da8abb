//! Node catalog for the workflow palette.
//!
//! The catalog is the closed set of trigger and action kinds a user can drop
//! onto the canvas. Each kind carries palette metadata (name, description,
//! icon, category, color) and the port template new nodes are seeded from.
//!
//! Kinds are addressed on the wire by an opaque snake_case key such as
//! `"button_tapped"` or `"show_toast"`. Keys are unique across triggers and
//! actions.

use crate::error::GraphError;
use crate::port::Port;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Events that start a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// The app is launched.
    AppOpened,
    /// A screen finishes loading.
    ScreenLoaded,
    /// A button component is tapped.
    ButtonTapped,
    /// A form component is submitted.
    FormSubmitted,
    /// A record is inserted into a data collection.
    RecordCreated,
    /// A record in a data collection changes.
    RecordUpdated,
    /// A recurring time-based schedule fires.
    Schedule,
    /// An external HTTP call hits the app's webhook.
    Webhook,
}

impl TriggerKind {
    /// Every trigger kind, in palette order.
    pub const ALL: [Self; 8] = [
        Self::AppOpened,
        Self::ScreenLoaded,
        Self::ButtonTapped,
        Self::FormSubmitted,
        Self::RecordCreated,
        Self::RecordUpdated,
        Self::Schedule,
        Self::Webhook,
    ];

    /// Returns the wire key for this trigger.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AppOpened => "app_opened",
            Self::ScreenLoaded => "screen_loaded",
            Self::ButtonTapped => "button_tapped",
            Self::FormSubmitted => "form_submitted",
            Self::RecordCreated => "record_created",
            Self::RecordUpdated => "record_updated",
            Self::Schedule => "schedule",
            Self::Webhook => "webhook",
        }
    }

    fn entry(self) -> CatalogEntry {
        let (name, description, icon, category) = match self {
            Self::AppOpened => (
                "App Opened",
                "Runs when the app is launched",
                "rocket",
                NodeCategory::Lifecycle,
            ),
            Self::ScreenLoaded => (
                "Screen Loaded",
                "Runs when a screen finishes loading",
                "layout",
                NodeCategory::Lifecycle,
            ),
            Self::ButtonTapped => (
                "Button Tapped",
                "Runs when a user taps a button",
                "pointer",
                NodeCategory::Interaction,
            ),
            Self::FormSubmitted => (
                "Form Submitted",
                "Runs when a form is submitted",
                "send",
                NodeCategory::Interaction,
            ),
            Self::RecordCreated => (
                "Record Created",
                "Runs when a new record is added to a collection",
                "database-plus",
                NodeCategory::Data,
            ),
            Self::RecordUpdated => (
                "Record Updated",
                "Runs when a record in a collection changes",
                "database-edit",
                NodeCategory::Data,
            ),
            Self::Schedule => (
                "Schedule",
                "Runs on a recurring schedule",
                "clock",
                NodeCategory::Schedule,
            ),
            Self::Webhook => (
                "Webhook",
                "Runs when an external service calls the app",
                "webhook",
                NodeCategory::Integration,
            ),
        };
        CatalogEntry {
            node_type: NodeType::Trigger(self),
            name,
            description,
            icon,
            category,
            color: category.color(),
        }
    }
}

/// Effects a workflow can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    ShowModal,
    ShowToast,
    CreateRecord,
    UpdateRecord,
    DeleteRecord,
    SendEmail,
    SendNotification,
    HttpRequest,
    SetVariable,
    Delay,
    /// Routes to a `true` or `false` branch.
    Condition,
}

impl ActionKind {
    /// Every action kind, in palette order.
    pub const ALL: [Self; 12] = [
        Self::Navigate,
        Self::ShowModal,
        Self::ShowToast,
        Self::CreateRecord,
        Self::UpdateRecord,
        Self::DeleteRecord,
        Self::SendEmail,
        Self::SendNotification,
        Self::HttpRequest,
        Self::SetVariable,
        Self::Delay,
        Self::Condition,
    ];

    /// Returns the wire key for this action.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::ShowModal => "show_modal",
            Self::ShowToast => "show_toast",
            Self::CreateRecord => "create_record",
            Self::UpdateRecord => "update_record",
            Self::DeleteRecord => "delete_record",
            Self::SendEmail => "send_email",
            Self::SendNotification => "send_notification",
            Self::HttpRequest => "http_request",
            Self::SetVariable => "set_variable",
            Self::Delay => "delay",
            Self::Condition => "condition",
        }
    }

    fn entry(self) -> CatalogEntry {
        let (name, description, icon, category) = match self {
            Self::Navigate => (
                "Navigate",
                "Go to another screen",
                "arrow-right",
                NodeCategory::Navigation,
            ),
            Self::ShowModal => (
                "Show Modal",
                "Open a modal dialog",
                "window",
                NodeCategory::Feedback,
            ),
            Self::ShowToast => (
                "Show Toast",
                "Show a short message at the bottom of the screen",
                "message",
                NodeCategory::Feedback,
            ),
            Self::CreateRecord => (
                "Create Record",
                "Insert a record into a collection",
                "plus",
                NodeCategory::Data,
            ),
            Self::UpdateRecord => (
                "Update Record",
                "Change fields of an existing record",
                "edit",
                NodeCategory::Data,
            ),
            Self::DeleteRecord => (
                "Delete Record",
                "Remove a record from a collection",
                "trash",
                NodeCategory::Data,
            ),
            Self::SendEmail => (
                "Send Email",
                "Send an email to one or more recipients",
                "mail",
                NodeCategory::Messaging,
            ),
            Self::SendNotification => (
                "Send Notification",
                "Send a push notification to app users",
                "bell",
                NodeCategory::Messaging,
            ),
            Self::HttpRequest => (
                "HTTP Request",
                "Call an external API",
                "globe",
                NodeCategory::Integration,
            ),
            Self::SetVariable => (
                "Set Variable",
                "Store a value for later steps",
                "variable",
                NodeCategory::Logic,
            ),
            Self::Delay => (
                "Delay",
                "Wait before running the next step",
                "hourglass",
                NodeCategory::Logic,
            ),
            Self::Condition => (
                "Condition",
                "Branch on a true/false expression",
                "git-branch",
                NodeCategory::Logic,
            ),
        };
        CatalogEntry {
            node_type: NodeType::Action(self),
            name,
            description,
            icon,
            category,
            color: category.color(),
        }
    }
}

/// Palette grouping for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Lifecycle,
    Interaction,
    Data,
    Schedule,
    Integration,
    Navigation,
    Feedback,
    Messaging,
    Logic,
}

impl NodeCategory {
    /// Accent color used by the palette and the node header.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Lifecycle => "#8b5cf6",
            Self::Interaction => "#3b82f6",
            Self::Data => "#10b981",
            Self::Schedule => "#f59e0b",
            Self::Integration => "#6366f1",
            Self::Navigation => "#0ea5e9",
            Self::Feedback => "#ec4899",
            Self::Messaging => "#ef4444",
            Self::Logic => "#64748b",
        }
    }
}

/// The type of a workflow node: a trigger or an action.
///
/// Serialized as the opaque catalog key (e.g. `"navigate"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NodeType {
    Trigger(TriggerKind),
    Action(ActionKind),
}

impl NodeType {
    /// Returns the catalog key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Trigger(kind) => kind.key(),
            Self::Action(kind) => kind.key(),
        }
    }

    /// Returns true for trigger nodes.
    #[must_use]
    pub const fn is_trigger(self) -> bool {
        matches!(self, Self::Trigger(_))
    }

    /// Returns the palette metadata for this type.
    #[must_use]
    pub fn entry(self) -> CatalogEntry {
        match self {
            Self::Trigger(kind) => kind.entry(),
            Self::Action(kind) => kind.entry(),
        }
    }

    /// Returns the (inputs, outputs) a freshly created node of this type has.
    ///
    /// Triggers are entry points and accept no input. Branching actions
    /// expose one output per branch.
    #[must_use]
    pub fn port_template(self) -> (Vec<Port>, Vec<Port>) {
        match self {
            Self::Trigger(_) => (vec![], vec![Port::new("next")]),
            Self::Action(ActionKind::Condition) => (
                vec![Port::new("in")],
                vec![Port::new("true"), Port::new("false")],
            ),
            Self::Action(ActionKind::HttpRequest) => (
                vec![Port::new("in")],
                vec![Port::new("success"), Port::new("error")],
            ),
            Self::Action(_) => (vec![Port::new("in")], vec![Port::new("next")]),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for NodeType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerKind::ALL
            .iter()
            .map(|&kind| Self::Trigger(kind))
            .chain(ActionKind::ALL.iter().map(|&kind| Self::Action(kind)))
            .find(|node_type| node_type.key() == s)
            .ok_or_else(|| GraphError::InvalidNodeType {
                node_type: s.to_string(),
            })
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.key().to_string()
    }
}

impl TryFrom<String> for NodeType {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Palette metadata for one node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// The catalog key.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: &'static str,
    pub description: &'static str,
    /// Icon reference understood by the frontend icon set.
    pub icon: &'static str,
    pub category: NodeCategory,
    pub color: &'static str,
}

/// Returns the trigger palette.
pub fn triggers() -> impl Iterator<Item = CatalogEntry> {
    TriggerKind::ALL.into_iter().map(TriggerKind::entry)
}

/// Returns the action palette.
pub fn actions() -> impl Iterator<Item = CatalogEntry> {
    ActionKind::ALL.into_iter().map(ActionKind::entry)
}

/// Looks up a catalog entry by key.
#[must_use]
pub fn lookup(key: &str) -> Option<CatalogEntry> {
    key.parse::<NodeType>().ok().map(NodeType::entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_across_triggers_and_actions() {
        let keys: Vec<_> = triggers().chain(actions()).map(|e| e.node_type.key()).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn every_key_parses_back_to_its_type() {
        for entry in triggers().chain(actions()) {
            let parsed: NodeType = entry.node_type.key().parse().expect("catalog key");
            assert_eq!(parsed, entry.node_type);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "teleport".parse::<NodeType>().unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidNodeType {
                node_type: "teleport".to_string()
            }
        );
    }

    #[test]
    fn trigger_template_has_no_inputs() {
        let (inputs, outputs) = NodeType::Trigger(TriggerKind::ButtonTapped).port_template();
        assert!(inputs.is_empty());
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn condition_template_has_two_branches() {
        let (inputs, outputs) = NodeType::Action(ActionKind::Condition).port_template();
        assert_eq!(inputs.len(), 1);
        let names: Vec<_> = outputs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["true", "false"]);
    }

    #[test]
    fn entry_serializes_with_type_key() {
        let entry = lookup("show_toast").expect("show_toast is in the catalog");
        let json = serde_json::to_value(entry).expect("serialize");
        assert_eq!(json["type"], "show_toast");
        assert_eq!(json["category"], "feedback");
        assert_eq!(json["color"], NodeCategory::Feedback.color());
    }

    #[test]
    fn node_type_serde_uses_key() {
        let json = serde_json::to_string(&NodeType::Action(ActionKind::SendEmail)).unwrap();
        assert_eq!(json, "\"send_email\"");
        let parsed: NodeType = serde_json::from_str("\"webhook\"").unwrap();
        assert_eq!(parsed, NodeType::Trigger(TriggerKind::Webhook));
        assert!(serde_json::from_str::<NodeType>("\"nope\"").is_err());
    }
}
