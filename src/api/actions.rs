//! Server-side computation selectors sent in `a2_actions`.

use serde::{Deserialize, Serialize};

/// A named computation the scoring service runs on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum A2Action {
    #[default]
    Default,
    Compare,
    Summary,
    Trends,
    Chatbot,
}

impl A2Action {
    /// Name used in `a2_actions` and as the key under `results`.
    pub fn wire_name(self) -> &'static str {
        match self {
            A2Action::Default => "default",
            A2Action::Compare => "a2_compare",
            A2Action::Summary => "a2_summary",
            A2Action::Trends => "a2_trends",
            A2Action::Chatbot => "a2_chatbot",
        }
    }

    /// Inverse of [`A2Action::wire_name`].
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "default" => Some(A2Action::Default),
            "a2_compare" => Some(A2Action::Compare),
            "a2_summary" => Some(A2Action::Summary),
            "a2_trends" => Some(A2Action::Trends),
            "a2_chatbot" => Some(A2Action::Chatbot),
            _ => None,
        }
    }
}

impl std::str::FromStr for A2Action {
    type Err = String;

    /// Accepts both the short selector (`compare`) and the wire name
    /// (`a2_compare`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "default" => Ok(A2Action::Default),
            "compare" => Ok(A2Action::Compare),
            "summary" => Ok(A2Action::Summary),
            "trends" => Ok(A2Action::Trends),
            "chatbot" => Ok(A2Action::Chatbot),
            other => A2Action::from_wire(other).ok_or_else(|| format!("unknown action '{s}'")),
        }
    }
}

impl std::fmt::Display for A2Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Which result(s) a submission asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSelection {
    Single(A2Action),
    /// Raw action names, sent as given
    Raw(Vec<String>),
}

impl ActionSelection {
    /// Names placed in `a2_actions`.
    pub fn wire_names(&self) -> Vec<&str> {
        match self {
            ActionSelection::Single(action) => vec![action.wire_name()],
            ActionSelection::Raw(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for ActionSelection {
    fn default() -> Self {
        ActionSelection::Single(A2Action::Default)
    }
}

impl From<A2Action> for ActionSelection {
    fn from(action: A2Action) -> Self {
        ActionSelection::Single(action)
    }
}

impl From<Option<A2Action>> for ActionSelection {
    fn from(action: Option<A2Action>) -> Self {
        ActionSelection::Single(action.unwrap_or_default())
    }
}

impl From<Vec<String>> for ActionSelection {
    fn from(names: Vec<String>) -> Self {
        ActionSelection::Raw(names)
    }
}
