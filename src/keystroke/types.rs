//! Session record types produced by the keystroke managers.
//!
//! These carry timing, coarse key classes and text shape only. Typed
//! characters are never stored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Input platform a session controller is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    #[default]
    Desktop,
    Ios,
    Android,
}

impl TargetPlatform {
    /// Wire platform family the records of this target belong to.
    pub fn data_platform(self) -> DataPlatform {
        match self {
            TargetPlatform::Desktop => DataPlatform::Desktop,
            TargetPlatform::Ios | TargetPlatform::Android => DataPlatform::Mobile,
        }
    }
}

impl std::str::FromStr for TargetPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "desktop" => Ok(TargetPlatform::Desktop),
            "ios" => Ok(TargetPlatform::Ios),
            "android" => Ok(TargetPlatform::Android),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetPlatform::Desktop => write!(f, "desktop"),
            TargetPlatform::Ios => write!(f, "ios"),
            TargetPlatform::Android => write!(f, "android"),
        }
    }
}

/// Platform family used to pick the wire layout of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataPlatform {
    Desktop,
    Mobile,
}

/// Snapshot of the input element a keydown fired on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTarget {
    /// Current value of the input
    pub value: String,
    /// Caret position (in characters)
    #[serde(default)]
    pub selection_start: usize,
    /// End of the selection (equal to `selection_start` without a selection)
    #[serde(default)]
    pub selection_end: usize,
}

impl InputTarget {
    /// Target with the caret at the end of `value`.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = value.chars().count();
        Self {
            value,
            selection_start: caret,
            selection_end: caret,
        }
    }

    /// Whether a range of text is selected.
    pub fn has_selection(&self) -> bool {
        self.selection_end > self.selection_start
    }
}

/// Typing session recorded on a desktop keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeCollection {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    /// Epoch seconds of the first keystroke; zero marks an empty session
    pub start_unix_time: i64,
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_context: Option<String>,
    pub key_area: Vec<u8>,
    pub key_types: Vec<String>,
    /// Press timestamps in epoch milliseconds
    pub press_times: Vec<f64>,
    /// Release timestamps in epoch milliseconds
    pub release_times: Vec<f64>,
    /// Per release: whether it matched an outstanding press of the same key
    pub quality_check: Vec<bool>,
    /// Character-class shape of the final text
    pub text_structure: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typing session recorded on a mobile virtual keyboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileKeystrokeCollection {
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub start_unix_time: i64,
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_context: Option<String>,
    pub key_area: Vec<u8>,
    pub key_types: Vec<String>,
    pub press_times: Vec<f64>,
    pub release_times: Vec<f64>,
    pub quality_check: Vec<bool>,
    /// Lengths of words replaced by autocorrect
    pub autocorrect_lengths: Vec<usize>,
    pub autocorrect_times: Vec<f64>,
    /// Lengths of text inserted from the prediction bar
    pub prediction_lengths: Vec<usize>,
    pub prediction_times: Vec<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A finalized session record of either platform family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapturePayload {
    Mobile(MobileKeystrokeCollection),
    Desktop(KeystrokeCollection),
}

impl CapturePayload {
    pub fn session_id(&self) -> &str {
        match self {
            CapturePayload::Desktop(c) => &c.session_id,
            CapturePayload::Mobile(c) => &c.session_id,
        }
    }

    pub fn start_unix_time(&self) -> i64 {
        match self {
            CapturePayload::Desktop(c) => c.start_unix_time,
            CapturePayload::Mobile(c) => c.start_unix_time,
        }
    }

    /// A record without a start time holds no keystrokes.
    pub fn is_empty(&self) -> bool {
        self.start_unix_time() == 0
    }

    pub fn platform(&self) -> DataPlatform {
        match self {
            CapturePayload::Desktop(_) => DataPlatform::Desktop,
            CapturePayload::Mobile(_) => DataPlatform::Mobile,
        }
    }

    pub fn app_context(&self) -> Option<&str> {
        match self {
            CapturePayload::Desktop(c) => c.app_context.as_deref(),
            CapturePayload::Mobile(c) => c.app_context.as_deref(),
        }
    }

    pub fn set_app_context(&mut self, context: impl Into<String>) {
        let context = Some(context.into());
        match self {
            CapturePayload::Desktop(c) => c.app_context = context,
            CapturePayload::Mobile(c) => c.app_context = context,
        }
    }

    /// Number of recorded key presses.
    pub fn keystroke_count(&self) -> usize {
        match self {
            CapturePayload::Desktop(c) => c.press_times.len(),
            CapturePayload::Mobile(c) => c.press_times.len(),
        }
    }
}

impl From<KeystrokeCollection> for CapturePayload {
    fn from(collection: KeystrokeCollection) -> Self {
        CapturePayload::Desktop(collection)
    }
}

impl From<MobileKeystrokeCollection> for CapturePayload {
    fn from(collection: MobileKeystrokeCollection) -> Self {
        CapturePayload::Mobile(collection)
    }
}
