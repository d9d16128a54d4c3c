//! Response types of the scoring service.

use crate::api::actions::{A2Action, ActionSelection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::ops::Deref;

/// Raw response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub status: ApiStatus,
    #[serde(default)]
    pub results: Option<Map<String, Value>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfCompareScores {
    pub average_pos: f64,
    pub current_pos: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    pub behavioral: f64,
    pub cognitive: f64,
    pub fatigue_level: f64,
    pub motor: f64,
    pub stress_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub cognitive: f64,
    pub emotional: f64,
    pub motor: f64,
    pub n_sessions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyTrends {
    pub morning: Trend,
    pub afternoon: Trend,
    pub evening: Trend,
    pub night: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyTrends {
    pub monday: Trend,
    pub tuesday: Trend,
    pub wednesday: Trend,
    pub thursday: Trend,
    pub friday: Trend,
    pub saturday: Trend,
    pub sunday: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultResults {
    pub timestamp: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResults {
    pub self_compare_scores: SelfCompareScores,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResults {
    pub current_state: CurrentState,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsResults {
    pub daily_trends: DailyTrends,
    pub timestamp: String,
    pub weekly_trends: WeeklyTrends,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotResults {
    pub current_state: CurrentState,
    pub daily_trends: DailyTrends,
    pub recommended_interaction_time: String,
    pub timestamp: String,
    pub weekly_trends: WeeklyTrends,
}

/// A typed view over a result object that keeps the object as received.
///
/// Field access goes through the typed struct; serialization emits the
/// original object, so integers and fields the struct does not model
/// survive untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Narrowed<T> {
    results: T,
    raw: Value,
}

impl<T: DeserializeOwned> Narrowed<T> {
    fn parse(raw: Value) -> Result<Self, serde_json::Error> {
        let results = T::deserialize(&raw)?;
        Ok(Self { results, raw })
    }
}

impl<T> Narrowed<T> {
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<T> Deref for Narrowed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.results
    }
}

/// A neuroprofile narrowed to the action that produced it.
///
/// Every variant serializes as the bare result object.
#[derive(Debug, Clone, PartialEq)]
pub enum Neuroprofile {
    Default(Narrowed<DefaultResults>),
    Compare(Narrowed<CompareResults>),
    Summary(Narrowed<SummaryResults>),
    Trends(Narrowed<TrendsResults>),
    Chatbot(Narrowed<ChatbotResults>),
    /// Result of a raw action, or of a known action in a shape the typed
    /// struct does not accept
    Other { action: String, result: Value },
}

impl Neuroprofile {
    /// Narrow `value` using the action it was keyed under.
    pub fn narrow(action_name: &str, value: Value) -> Self {
        let parsed = match A2Action::from_wire(action_name) {
            Some(A2Action::Default) => Narrowed::parse(value.clone()).map(Neuroprofile::Default),
            Some(A2Action::Compare) => Narrowed::parse(value.clone()).map(Neuroprofile::Compare),
            Some(A2Action::Summary) => Narrowed::parse(value.clone()).map(Neuroprofile::Summary),
            Some(A2Action::Trends) => Narrowed::parse(value.clone()).map(Neuroprofile::Trends),
            Some(A2Action::Chatbot) => Narrowed::parse(value.clone()).map(Neuroprofile::Chatbot),
            None => {
                return Neuroprofile::Other {
                    action: action_name.to_string(),
                    result: value,
                }
            }
        };

        parsed.unwrap_or_else(|e| {
            tracing::warn!(action = action_name, "Unexpected neuroprofile shape, kept raw: {}", e);
            Neuroprofile::Other {
                action: action_name.to_string(),
                result: value,
            }
        })
    }

    /// The result object exactly as the service returned it.
    pub fn raw(&self) -> &Value {
        match self {
            Neuroprofile::Default(r) => r.raw(),
            Neuroprofile::Compare(r) => r.raw(),
            Neuroprofile::Summary(r) => r.raw(),
            Neuroprofile::Trends(r) => r.raw(),
            Neuroprofile::Chatbot(r) => r.raw(),
            Neuroprofile::Other { result, .. } => result,
        }
    }

    /// Timestamp reported by the service, when the result carries one.
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Neuroprofile::Default(r) => Some(&r.timestamp),
            Neuroprofile::Compare(r) => Some(&r.timestamp),
            Neuroprofile::Summary(r) => Some(&r.timestamp),
            Neuroprofile::Trends(r) => Some(&r.timestamp),
            Neuroprofile::Chatbot(r) => Some(&r.timestamp),
            Neuroprofile::Other { result, .. } => result.get("timestamp").and_then(Value::as_str),
        }
    }
}

impl Serialize for Neuroprofile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw().serialize(serializer)
    }
}

/// Outcome of one neuroprofile request.
#[derive(Debug, Clone, PartialEq)]
pub enum NeuroprofileResponse {
    /// The service answered with `status: success`; `None` when the
    /// requested action is missing from `results`
    Success { neuroprofile: Option<Neuroprofile> },
    Failure { error: String, message: String },
}

impl NeuroprofileResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, NeuroprofileResponse::Success { .. })
    }

    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        NeuroprofileResponse::Failure {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Pick the entry of `results` that answers `actions`.
///
/// Returns the key that matched together with its value.
pub fn select_result(
    results: &mut Map<String, Value>,
    actions: &ActionSelection,
) -> Option<(String, Value)> {
    actions
        .wire_names()
        .into_iter()
        .find(|name| results.contains_key(*name))
        .and_then(|name| results.remove(name).map(|value| (name.to_string(), value)))
}
