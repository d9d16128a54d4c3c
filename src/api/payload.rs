//! Wire layout of a neuroprofile request.
//!
//! Records are kept camelCase locally; the scoring service expects the
//! snake_case vocabulary below, with `user_id` merged into the keystroke
//! data.

use crate::api::actions::ActionSelection;
use crate::keystroke::types::{CapturePayload, KeystrokeCollection, MobileKeystrokeCollection};
use serde::Serialize;
use serde_json::{Map, Value};

/// Request body for `POST /get_reduced_neuroprofile`.
#[derive(Debug, Serialize)]
pub struct NeuroprofileRequest<'a> {
    pub a2_actions: Vec<&'a str>,
    pub keystroke_data: KeystrokeData<'a>,
}

impl<'a> NeuroprofileRequest<'a> {
    pub fn new(user_id: &'a str, payload: &'a CapturePayload, actions: &'a ActionSelection) -> Self {
        Self {
            a2_actions: actions.wire_names(),
            keystroke_data: KeystrokeData::format(payload, user_id),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum KeystrokeData<'a> {
    Desktop(DesktopData<'a>),
    Mobile(MobileData<'a>),
}

impl<'a> KeystrokeData<'a> {
    /// Rename a record's fields to the wire vocabulary.
    pub fn format(payload: &'a CapturePayload, user_id: &'a str) -> Self {
        match payload {
            CapturePayload::Desktop(record) => KeystrokeData::Desktop(DesktopData::new(record, user_id)),
            CapturePayload::Mobile(record) => KeystrokeData::Mobile(MobileData::new(record, user_id)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DesktopData<'a> {
    key_area: &'a [u8],
    key_type: &'a [String],
    press_times: &'a [f64],
    quality_check: &'a [bool],
    release_times: &'a [f64],
    session_id: &'a str,
    startunixtime: i64,
    text_structure: &'a str,
    timezone: &'a str,
    #[serde(rename = "appContext", skip_serializing_if = "Option::is_none")]
    app_context: Option<&'a str>,
    #[serde(flatten)]
    rest: &'a Map<String, Value>,
    user_id: &'a str,
}

impl<'a> DesktopData<'a> {
    fn new(record: &'a KeystrokeCollection, user_id: &'a str) -> Self {
        Self {
            key_area: &record.key_area,
            key_type: &record.key_types,
            press_times: &record.press_times,
            quality_check: &record.quality_check,
            release_times: &record.release_times,
            session_id: &record.session_id,
            startunixtime: record.start_unix_time,
            text_structure: &record.text_structure,
            timezone: &record.time_zone,
            app_context: record.app_context.as_deref(),
            rest: &record.extra,
            user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MobileData<'a> {
    autocorrect_lengths: &'a [usize],
    autocorrect_times: &'a [f64],
    prediction_lengths: &'a [usize],
    prediction_times: &'a [f64],
    key_area: &'a [u8],
    key_type: &'a [String],
    press_times: &'a [f64],
    quality_check: &'a [bool],
    release_times: &'a [f64],
    session_id: &'a str,
    startunixtime: i64,
    timezone: &'a str,
    #[serde(rename = "appContext", skip_serializing_if = "Option::is_none")]
    app_context: Option<&'a str>,
    #[serde(flatten)]
    rest: &'a Map<String, Value>,
    user_id: &'a str,
}

impl<'a> MobileData<'a> {
    fn new(record: &'a MobileKeystrokeCollection, user_id: &'a str) -> Self {
        Self {
            autocorrect_lengths: &record.autocorrect_lengths,
            autocorrect_times: &record.autocorrect_times,
            prediction_lengths: &record.prediction_lengths,
            prediction_times: &record.prediction_times,
            key_area: &record.key_area,
            key_type: &record.key_types,
            press_times: &record.press_times,
            quality_check: &record.quality_check,
            release_times: &record.release_times,
            session_id: &record.session_id,
            startunixtime: record.start_unix_time,
            timezone: &record.time_zone,
            app_context: record.app_context.as_deref(),
            rest: &record.extra,
            user_id,
        }
    }
}
