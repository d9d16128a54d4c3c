//! Timing buffer shared by the reference keystroke recorders.
//!
//! Each recorder keeps one open session. Press and release timestamps are
//! buffered until the session is ended, at which point the buffer is turned
//! into a record and a fresh session (with a new id) begins.

use crate::keystroke::types::MobileKeystrokeCollection;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Coarse keyboard regions reported in `keyArea`.
pub mod area {
    pub const UNKNOWN: u8 = 0;
    pub const LEFT: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const DIGIT: u8 = 3;
    pub const SPACE: u8 = 4;
    pub const EDIT: u8 = 5;
    pub const CONTROL: u8 = 6;
    pub const PUNCTUATION: u8 = 7;
}

const LEFT_HAND: &str = "qwertasdfgzxcvb";

/// Classify a DOM key name into a keyboard area and a key type.
///
/// Only the class is kept, never the key itself.
pub fn classify_key(key: &str) -> (u8, &'static str) {
    let mut chars = key.chars();
    let single = match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    };

    match (key, single) {
        (_, Some(' ')) => (area::SPACE, "space"),
        (_, Some(c)) if c.is_ascii_digit() => (area::DIGIT, "digit"),
        (_, Some(c)) if c.is_alphabetic() => {
            let lower = c.to_ascii_lowercase();
            let hand = if LEFT_HAND.contains(lower) {
                area::LEFT
            } else {
                area::RIGHT
            };
            (hand, "alpha")
        }
        (_, Some(_)) => (area::PUNCTUATION, "punctuation"),
        ("Backspace", _) | ("Delete", _) => (area::EDIT, "delete"),
        ("Enter", _) => (area::CONTROL, "enter"),
        ("Shift", _) | ("Control", _) | ("Alt", _) | ("Meta", _) | ("CapsLock", _) => {
            (area::CONTROL, "modifier")
        }
        ("ArrowLeft", _) | ("ArrowRight", _) | ("ArrowUp", _) | ("ArrowDown", _) => {
            (area::CONTROL, "navigation")
        }
        _ => (area::UNKNOWN, "other"),
    }
}

/// Map text to its character-class shape: letters become `a`/`A`, digits
/// `0`, whitespace a space, everything else `.`.
pub fn text_structure(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_uppercase() {
                'A'
            } else if c.is_alphabetic() {
                'a'
            } else if c.is_numeric() {
                '0'
            } else if c.is_whitespace() {
                ' '
            } else {
                '.'
            }
        })
        .collect()
}

fn epoch_millis(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64
}

/// Buffered timings of the open session.
#[derive(Debug)]
pub(crate) struct TimingBuffer {
    pub session_id: String,
    pub time_zone: String,
    pub started_at: Option<DateTime<Utc>>,
    pub key_area: Vec<u8>,
    pub key_types: Vec<String>,
    pub press_times: Vec<f64>,
    pub release_times: Vec<f64>,
    pub quality_check: Vec<bool>,
    /// Keys pressed and not yet released
    outstanding: Vec<String>,
}

impl TimingBuffer {
    pub fn new(time_zone: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            time_zone: time_zone.into(),
            started_at: None,
            key_area: Vec::new(),
            key_types: Vec::new(),
            press_times: Vec::new(),
            release_times: Vec::new(),
            quality_check: Vec::new(),
            outstanding: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start_unix_time(&self) -> i64 {
        self.started_at.map(|t| t.timestamp()).unwrap_or(0)
    }

    /// Record a press of `key` classified as `area`/`key_type`.
    pub fn press(&mut self, key: &str, area: u8, key_type: &str) {
        let now = Utc::now();
        self.started_at.get_or_insert(now);
        self.key_area.push(area);
        self.key_types.push(key_type.to_string());
        self.press_times.push(epoch_millis(now));
        self.outstanding.push(key.to_string());
    }

    /// Record a release of `key`. Returns whether it matched a press.
    pub fn release(&mut self, key: &str) -> bool {
        if !self.is_active() {
            return false;
        }
        let matched = match self.outstanding.iter().position(|k| k == key) {
            Some(index) => {
                self.outstanding.remove(index);
                true
            }
            None => false,
        };
        self.release_times.push(epoch_millis(Utc::now()));
        self.quality_check.push(matched);
        matched
    }

    /// Reclassify the most recent press, used when the key is only known
    /// after the input changed (virtual keyboards report "Unidentified").
    pub fn reclassify_last(&mut self, area: u8, key_type: &str) {
        if let (Some(a), Some(t)) = (self.key_area.last_mut(), self.key_types.last_mut()) {
            *a = area;
            *t = key_type.to_string();
        }
    }

    pub fn now_millis() -> f64 {
        epoch_millis(Utc::now())
    }

    /// Hand out the buffered session and open a new one.
    pub fn rotate(&mut self) -> TimingBuffer {
        let next = TimingBuffer::new(self.time_zone.clone());
        std::mem::replace(self, next)
    }

    /// Drop keys still held down.
    pub fn clear_outstanding(&mut self) {
        self.outstanding.clear();
    }
}

/// Prediction bar and autocorrect events of a mobile session.
#[derive(Debug, Default)]
pub(crate) struct CorrectionLog {
    pub autocorrect_lengths: Vec<usize>,
    pub autocorrect_times: Vec<f64>,
    pub prediction_lengths: Vec<usize>,
    pub prediction_times: Vec<f64>,
}

impl CorrectionLog {
    pub fn record_prediction(&mut self, length: usize) {
        self.prediction_lengths.push(length);
        self.prediction_times.push(TimingBuffer::now_millis());
    }

    pub fn record_autocorrection(&mut self, length: usize) {
        self.autocorrect_lengths.push(length);
        self.autocorrect_times.push(TimingBuffer::now_millis());
    }

    /// Build the mobile record from a finished buffer and this log.
    pub fn into_collection(self, finished: TimingBuffer) -> MobileKeystrokeCollection {
        MobileKeystrokeCollection {
            start_unix_time: finished.start_unix_time(),
            session_id: finished.session_id,
            time_zone: finished.time_zone,
            app_context: None,
            key_area: finished.key_area,
            key_types: finished.key_types,
            press_times: finished.press_times,
            release_times: finished.release_times,
            quality_check: finished.quality_check,
            autocorrect_lengths: self.autocorrect_lengths,
            autocorrect_times: self.autocorrect_times,
            prediction_lengths: self.prediction_lengths,
            prediction_times: self.prediction_times,
            extra: Default::default(),
        }
    }
}

/// Compare two snapshots of an input value.
///
/// Returns `Some(inserted)` when `new_value` extends `previous` by more than
/// one character at once (a prediction bar pick), `None` otherwise.
pub fn predicted_insertion(new_value: &str, previous: &str) -> Option<usize> {
    let inserted = new_value.chars().count().checked_sub(previous.chars().count())?;
    (inserted > 1 && new_value.starts_with(previous)).then_some(inserted)
}

/// Returns the length of the replacement word when `new_value` rewrote the
/// last word of `previous` instead of appending to it.
pub fn autocorrected_word(new_value: &str, previous: &str) -> Option<usize> {
    if new_value == previous || previous.is_empty() {
        return None;
    }
    if new_value.starts_with(previous) || previous.starts_with(new_value) {
        return None;
    }

    let common = new_value
        .chars()
        .zip(previous.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let word_start = new_value
        .chars()
        .take(common)
        .collect::<Vec<_>>()
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |i| i + 1);
    let length = new_value
        .chars()
        .skip(word_start)
        .take_while(|c| !c.is_whitespace())
        .count();
    (length > 0).then_some(length)
}
