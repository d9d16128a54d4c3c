//! Reference recorder for Android virtual keyboards.
//!
//! Android reports keydown with an "Unidentified" key, so presses are
//! recorded at keydown and classified once the input content arrives.

use crate::keystroke::recorder::{
    area, autocorrected_word, classify_key, predicted_insertion, CorrectionLog, TimingBuffer,
};
use crate::keystroke::types::{CapturePayload, InputTarget};
use crate::keystroke::{AndroidKeystrokeManager, KeystrokeManager};

const UNIDENTIFIED: &str = "Unidentified";

#[derive(Debug)]
pub struct AndroidRecorder {
    buffer: TimingBuffer,
    corrections: CorrectionLog,
    /// Input value captured by the last before-input event
    before_input: Option<String>,
    paste_pending: bool,
}

impl AndroidRecorder {
    pub fn new(time_zone: impl Into<String>) -> Self {
        Self {
            buffer: TimingBuffer::new(time_zone),
            corrections: CorrectionLog::default(),
            before_input: None,
            paste_pending: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.buffer.session_id
    }
}

impl KeystrokeManager for AndroidRecorder {
    fn end_typing_session(&mut self) -> CapturePayload {
        let finished = self.buffer.rotate();
        std::mem::take(&mut self.corrections)
            .into_collection(finished)
            .into()
    }

    fn reset_typing_data(&mut self) {
        self.before_input = None;
        self.paste_pending = false;
        self.buffer.clear_outstanding();
    }

    fn is_typing_session_active(&self) -> bool {
        self.buffer.is_active()
    }
}

impl AndroidKeystrokeManager for AndroidRecorder {
    fn process_keydown(&mut self, target: &InputTarget) {
        let key_area = if target.has_selection() {
            area::EDIT
        } else {
            area::UNKNOWN
        };
        self.buffer.press(UNIDENTIFIED, key_area, "other");
    }

    fn process_keyup(&mut self) {
        self.buffer.release(UNIDENTIFIED);
    }

    fn process_key_input(&mut self, input_content: &str) {
        let Some(previous) = self.before_input.take() else {
            return;
        };

        if std::mem::take(&mut self.paste_pending) {
            return;
        }

        if let Some(inserted) = predicted_insertion(input_content, &previous) {
            self.corrections.record_prediction(inserted);
            return;
        }
        if let Some(length) = autocorrected_word(input_content, &previous) {
            self.corrections.record_autocorrection(length);
            return;
        }

        if input_content.chars().count() < previous.chars().count() {
            self.buffer.reclassify_last(area::EDIT, "delete");
        } else if let Some(last) = input_content.chars().last() {
            let (key_area, key_type) = classify_key(&last.to_string());
            self.buffer.reclassify_last(key_area, key_type);
        }
    }

    fn process_paste(&mut self, pasted: &str) {
        if pasted.is_empty() {
            return;
        }
        self.paste_pending = true;
        self.buffer.press("Paste", area::EDIT, "paste");
        self.buffer.release("Paste");
    }

    fn process_before_input(&mut self, current_value: &str, previous_value: &str) {
        // The DOM value may already reflect a composition; prefer the stored
        // value when the two disagree.
        let snapshot = if previous_value.is_empty() {
            current_value
        } else {
            previous_value
        };
        self.before_input = Some(snapshot.to_string());
    }
}
