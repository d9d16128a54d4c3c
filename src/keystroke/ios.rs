//! Reference recorder for iOS virtual keyboards.

use crate::keystroke::recorder::{
    area, autocorrected_word, classify_key, predicted_insertion, CorrectionLog, TimingBuffer,
};
use crate::keystroke::types::{CapturePayload, InputTarget};
use crate::keystroke::{IosKeystrokeManager, KeystrokeManager};

#[derive(Debug)]
pub struct IosRecorder {
    buffer: TimingBuffer,
    corrections: CorrectionLog,
    /// Content length reported by the last before-input event
    prev_content_length: Option<usize>,
    paste_pending: bool,
}

impl IosRecorder {
    pub fn new(time_zone: impl Into<String>) -> Self {
        Self {
            buffer: TimingBuffer::new(time_zone),
            corrections: CorrectionLog::default(),
            prev_content_length: None,
            paste_pending: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.buffer.session_id
    }
}

impl KeystrokeManager for IosRecorder {
    fn end_typing_session(&mut self) -> CapturePayload {
        let finished = self.buffer.rotate();
        std::mem::take(&mut self.corrections)
            .into_collection(finished)
            .into()
    }

    fn reset_typing_data(&mut self) {
        self.prev_content_length = None;
        self.paste_pending = false;
        self.buffer.clear_outstanding();
    }

    fn is_typing_session_active(&self) -> bool {
        self.buffer.is_active()
    }
}

impl IosKeystrokeManager for IosRecorder {
    fn process_keydown(&mut self, key: &str, target: &InputTarget) {
        let (key_area, key_type) = if target.has_selection() && key == "Backspace" {
            (area::EDIT, "delete_selection")
        } else {
            classify_key(key)
        };
        self.buffer.press(key, key_area, key_type);
    }

    fn process_keyup(&mut self, key: &str) {
        self.buffer.release(key);
    }

    fn process_paste(&mut self, pasted: &str) {
        if pasted.is_empty() {
            return;
        }
        self.paste_pending = true;
        self.buffer.press("Paste", area::EDIT, "paste");
        self.buffer.release("Paste");
    }

    fn set_prev_content_length(&mut self, length: usize) {
        self.prev_content_length = Some(length);
    }

    fn process_prediction(&mut self, new_value: &str, previous_value: &str) {
        if std::mem::take(&mut self.paste_pending) {
            return;
        }
        // Prediction picks fire no keydown; a jump over the before-input
        // length is the only trace they leave.
        let before = self
            .prev_content_length
            .unwrap_or_else(|| previous_value.chars().count());
        if new_value.chars().count() <= before + 1 {
            return;
        }
        if let Some(inserted) = predicted_insertion(new_value, previous_value) {
            self.corrections.record_prediction(inserted);
        }
    }

    fn process_autocorrection(&mut self, new_value: &str, previous_value: &str) {
        if let Some(length) = autocorrected_word(new_value, previous_value) {
            self.corrections.record_autocorrection(length);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystroke::types::MobileKeystrokeCollection;

    fn finish(recorder: &mut IosRecorder) -> MobileKeystrokeCollection {
        match recorder.end_typing_session() {
            CapturePayload::Mobile(record) => record,
            CapturePayload::Desktop(_) => panic!("ios recorder produced a desktop record"),
        }
    }

    #[test]
    fn test_keystrokes_and_prediction() {
        let mut recorder = IosRecorder::new("UTC");
        recorder.process_keydown("o", &InputTarget::new(""));
        recorder.process_keyup("o");
        recorder.set_prev_content_length(2);
        recorder.process_prediction("ok thanks", "ok");

        let record = finish(&mut recorder);
        assert_eq!(record.press_times.len(), 1);
        assert_eq!(record.prediction_lengths, vec![7]);
        assert!(record.autocorrect_lengths.is_empty());
    }

    #[test]
    fn test_single_character_is_not_a_prediction() {
        let mut recorder = IosRecorder::new("UTC");
        recorder.set_prev_content_length(2);
        recorder.process_prediction("oka", "ok");
        assert!(finish(&mut recorder).prediction_lengths.is_empty());
    }

    #[test]
    fn test_autocorrection() {
        let mut recorder = IosRecorder::new("UTC");
        recorder.process_autocorrection("see you tomorrow", "see you tmrw");
        recorder.process_autocorrection("see you tomorrow!", "see you tomorrow");

        let record = finish(&mut recorder);
        assert_eq!(record.autocorrect_lengths, vec![8]);
        assert_eq!(record.autocorrect_times.len(), 1);
    }

    #[test]
    fn test_selection_delete() {
        let mut recorder = IosRecorder::new("UTC");
        let target = InputTarget {
            value: "abc".to_string(),
            selection_start: 0,
            selection_end: 3,
        };
        recorder.process_keydown("Backspace", &target);
        assert_eq!(finish(&mut recorder).key_types, vec!["delete_selection"]);
    }
}
