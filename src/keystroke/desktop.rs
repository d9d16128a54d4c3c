//! Reference recorder for physical keyboards.

use crate::keystroke::recorder::{classify_key, text_structure, TimingBuffer};
use crate::keystroke::types::{CapturePayload, KeystrokeCollection};
use crate::keystroke::{DesktopKeystrokeManager, KeystrokeManager};

/// Records press/release timings for a desktop text input.
#[derive(Debug)]
pub struct DesktopRecorder {
    buffer: TimingBuffer,
    /// Latest input value, reduced to its shape at session end
    last_value: String,
}

impl DesktopRecorder {
    pub fn new(time_zone: impl Into<String>) -> Self {
        Self {
            buffer: TimingBuffer::new(time_zone),
            last_value: String::new(),
        }
    }

    /// Id of the open session.
    pub fn session_id(&self) -> &str {
        &self.buffer.session_id
    }
}

impl KeystrokeManager for DesktopRecorder {
    fn end_typing_session(&mut self) -> CapturePayload {
        let finished = self.buffer.rotate();
        let structure = text_structure(&self.last_value);
        KeystrokeCollection {
            start_unix_time: finished.start_unix_time(),
            session_id: finished.session_id,
            time_zone: finished.time_zone,
            app_context: None,
            key_area: finished.key_area,
            key_types: finished.key_types,
            press_times: finished.press_times,
            release_times: finished.release_times,
            quality_check: finished.quality_check,
            text_structure: structure,
            extra: Default::default(),
        }
        .into()
    }

    fn reset_typing_data(&mut self) {
        self.last_value.clear();
        self.buffer.clear_outstanding();
    }

    fn is_typing_session_active(&self) -> bool {
        self.buffer.is_active()
    }
}

impl DesktopKeystrokeManager for DesktopRecorder {
    fn process_keydown(&mut self, key: &str) {
        let (area, key_type) = classify_key(key);
        self.buffer.press(key, area, key_type);
    }

    fn process_keyup(&mut self, key: &str) {
        self.buffer.release(key);
    }

    fn process_input_change(&mut self, value: &str) {
        self.last_value = value.to_string();
    }
}
