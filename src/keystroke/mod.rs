//! Keystroke managers: per-platform recorders of raw input events.
//!
//! The session controllers only talk to the traits below. The recorders in
//! this module are reference implementations that buffer timings and coarse
//! key classes; a different feature-extraction engine can be plugged in by
//! implementing the same traits.

pub mod android;
pub mod desktop;
pub mod ios;
pub mod recorder;
pub mod types;

pub use android::AndroidRecorder;
pub use desktop::DesktopRecorder;
pub use ios::IosRecorder;
pub use types::{
    CapturePayload, DataPlatform, InputTarget, KeystrokeCollection, MobileKeystrokeCollection,
    TargetPlatform,
};

/// Lifecycle shared by every keystroke manager.
pub trait KeystrokeManager: Send {
    /// Finalize the open session and start a new one with a fresh id.
    fn end_typing_session(&mut self) -> CapturePayload;

    /// Discard accumulated state that does not belong to a session record.
    fn reset_typing_data(&mut self);

    /// Whether at least one keystroke has been recorded in the open session.
    fn is_typing_session_active(&self) -> bool;
}

/// Physical keyboard events.
pub trait DesktopKeystrokeManager: KeystrokeManager {
    fn process_keydown(&mut self, key: &str);
    fn process_keyup(&mut self, key: &str);
    fn process_input_change(&mut self, value: &str);
}

/// Android virtual keyboard events. Keydown carries no usable key name, so
/// the key is inferred from the input content that follows.
pub trait AndroidKeystrokeManager: KeystrokeManager {
    fn process_keydown(&mut self, target: &InputTarget);
    fn process_keyup(&mut self);
    fn process_key_input(&mut self, input_content: &str);
    fn process_paste(&mut self, pasted: &str);
    fn process_before_input(&mut self, current_value: &str, previous_value: &str);
}

/// iOS virtual keyboard events, including prediction bar and autocorrect
/// detection from before/after text snapshots.
pub trait IosKeystrokeManager: KeystrokeManager {
    fn process_keydown(&mut self, key: &str, target: &InputTarget);
    fn process_keyup(&mut self, key: &str);
    fn process_paste(&mut self, pasted: &str);
    fn set_prev_content_length(&mut self, length: usize);
    fn process_prediction(&mut self, new_value: &str, previous_value: &str);
    fn process_autocorrection(&mut self, new_value: &str, previous_value: &str);
}
