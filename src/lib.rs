//! Area2 capture agent - typing telemetry sessions scored into neuroprofiles.
//!
//! Input events from a text field are recorded by a platform keystroke
//! manager. When the user submits, the open session is finalized into a
//! record and posted to the scoring service, which answers with a reduced
//! neuroprofile for the requested action.
//!
//! # Privacy
//!
//! - **No key content**: records carry timings, coarse key classes and the
//!   character-class shape of the text, never the characters themselves
//! - **Gated capture**: nothing is recorded until the developer access key
//!   has been validated
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CaptureProvider                          │
//! │  AccessGate (validated once)     NeuroprofileService client  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  DesktopSession / IosSession / AndroidSession                │
//! │     │ raw events                    │ submit                 │
//! │     ▼                               ▼                        │
//! │  KeystrokeManager ──finalize──▶ SessionCore ──▶ scoring API  │
//! │                                (in-flight + pending slot)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use area2_capture_agent::{A2Action, CaptureProvider, Config};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = CaptureProvider::initialize(Config::load()?).await;
//! let session = provider.desktop_session();
//!
//! session.process_keydown("h");
//! session.process_input_change("h");
//! session.process_keyup("h");
//!
//! let result = session.submit("user-id", "user-token", A2Action::Compare).await;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod api;
pub mod config;
pub mod keystroke;
pub mod provider;
pub mod session;

// Re-export key types at crate root for convenience
pub use access::AccessGate;
pub use api::{
    A2Action, AccessValidator, ActionSelection, ApiError, DevAccessClient, Neuroprofile,
    NeuroprofileClient, NeuroprofileResponse, NeuroprofileService,
};
pub use config::{Config, ConfigError};
pub use keystroke::{CapturePayload, InputTarget, KeystrokeManager, TargetPlatform};
pub use provider::CaptureProvider;
pub use session::{
    AndroidSession, CaptureError, DesktopSession, ErrorMessage, IosSession, KeystrokeResult,
    PlatformSession,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
