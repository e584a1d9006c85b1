//! TalkFlow client: streaming conversation with a document-aware assistant.
//!
//! The crate's core is the conversation session controller: it owns the
//! lifecycle of one server-push stream per submitted turn, reconciles
//! streaming partial output into the conversation log, and coordinates with
//! a backend-readiness prober so a front end can degrade gracefully while
//! the backend is cold-starting.
//!
//! # Architecture
//!
//! Independent collaborators around a shared log:
//! - **Session**: conversation log + stream session manager ([`session`])
//! - **Readiness**: health polling with a tri-state banner signal ([`health`])
//! - **Compose**: pending input text and submit gating ([`compose`])
//! - **Speech**: optional dictation and read-aloud engines ([`speech`])
//! - **Upload**: one-shot document upload ([`upload`])

pub mod compose;
pub mod config;
pub mod error;
pub mod health;
pub mod session;
pub mod speech;
pub mod sse;
pub mod stream;
pub mod types;
pub mod upload;

pub use compose::ComposeController;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use health::{ReadinessProber, ReadinessState};
pub use session::{ConversationLog, SessionController, SessionEvent, Turn, TurnOrigin};
pub use speech::SpeechBridge;
pub use types::{Language, Personality, SessionParams};
pub use upload::UploadClient;
