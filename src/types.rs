//! Session parameters steering the remote assistant's responses.
//!
//! `Personality` and `Language` are opaque to this client beyond being
//! passed through on each stream request; `Language` additionally maps to a
//! full locale tag for the speech bridge.

use serde::{Deserialize, Serialize};

/// Response personality rendered by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    /// Plain helpful assistant.
    #[default]
    Default,
    /// Speaks like Yoda.
    Yoda,
    /// Cheerful pirate slang.
    Pirate,
}

impl Personality {
    /// Wire value used in the stream request query string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Yoda => "yoda",
            Self::Pirate => "pirate",
        }
    }

    /// Parse a wire value. Unknown names return `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "yoda" => Some(Self::Yoda),
            "pirate" => Some(Self::Pirate),
            _ => None,
        }
    }
}

/// Response language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Spanish.
    Es,
    /// French.
    Fr,
}

impl Language {
    /// Wire value used in the stream request query string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
        }
    }

    /// Full locale tag used for speech synthesis/recognition.
    #[must_use]
    pub fn locale_tag(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Es => "es-ES",
            Self::Fr => "fr-FR",
        }
    }

    /// Parse a wire value. Unknown codes return `None`.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }
}

/// Parameters read by the stream session manager at submit time.
///
/// The `session_id` is generated once and reused across turns; personality
/// and language change only on explicit user selection, never mid-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Selected response personality.
    pub personality: Personality,
    /// Selected response language.
    pub language: Language,
    /// Opaque stable session identifier.
    pub session_id: String,
}

impl SessionParams {
    /// Create default-valued parameters with a fresh session ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            personality: Personality::default(),
            language: Language::default(),
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl Default for SessionParams {
    fn default() -> Self {
        Self::new()
    }
}
