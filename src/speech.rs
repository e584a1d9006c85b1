//! Speech input/output bridge.
//!
//! Platform speech engines are black-box capability providers behind the
//! [`Synthesizer`] and [`Recognizer`] traits; the bridge itself carries no
//! shared state machine between the two one-shot operations.
//!
//! Capability absence is handled asymmetrically, on purpose:
//! - [`SpeechBridge::speak`] without a synthesizer is a silent no-op;
//! - [`SpeechBridge::listen`] without a recognizer returns an error the
//!   caller must surface as a visible notice.

use crate::error::{ClientError, Result};
use crate::types::Language;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Text-to-speech capability provider.
pub trait Synthesizer: Send + Sync {
    /// Stop any utterance currently playing.
    fn cancel(&self);

    /// Synthesize `text` in the voice for `locale` (e.g. `en-US`).
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis fails to start.
    fn speak(&self, text: &str, locale: &str) -> Result<()>;
}

/// Speech-to-text capability provider.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Run one recognition session in `locale`.
    ///
    /// Resolves with `Some(phrase)` on a result, `None` on silence.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails.
    async fn recognize(&self, locale: &str) -> Result<Option<String>>;
}

/// Bridges the conversation UI to optional platform speech engines.
pub struct SpeechBridge {
    synthesizer: Option<Arc<dyn Synthesizer>>,
    recognizer: Option<Arc<dyn Recognizer>>,
    listening_tx: watch::Sender<bool>,
    listening_rx: watch::Receiver<bool>,
}

impl SpeechBridge {
    /// Create a bridge over whatever engines the platform provides.
    #[must_use]
    pub fn new(
        synthesizer: Option<Arc<dyn Synthesizer>>,
        recognizer: Option<Arc<dyn Recognizer>>,
    ) -> Self {
        let (listening_tx, listening_rx) = watch::channel(false);
        Self {
            synthesizer,
            recognizer,
            listening_tx,
            listening_rx,
        }
    }

    /// A bridge with no speech capability at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(None, None)
    }

    /// Whether text-to-speech is available.
    #[must_use]
    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Whether speech recognition is available.
    #[must_use]
    pub fn can_listen(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Read `text` aloud in the voice matching `language`.
    ///
    /// Cancels any currently-playing utterance first. A missing synthesizer
    /// makes this a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only when a present synthesizer fails.
    pub fn speak(&self, text: &str, language: Language) -> Result<()> {
        let Some(synth) = &self.synthesizer else {
            debug!("speech synthesis unavailable, ignoring speak request");
            return Ok(());
        };
        synth.cancel();
        synth.speak(text, language.locale_tag())
    }

    /// Run one recognition session in `language`.
    ///
    /// Raises the listening indicator for the session's duration and clears
    /// it on every exit path. Resolves with `Some(phrase)` on a result and
    /// `None` on silence; the caller space-joins the phrase into the compose
    /// box.
    ///
    /// # Errors
    ///
    /// Returns an error when recognition is unavailable (the caller must
    /// surface a visible notice) or when the session itself fails.
    pub async fn listen(&self, language: Language) -> Result<Option<String>> {
        let Some(recognizer) = &self.recognizer else {
            return Err(ClientError::Speech(
                "speech recognition is not available in this environment".to_owned(),
            ));
        };

        let _ = self.listening_tx.send(true);
        let outcome = recognizer.recognize(language.locale_tag()).await;
        let _ = self.listening_tx.send(false);
        outcome
    }

    /// Observe the listening indicator.
    #[must_use]
    pub fn listening(&self) -> watch::Receiver<bool> {
        self.listening_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::compose::ComposeController;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSynth {
        spoken: Mutex<Vec<(String, String)>>,
        cancels: Mutex<usize>,
    }

    impl Synthesizer for RecordingSynth {
        fn cancel(&self) {
            *self.cancels.lock().unwrap() += 1;
        }

        fn speak(&self, text: &str, locale: &str) -> Result<()> {
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_owned(), locale.to_owned()));
            Ok(())
        }
    }

    struct FixedRecognizer(Option<String>);

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn recognize(&self, _locale: &str) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl Recognizer for FailingRecognizer {
        async fn recognize(&self, _locale: &str) -> Result<Option<String>> {
            Err(ClientError::Speech("microphone busy".to_owned()))
        }
    }

    #[test]
    fn speak_without_synth_is_silent_noop() {
        let bridge = SpeechBridge::unavailable();
        assert!(bridge.speak("hello", Language::En).is_ok());
    }

    #[test]
    fn speak_cancels_previous_utterance_first() {
        let synth = Arc::new(RecordingSynth::default());
        let bridge = SpeechBridge::new(Some(synth.clone()), None);
        bridge.speak("bonjour", Language::Fr).unwrap();
        assert_eq!(*synth.cancels.lock().unwrap(), 1);
        assert_eq!(
            synth.spoken.lock().unwrap()[0],
            ("bonjour".to_owned(), "fr-FR".to_owned())
        );
    }

    #[tokio::test]
    async fn listen_without_recognizer_surfaces_error() {
        let bridge = SpeechBridge::unavailable();
        let outcome = bridge.listen(Language::En).await;
        assert!(matches!(outcome, Err(ClientError::Speech(_))));
    }

    #[tokio::test]
    async fn listen_result_feeds_compose_space_joined() {
        let bridge = SpeechBridge::new(
            None,
            Some(Arc::new(FixedRecognizer(Some("voice input".to_owned())))),
        );
        let mut compose = ComposeController::new();
        compose.set_text("typed");
        if let Ok(Some(phrase)) = bridge.listen(Language::En).await {
            compose.push_dictation(&phrase);
        }
        assert_eq!(compose.text(), "typed voice input");
    }

    #[tokio::test]
    async fn listen_silence_resolves_none() {
        let bridge = SpeechBridge::new(None, Some(Arc::new(FixedRecognizer(None))));
        assert_eq!(bridge.listen(Language::Es).await.unwrap(), None);
    }

    #[tokio::test]
    async fn listening_indicator_clears_after_failure() {
        let bridge = SpeechBridge::new(None, Some(Arc::new(FailingRecognizer)));
        assert!(bridge.listen(Language::En).await.is_err());
        assert!(!*bridge.listening().borrow());
    }
}
