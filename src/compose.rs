//! Compose box state: pending input text and submit gating.

/// Owns the text being composed and decides when it may be submitted.
///
/// The controller knows nothing about the network; the caller passes the
/// current streaming flag and routes taken text into the session manager.
#[derive(Debug, Default)]
pub struct ComposeController {
    text: String,
}

impl ComposeController {
    /// Create an empty compose box.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pending text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the pending text (typing).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Whether submit is currently allowed: non-blank text and no active
    /// stream.
    #[must_use]
    pub fn can_submit(&self, streaming: bool) -> bool {
        !self.text.trim().is_empty() && !streaming
    }

    /// Handle the Enter key.
    ///
    /// Enter with shift inserts a literal newline and never submits. Enter
    /// without shift takes the text for submission when allowed, clearing
    /// the box immediately; whether the resulting stream later succeeds does
    /// not bring the text back.
    pub fn handle_enter(&mut self, shift: bool, streaming: bool) -> Option<String> {
        if shift {
            self.text.push('\n');
            return None;
        }
        if !self.can_submit(streaming) {
            return None;
        }
        Some(std::mem::take(&mut self.text))
    }

    /// Append a recognized phrase from dictation, space-joined onto any
    /// existing content.
    pub fn push_dictation(&mut self, phrase: &str) {
        if self.text.is_empty() {
            self.text.push_str(phrase);
        } else {
            self.text.push(' ');
            self.text.push_str(phrase);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn blank_text_cannot_submit() {
        let mut compose = ComposeController::new();
        assert!(!compose.can_submit(false));
        compose.set_text("   \n  ");
        assert!(!compose.can_submit(false));
    }

    #[test]
    fn streaming_blocks_submit() {
        let mut compose = ComposeController::new();
        compose.set_text("hello");
        assert!(compose.can_submit(false));
        assert!(!compose.can_submit(true));
    }

    #[test]
    fn enter_takes_and_clears() {
        let mut compose = ComposeController::new();
        compose.set_text("hello");
        assert_eq!(compose.handle_enter(false, false), Some("hello".to_owned()));
        assert!(compose.text().is_empty());
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut compose = ComposeController::new();
        compose.set_text("line one");
        assert_eq!(compose.handle_enter(true, false), None);
        assert_eq!(compose.text(), "line one\n");
    }

    #[test]
    fn enter_while_streaming_keeps_text() {
        let mut compose = ComposeController::new();
        compose.set_text("hello");
        assert_eq!(compose.handle_enter(false, true), None);
        assert_eq!(compose.text(), "hello");
    }

    #[test]
    fn dictation_space_joins() {
        let mut compose = ComposeController::new();
        compose.push_dictation("hello");
        assert_eq!(compose.text(), "hello");
        compose.push_dictation("world");
        assert_eq!(compose.text(), "hello world");
    }

    #[test]
    fn dictation_into_empty_does_not_prefix_space() {
        let mut compose = ComposeController::new();
        compose.push_dictation("solo");
        assert_eq!(compose.text(), "solo");
    }
}
