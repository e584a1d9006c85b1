//! Incremental parser for the backend's server-push channel.
//!
//! The stream endpoint emits classic Server-Sent Events where every payload
//! is a raw UTF-8 text fragment to append to the in-progress assistant turn:
//!
//! ```text
//! data: Hel
//!
//! data: lo there
//!
//! ```
//!
//! The parser is byte-chunk driven: network chunks may split lines or whole
//! events anywhere, so state is carried across [`FragmentParser::push`]
//! calls. Only `data:` fields matter here; `event:`/`id:` fields and comment
//! lines are skipped.

/// Incremental fragment parser for one stream connection.
///
/// Feed raw bytes via [`push`](Self::push); call [`flush`](Self::flush) when
/// the transport closes to recover a trailing fragment that never saw its
/// terminating blank line.
#[derive(Debug, Default)]
pub struct FragmentParser {
    line_buffer: String,
    data_lines: Vec<String>,
}

impl FragmentParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a chunk of bytes, returning every fragment completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(chunk);
        let mut fragments = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                let line = std::mem::take(&mut self.line_buffer);
                let line = line.strip_suffix('\r').unwrap_or(&line);
                if let Some(fragment) = self.take_line(line) {
                    fragments.push(fragment);
                }
            } else {
                self.line_buffer.push(ch);
            }
        }

        fragments
    }

    /// Flush any buffered data as a final fragment.
    pub fn flush(&mut self) -> Option<String> {
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            self.take_line(line);
        }
        if self.data_lines.is_empty() {
            None
        } else {
            Some(self.build())
        }
    }

    /// Process one complete line. A blank line is the event boundary and
    /// yields the accumulated fragment, if any.
    fn take_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data_lines.is_empty() {
                return None;
            }
            return Some(self.build());
        }

        // Comment line per the SSE spec.
        if line.starts_with(':') {
            return None;
        }

        if let Some(value) = field_value(line, "data") {
            self.data_lines.push(value.to_owned());
        }
        None
    }

    fn build(&mut self) -> String {
        let fragment = self.data_lines.join("\n");
        self.data_lines.clear();
        fragment
    }
}

/// Extract the value of `field` from `line`, stripping the single optional
/// leading space after the colon.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?;
    let value = rest.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}
