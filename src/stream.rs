//! Transport for the per-turn assistant response stream.
//!
//! One call to [`open`] is one stream handle: a single GET to the backend's
//! `/stream` endpoint whose body is a long-lived server-push channel. The
//! returned stream yields text fragments in transport order.
//!
//! A mid-stream transport error ends the stream the same way a clean close
//! does; the caller finalizes the in-progress turn with whatever accumulated
//! either way. The error is recorded at `warn` level only.

use crate::error::{ClientError, Result};
use crate::sse::FragmentParser;
use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

/// Open the server-push connection for one turn.
///
/// Fails fast when the connection cannot be established or the backend
/// answers with a non-success status. After that point the stream never
/// errors: it simply ends.
///
/// # Errors
///
/// Returns an error if the request cannot be sent or the response status is
/// not 2xx.
pub async fn open(
    client: &reqwest::Client,
    url: &str,
) -> Result<impl Stream<Item = String> + Send + use<>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ClientError::Http(format!("stream connect failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Stream(format!(
            "stream rejected with HTTP {}",
            status.as_u16()
        )));
    }

    debug!("assistant stream open: {url}");
    let mut byte_stream = response.bytes_stream();

    Ok(async_stream::stream! {
        let mut parser = FragmentParser::new();
        loop {
            match byte_stream.next().await {
                Some(Ok(chunk)) => {
                    for fragment in parser.push(&chunk) {
                        yield fragment;
                    }
                }
                Some(Err(e)) => {
                    // Treated as end-of-turn, matching the clean-close path.
                    warn!("assistant stream transport error, finalizing turn: {e}");
                    break;
                }
                None => break,
            }
        }
        if let Some(trailing) = parser.flush() {
            yield trailing;
        }
    })
}
