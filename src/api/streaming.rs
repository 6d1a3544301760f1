//! Parser for the line-oriented chat data stream
//!
//! Every line is `<type>:<json>`. Text arrives as `0:"chunk"`, errors as
//! `3:"message"`, and step/message completion as `e:{...}` / `d:{...}`.
//! Other part types (tool calls, annotations) are ignored.

use futures_util::StreamExt;
use reqwest::Response;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::error::ApiError;
use super::models::StreamEvent;

/// Process a chat data stream
///
/// Reads the response body incrementally and sends parsed events through the
/// provided channel. Respects the cancellation token for user interruption.
pub async fn process_stream(
    response: Response,
    tx: mpsc::Sender<StreamEvent>,
    cancel_token: CancellationToken,
) -> Result<(), ApiError> {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                return Err(ApiError::Cancelled);
            }

            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        buffer.extend_from_slice(&bytes);

                        // Split on bytes so multi-byte Arabic chars are never cut in half
                        while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
                            let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                            let line = String::from_utf8_lossy(&line);
                            if let Some(event) = parse_line(line.trim_end()) {
                                if tx.send(event).await.is_err() {
                                    return Ok(());
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(ApiError::RequestError(e));
                    }
                    None => break,
                }
            }
        }
    }

    // Final line without a trailing newline
    let rest = String::from_utf8_lossy(&buffer);
    if let Some(event) = parse_line(rest.trim()) {
        let _ = tx.send(event).await;
    }

    Ok(())
}

/// Parse a single stream line
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    if line.is_empty() {
        return None;
    }

    let Some((kind, payload)) = line.split_once(':') else {
        // Plain text backends send raw chunks
        return Some(StreamEvent::TextDelta { text: line.to_string() });
    };

    match kind {
        "0" => {
            let text: String = serde_json::from_str(payload).ok()?;
            Some(StreamEvent::TextDelta { text })
        }
        "3" => {
            let message: String =
                serde_json::from_str(payload).unwrap_or_else(|_| payload.to_string());
            Some(StreamEvent::Error { message })
        }
        "d" | "e" => {
            let parsed: serde_json::Value = serde_json::from_str(payload).ok()?;
            let reason = parsed["finishReason"].as_str().map(|s| s.to_string());
            Some(StreamEvent::Finish { reason })
        }
        "2" | "8" | "9" | "a" | "b" | "c" | "f" | "g" | "h" | "i" | "j" | "k" => None,
        _ if !is_part_code(kind) => {
            // Not a part prefix, so the colon belongs to plain text
            Some(StreamEvent::TextDelta { text: line.to_string() })
        }
        _ => {
            tracing::debug!("Unknown stream part type: {}", kind);
            None
        }
    }
}

/// Part codes are a single lowercase ASCII letter or digit
fn is_part_code(kind: &str) -> bool {
    let mut chars = kind.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit() || c.is_ascii_lowercase())
}
