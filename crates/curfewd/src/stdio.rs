//! NDJSON front-end transport over stdin/stdout

use anyhow::{Context, Result};
use curfew_api::{ErrorCode, ErrorInfo, EventPayload, Request, Response, ServerMessage};
use std::io::BufRead;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Read one request per line until EOF.
///
/// Blocking; run on a dedicated thread. Lines that do not parse are answered
/// with an `invalid_request` error instead of reaching the driver.
pub fn read_requests<R: BufRead>(
    reader: R,
    requests: mpsc::UnboundedSender<Request>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read request line");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                if requests.send(request).is_err() {
                    debug!("Driver gone, stopping request reader");
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "Invalid request");
                let response = Response::error(
                    request_id_of(line),
                    ErrorInfo::new(ErrorCode::InvalidRequest, format!("Invalid request: {}", e)),
                );
                if outbound.send(ServerMessage::Response(response)).is_err() {
                    return;
                }
            }
        }
    }

    info!("Front-end input closed");
}

/// Best-effort request id from a line that failed to parse as a `Request`
fn request_id_of(line: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| value.get("request_id")?.as_u64())
        .unwrap_or(0)
}

/// Write every outbound message as one JSON line.
///
/// Returns after the shutdown event is written or the channel closes.
pub async fn write_messages<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut messages: mpsc::UnboundedReceiver<ServerMessage>,
) -> Result<()> {
    while let Some(message) = messages.recv().await {
        let mut json = serde_json::to_string(&message).context("Failed to encode message")?;
        json.push('\n');

        writer
            .write_all(json.as_bytes())
            .await
            .context("Failed to write message")?;
        writer.flush().await.context("Failed to flush output")?;

        if let ServerMessage::Event(event) = &message
            && matches!(event.payload, EventPayload::Shutdown)
        {
            break;
        }
    }

    Ok(())
}
