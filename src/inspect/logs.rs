// Follows a container's log stream and writes frame payloads to the terminal

use crate::format::rule;
use crate::frame::decode_frame;
use crate::gateway::{Gateway, LogOptions};
use futures_util::StreamExt;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why the log loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogExit {
    Cancelled,
    EndOfStream,
    Failed,
}

/// Opens the stream once, then copies payloads until cancellation, end of
/// stream, or the first error.
pub async fn tail_logs(
    gateway: Arc<dyn Gateway>,
    id: String,
    options: LogOptions,
    cancel: CancellationToken,
    mut out: Box<dyn Write + Send>,
) -> LogExit {
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return LogExit::Cancelled,
        r = gateway.stream_logs(&id, options) => r,
    };
    let mut stream = match opened {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, operation = "stream_logs", container = %id, "log stream unavailable");
            let _ = writeln!(out, "\nError: failed to get container logs: {}", e);
            return LogExit::Failed;
        }
    };

    let _ = writeln!(out, "\nRecent logs:");
    let _ = writeln!(out, "{}", rule('-'));

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return LogExit::Cancelled,
            next = stream.next() => next,
        };
        match next {
            None => {
                debug!(container = %id, "log stream ended");
                return LogExit::EndOfStream;
            }
            Some(Err(e)) => {
                warn!(error = %e, operation = "read_logs", container = %id, "log stream failed");
                let _ = writeln!(out, "\nError: failed to read logs: {}", e);
                return LogExit::Failed;
            }
            Some(Ok(chunk)) => {
                let Some(frame) = decode_frame(&chunk) else {
                    debug!(len = chunk.len(), "short log chunk ignored");
                    continue;
                };
                if frame.payload.is_empty() {
                    continue;
                }
                if let Err(e) = out.write_all(frame.payload).and_then(|_| out.flush()) {
                    debug!(error = %e, operation = "write_logs", "terminal closed");
                    return LogExit::Failed;
                }
            }
        }
    }
}
