//! Supervisord event-listener notification protocol loop.
//!
//! Implements the READY / RESULT handshake over the supervisor's pipes:
//! emit `READY\n`, read one event token line, dispatch it, report the
//! outcome, repeat. Every protocol violation closes the loop instead of
//! being skipped; the supervisor is expected to restart the listener.
//! The loop is generic over its streams so tests can drive it with
//! in-memory buffers.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use tickgate_core::{EventName, Outcome};
use tickgate_throttle::EventHandler;

use crate::parser::parse_token;

const READY: &[u8] = b"READY\n";
const RESULT_OK: &[u8] = b"RESULT 2\nOK";
const RESULT_FAIL: &[u8] = b"RESULT 4\nFAIL";

/// Why the protocol loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The supervisor closed our input pipe.
    InputClosed,
    /// A token arrived without an `eventname` header.
    MissingEventName,
    /// An event outside the supported set arrived.
    UnsupportedEvent,
    /// The engine asked for termination or failed internally.
    EngineTerminated,
}

pub struct ProtocolLoop {
    handler: Arc<dyn EventHandler>,
}

impl ProtocolLoop {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    /// Run the handshake until the supervisor hangs up or a protocol
    /// violation occurs. Returns how the loop closed; write failures on
    /// the output stream surface as I/O errors.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<CloseReason>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            writer.write_all(READY).await?;
            writer.flush().await?;

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("input closed, exiting");
                    return Ok(CloseReason::InputClosed);
                }
                Err(e) => {
                    warn!(error = %e, "input unreadable, exiting");
                    return Ok(CloseReason::InputClosed);
                }
            };
            if line.trim().is_empty() {
                info!("blank token, exiting");
                return Ok(CloseReason::InputClosed);
            }

            let headers = parse_token(&line);
            let Some(raw_event) = headers.get("eventname") else {
                warn!(token = %line, "token missing eventname, closing");
                return Ok(CloseReason::MissingEventName);
            };
            let Some(event) = EventName::parse(raw_event) else {
                warn!(event = %raw_event, "unsupported event, closing");
                return Ok(CloseReason::UnsupportedEvent);
            };

            match self.handler.handle(event).await {
                Ok(Outcome::Success) => {
                    writer.write_all(RESULT_OK).await?;
                }
                Ok(Outcome::BusinessFailure) => {
                    writer.write_all(RESULT_FAIL).await?;
                }
                Ok(Outcome::Terminate) => {
                    warn!(event = %event, "engine requested termination");
                    return Ok(CloseReason::EngineTerminated);
                }
                Err(e) => {
                    warn!(event = %event, error = %e, "engine error, closing");
                    return Ok(CloseReason::EngineTerminated);
                }
            }
        }
    }
}
