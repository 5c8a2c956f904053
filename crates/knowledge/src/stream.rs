//! Streaming fill protocol.
//!
//! Wire format: one JSON progress object per line, ending with the `ready`
//! object, then the literal line `---CSV---`, then the CSV body. A request
//! aborted by bad input ends with an `error` object and no body.

use crate::progress::{ProgressEvent, ProgressReporter};
use crate::service::AutofillService;
use autofill_core::{AppError, AppResult};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// Separator line between progress objects and the CSV body.
pub const CSV_DELIMITER: &str = "---CSV---";

/// One unit of the fill stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Progress(ProgressEvent),
    Body(String),
}

impl StreamFrame {
    /// Serialize to its wire representation.
    pub fn to_wire(&self) -> AppResult<String> {
        match self {
            StreamFrame::Progress(event) => Ok(format!("{}\n", serde_json::to_string(event)?)),
            StreamFrame::Body(csv) => Ok(format!("{}\n{}", CSV_DELIMITER, csv)),
        }
    }
}

/// Run a fill request, sending frames to `tx` as they are produced.
///
/// If the receiver is dropped the request is abandoned and `Ok(())` returned.
/// Request-fatal errors are sent as an `error` frame and also returned.
pub async fn stream_fill(
    service: &AutofillService,
    filename: &str,
    content: &[u8],
    tx: mpsc::UnboundedSender<StreamFrame>,
) -> AppResult<()> {
    let progress_tx = tx.clone();
    let reporter = ProgressReporter::new(Arc::new(move |event| {
        // A closed channel is picked up by the select below.
        let _ = progress_tx.send(StreamFrame::Progress(event));
    }));

    tokio::select! {
        biased;

        _ = tx.closed() => {
            tracing::info!("Consumer disconnected, abandoning fill of {}", filename);
            Ok(())
        }

        result = service.fill(filename, content, &reporter) => {
            let result = result?;
            if tx.send(StreamFrame::Body(result.csv_output)).is_err() {
                tracing::info!("Consumer disconnected before the CSV body of {}", filename);
            }
            Ok(())
        }
    }
}

/// Write frames from `rx` to `writer` until the sender side closes.
///
/// Returns the CSV body, if the stream carried one.
pub async fn forward<W>(
    mut rx: mpsc::UnboundedReceiver<StreamFrame>,
    writer: &mut W,
) -> AppResult<Option<String>>
where
    W: AsyncWrite + Unpin,
{
    let mut body = None;
    while let Some(frame) = rx.recv().await {
        writer.write_all(frame.to_wire()?.as_bytes()).await?;
        writer.flush().await?;
        if let StreamFrame::Body(csv) = frame {
            body = Some(csv);
        }
    }
    Ok(body)
}

/// Split a complete stream into its progress events and CSV body.
pub fn parse_stream(text: &str) -> AppResult<(Vec<ProgressEvent>, Option<String>)> {
    let mut events = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let (line, tail) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };

        if line == CSV_DELIMITER {
            return Ok((events, Some(tail.to_string())));
        }

        if !line.trim().is_empty() {
            let event: ProgressEvent = serde_json::from_str(line).map_err(|e| {
                AppError::Serialization(format!("Invalid progress line {:?}: {}", line, e))
            })?;
            events.push(event);
        }
        rest = tail;
    }

    Ok((events, None))
}
