use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite};

use libprotocol::SignalMessage;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),
    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),
    #[error("connection closed before REGISTER_SUCCESS")]
    ConnectionClosed,
    #[error(transparent)]
    Protocol(#[from] libprotocol::ProtocolError),
}

/// What one connect/register/disconnect cycle produced. Failures carry a
/// reason for diagnostics but are never surfaced to the user.
#[derive(Debug)]
pub enum CycleOutcome {
    Success { latency_secs: f64 },
    Failure(CycleError),
}

/// One full cycle against `url`: fresh connection, one REGISTER_REQUEST,
/// wait for the matching success, tear down. Every transport error is
/// absorbed into the outcome; the caller just starts the next cycle.
pub async fn run_cycle(url: &str) -> CycleOutcome {
    match exchange(url).await {
        Ok(latency_secs) => CycleOutcome::Success { latency_secs },
        Err(err) => CycleOutcome::Failure(err),
    }
}

async fn exchange(url: &str) -> Result<f64, CycleError> {
    let request = SignalMessage::register_request().to_json()?;

    let (mut ws, _) = connect_async(url).await.map_err(CycleError::Connect)?;

    let t0 = Instant::now();
    ws.send(tungstenite::Message::text(request))
        .await
        .map_err(CycleError::Send)?;

    loop {
        let frame = match ws.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => return Err(CycleError::Receive(err)),
            None => return Err(CycleError::ConnectionClosed),
        };
        let t1 = Instant::now();

        let tungstenite::Message::Text(text) = frame else {
            continue;
        };
        // not yet the answer: unparsable payloads and unrelated message
        // types keep the receive loop waiting on the same connection
        let Ok(reply) = SignalMessage::parse(text.as_str()) else {
            continue;
        };
        if reply.is_register_success() {
            let _ = ws.close(None).await;
            return Ok((t1 - t0).as_secs_f64());
        }
    }
}
