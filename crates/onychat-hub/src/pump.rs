use std::fmt;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use onychat_protocol::{ClientFrame, Message};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::connection::{ConnId, Payload, Peer};
use crate::hub::HubHandle;

pub const CLOSE_GOING_AWAY: u16 = 1001;
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Transport-neutral view of one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    /// Peer-initiated close, with its status code if it sent one.
    Close(Option<u16>),
    /// Binary, ping, pong: nothing for the relay to do.
    Other,
}

/// Going-away and abnormal closure are routine; anything else is worth a warning.
fn is_expected_close(code: Option<u16>) -> bool {
    matches!(code, Some(CLOSE_GOING_AWAY) | Some(CLOSE_ABNORMAL))
}

/// Read frames until the transport ends, turning each valid one into a broadcast.
///
/// Always finishes by unregistering the connection and cancelling its
/// outbound pump.
pub async fn inbound<S, E>(
    mut stream: S,
    conn_id: ConnId,
    peer: Peer,
    hub: HubHandle,
    cancel: CancellationToken,
) where
    S: Stream<Item = Result<Frame, E>> + Unpin,
    E: fmt::Display,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(conn_id = %conn_id, "inbound pump cancelled");
                break;
            }
            next = stream.next() => next,
        };

        match next {
            Some(Ok(Frame::Text(text))) => {
                let frame = match ClientFrame::decode(&text) {
                    Ok(f) => f,
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "malformed frame");
                        continue;
                    }
                };
                let message =
                    Message::from_client(&peer.identity, peer.display_name.as_deref(), frame);
                if hub.broadcast(message).await.is_err() {
                    warn!(conn_id = %conn_id, "hub stopped; closing connection");
                    break;
                }
            }
            Some(Ok(Frame::Other)) => {}
            Some(Ok(Frame::Close(code))) => {
                log_close(conn_id, code);
                break;
            }
            Some(Err(e)) => {
                warn!(conn_id = %conn_id, error = %e, "read error");
                break;
            }
            None => {
                log_close(conn_id, Some(CLOSE_ABNORMAL));
                break;
            }
        }
    }

    if hub.unregister(conn_id).await.is_err() {
        debug!(conn_id = %conn_id, "hub already stopped; nothing to unregister");
    }
    cancel.cancel();
}

/// Drain the outbox onto the transport until the outbox closes, a write
/// fails, or the inbound side cancels. Closes the transport on the way out.
pub async fn outbound<K>(
    mut sink: K,
    conn_id: ConnId,
    mut outbox: mpsc::Receiver<Payload>,
    cancel: CancellationToken,
) where
    K: Sink<Payload> + Unpin,
    K::Error: fmt::Display,
{
    loop {
        let payload = tokio::select! {
            _ = cancel.cancelled() => break,
            next = outbox.recv() => match next {
                Some(p) => p,
                None => {
                    debug!(conn_id = %conn_id, "outbox closed");
                    break;
                }
            },
        };

        if let Err(e) = sink.send(payload).await {
            warn!(conn_id = %conn_id, error = %e, "write error");
            break;
        }
    }

    cancel.cancel();
    if let Err(e) = sink.close().await {
        debug!(conn_id = %conn_id, error = %e, "transport close failed");
    }
}

fn log_close(conn_id: ConnId, code: Option<u16>) {
    if is_expected_close(code) {
        debug!(conn_id = %conn_id, ?code, "connection closed by peer");
    } else {
        warn!(conn_id = %conn_id, ?code, "unexpected close");
    }
}
