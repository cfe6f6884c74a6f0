//! Adapts an axum WebSocket to the hub's transport-neutral pumps.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{future, SinkExt, StreamExt};
use onychat_hub::{serve_connection, Frame, Payload, Peer};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;

/// Lives for the whole WS session.
pub async fn run_connection(socket: WebSocket, state: Arc<AppState>, peer: Peer) {
    info!(identity = %peer.identity, "websocket connected");

    let (sink, stream) = socket.split();
    let stream = stream.map(|msg| msg.map(to_frame));
    let sink = sink.with(|payload: Payload| {
        future::ready(Ok::<_, axum::Error>(Message::Text(payload.as_ref().into())))
    });

    let identity = peer.identity.clone();
    if let Err(e) = serve_connection(
        state.hub.clone(),
        peer,
        stream,
        sink,
        state.config.hub.outbox_capacity,
    )
    .await
    {
        warn!(identity = %identity, error = %e, "connection not served");
    }
}

fn to_frame(msg: Message) -> Frame {
    match msg {
        Message::Text(text) => Frame::Text(text.as_str().to_owned()),
        Message::Close(Some(cf)) => Frame::Close(Some(cf.code)),
        Message::Close(None) => Frame::Close(None),
        _ => Frame::Other,
    }
}
