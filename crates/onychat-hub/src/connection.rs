use std::fmt;
use std::sync::Arc;

use futures_util::{Sink, Stream};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::hub::HubHandle;
use crate::pump::{self, Frame};

/// One serialized message, shared by every outbox it is queued on.
pub type Payload = Arc<str>;

/// Opaque per-connection handle. Membership is keyed by this, not by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnId(Uuid);

impl ConnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated party behind a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub identity: String,
    pub display_name: Option<String>,
}

impl Peer {
    pub fn new(identity: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name,
        }
    }
}

/// Hub-side view of a live connection: who it is and where to queue output.
///
/// The hub holds the only outbox sender, so dropping the handle closes
/// the outbox and ends the outbound pump.
#[derive(Debug)]
pub struct ConnHandle {
    id: ConnId,
    peer: Peer,
    outbox: mpsc::Sender<Payload>,
}

impl ConnHandle {
    /// Create a handle plus the receiving end of its bounded outbox.
    pub fn new(peer: Peer, outbox_capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (outbox, rx) = mpsc::channel(outbox_capacity.max(1));
        let handle = Self {
            id: ConnId::new(),
            peer,
            outbox,
        };
        (handle, rx)
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    pub(crate) fn outbox(&self) -> &mpsc::Sender<Payload> {
        &self.outbox
    }
}

/// Membership snapshot entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub conn_id: ConnId,
    pub identity: String,
}

/// Drive one authenticated connection from registration to teardown.
///
/// Registers with the hub, then runs the inbound and outbound pumps as
/// separate tasks sharing a cancellation token: whichever pump stops first
/// cancels the other. Returns after both tasks have been joined and the
/// connection has been unregistered.
pub async fn serve_connection<S, E, K>(
    hub: HubHandle,
    peer: Peer,
    stream: S,
    sink: K,
    outbox_capacity: usize,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<Frame, E>> + Send + Unpin + 'static,
    E: fmt::Display + Send + 'static,
    K: Sink<Payload> + Send + Unpin + 'static,
    K::Error: fmt::Display + Send,
{
    let (conn, outbox) = ConnHandle::new(peer.clone(), outbox_capacity);
    let conn_id = conn.id();
    hub.register(conn).await?;

    let cancel = CancellationToken::new();
    let writer = tokio::spawn(pump::outbound(sink, conn_id, outbox, cancel.clone()));
    let reader = tokio::spawn(pump::inbound(stream, conn_id, peer.clone(), hub, cancel));

    let (read_res, write_res) = tokio::join!(reader, writer);
    if let Err(e) = read_res {
        warn!(conn_id = %conn_id, error = %e, "inbound pump aborted");
    }
    if let Err(e) = write_res {
        warn!(conn_id = %conn_id, error = %e, "outbound pump aborted");
    }

    info!(conn_id = %conn_id, identity = %peer.identity, "connection closed");
    Ok(())
}
