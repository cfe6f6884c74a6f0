use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use onychat_core::config::HubConfig;
use onychat_protocol::Message;
use tokio::sync::{mpsc, oneshot};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::connection::{ConnHandle, ConnId, Member, Payload};
use crate::error::{HubError, Result};
use crate::store::MessageStore;

/// Everything the control loop can be asked to do.
enum HubEvent {
    Register(ConnHandle),
    Unregister(ConnId),
    Broadcast(Message),
    Members(oneshot::Sender<Vec<Member>>),
}

/// Single owner of the membership set.
///
/// Mutated only from [`Hub::run`]; there is no lock around `members`
/// because nothing else can reach it.
pub struct Hub {
    members: HashMap<ConnId, ConnHandle>,
    events: mpsc::Receiver<HubEvent>,
    store: Arc<dyn MessageStore>,
    persist_timeout: Duration,
}

/// Cheap, cloneable submitter of hub events.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubEvent>,
}

impl Hub {
    pub fn new(store: Arc<dyn MessageStore>, config: HubConfig) -> (Self, HubHandle) {
        let (tx, events) = mpsc::channel(config.event_queue.max(1));
        let hub = Self {
            members: HashMap::new(),
            events,
            store,
            persist_timeout: config.persist_timeout(),
        };
        (hub, HubHandle { tx })
    }

    /// Control loop. Returns once every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        info!("hub control loop started");
        while let Some(event) = self.events.recv().await {
            match event {
                HubEvent::Register(conn) => self.register(conn),
                HubEvent::Unregister(id) => self.unregister(&id),
                HubEvent::Broadcast(message) => self.broadcast(message).await,
                HubEvent::Members(reply) => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }
        // dropping the map closes every remaining outbox
        info!(members = self.members.len(), "hub control loop stopped");
    }

    fn register(&mut self, conn: ConnHandle) {
        let id = conn.id();
        let identity = conn.peer().identity.clone();
        let previous = self.members.insert(id, conn);
        // ConnHandle is not Clone and ids are fresh UUIDs
        debug_assert!(previous.is_none(), "conn_id {id} registered twice");
        info!(conn_id = %id, identity = %identity, members = self.members.len(), "registered");
    }

    fn unregister(&mut self, id: &ConnId) {
        match self.members.remove(id) {
            Some(conn) => info!(
                conn_id = %id,
                identity = %conn.peer().identity,
                members = self.members.len(),
                "unregistered"
            ),
            None => debug!(conn_id = %id, "unregister for absent connection ignored"),
        }
    }

    async fn broadcast(&mut self, message: Message) {
        self.persist(&message).await;

        let payload: Payload = match message.encode() {
            Ok(json) => Arc::from(json),
            Err(e) => {
                error!(sender = message.sender_id(), error = %e, "failed to encode message");
                return;
            }
        };

        // Non-blocking enqueue; a full or closed outbox costs that member its
        // membership, never the broadcaster's progress.
        self.members.retain(|id, conn| match conn.outbox().try_send(payload.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(conn_id = %id, identity = %conn.peer().identity, "outbox full; dropping slow consumer");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(conn_id = %id, "outbox already closed; dropping member");
                false
            }
        });
        debug!(members = self.members.len(), "broadcast delivered");
    }

    /// Store the message under the hub's deadline. Failure never blocks delivery.
    async fn persist(&self, message: &Message) {
        match tokio::time::timeout(self.persist_timeout, self.store.persist(message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(sender = message.sender_id(), error = %e, "failed to persist message"),
            Err(_) => warn!(
                sender = message.sender_id(),
                timeout_ms = self.persist_timeout.as_millis() as u64,
                "persisting message timed out"
            ),
        }
    }

    fn snapshot(&self) -> Vec<Member> {
        self.members
            .values()
            .map(|conn| Member {
                conn_id: conn.id(),
                identity: conn.peer().identity.clone(),
            })
            .collect()
    }
}

impl HubHandle {
    /// Add a connection. The hub takes sole ownership of its outbox sender.
    pub async fn register(&self, conn: ConnHandle) -> Result<()> {
        self.submit(HubEvent::Register(conn)).await
    }

    /// Remove a connection and close its outbox. Absent ids are a no-op.
    pub async fn unregister(&self, id: ConnId) -> Result<()> {
        self.submit(HubEvent::Unregister(id)).await
    }

    /// Persist then fan out to every member registered at this point in the order.
    pub async fn broadcast(&self, message: Message) -> Result<()> {
        self.submit(HubEvent::Broadcast(message)).await
    }

    /// Snapshot of the membership set, ordered with all other events.
    pub async fn members(&self) -> Result<Vec<Member>> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubEvent::Members(reply)).await?;
        rx.await.map_err(|_| HubError::Stopped)
    }

    async fn submit(&self, event: HubEvent) -> Result<()> {
        self.tx.send(event).await.map_err(|_| HubError::Stopped)
    }
}
