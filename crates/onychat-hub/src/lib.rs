//! Connection registry and broadcast engine.
//!
//! One [`Hub`] control loop owns the membership set. Everything else talks
//! to it through a cloneable [`HubHandle`], so register, unregister and
//! broadcast are observed in a single total order.

pub mod connection;
pub mod error;
pub mod hub;
pub mod pump;
pub mod store;

pub use connection::{serve_connection, ConnHandle, ConnId, Member, Payload, Peer};
pub use error::{HubError, StoreError};
pub use hub::{Hub, HubHandle};
pub use pump::Frame;
pub use store::MessageStore;
