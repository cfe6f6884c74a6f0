pub mod error;
pub mod message;

pub use error::ProtocolError;
pub use message::{ClientFrame, Message};
