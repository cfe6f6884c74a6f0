pub mod db;
pub mod error;
pub mod log;

pub use error::MessageLogError;
pub use log::MessageLog;
