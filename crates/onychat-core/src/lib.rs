pub mod config;
pub mod error;

pub use config::OnychatConfig;
pub use error::{OnychatError, Result};
