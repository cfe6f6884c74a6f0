pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::UserError;
pub use store::ProfileStore;
pub use types::{NewProfile, Profile};
