pub mod dblog;
pub mod error;
pub mod events;
pub mod format;
pub mod store;
pub mod users;
pub mod validation;

pub mod types;

pub use crate::dblog::Dblog;
pub use crate::error::DblogError;
pub use crate::store::Store;
