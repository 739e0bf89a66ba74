//! Client side of the database log viewer: an HTTP event store, a small
//! router whose location is the single source of view state, and the list
//! and detail views driven by it.

pub mod detail;
pub mod error;
pub mod list;
pub mod router;
pub mod state;
pub mod store;

pub use detail::DetailView;
pub use error::ClientError;
pub use list::ListView;
pub use router::{Location, Route, Router};
pub use state::LoadState;
pub use store::{EventStore, HttpEventStore};
