pub mod event;
pub mod ids;
pub mod query;
pub mod settings;
pub mod severity;
pub mod user;

pub use event::{EventDetail, EventPage, EventSummary, LogEvent, NewEvent};
pub use ids::{EventId, IdError, UserId};
pub use query::{EventFilter, EventListParams, EventOrder, EventQuery, SortDirection, PAGE_SIZE};
pub use settings::ClientSettings;
pub use severity::Severity;
pub use user::{UserAccount, UserRef};
