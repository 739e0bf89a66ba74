use crate::types::ids::{EventId, UserId};
use crate::types::severity::Severity;
use crate::types::user::UserRef;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of the `watchdog` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub id: EventId,
    pub event_type: String,
    pub user_id: Option<UserId>,
    pub timestamp: i64,
    pub message: String,
    pub variables: Option<String>,
    pub severity: Severity,
    pub link: Option<String>,
    pub location: String,
    pub referrer: Option<String>,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub user_id: Option<UserId>,
    pub timestamp: i64,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
    #[schema(value_type = u8)]
    pub severity: Severity,
    pub link: Option<String>,
    pub location: String,
    pub referrer: Option<String>,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub user: UserRef,
    pub date: String,
    pub message: String,
    pub severity_class: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventDetail {
    #[serde(rename = "type")]
    pub event_type: String,
    pub user: UserRef,
    pub date: String,
    pub message: String,
    #[schema(value_type = u8)]
    pub severity: Severity,
    pub referrer: Option<String>,
    pub hostname: String,
    pub location: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub data: Vec<EventSummary>,
    pub total: u64,
    pub type_options: Vec<String>,
}

impl EventPage {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            type_options: Vec::new(),
        }
    }
}
