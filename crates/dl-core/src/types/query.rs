use crate::types::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Fixed number of rows per page.
pub const PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventOrder {
    Type,
    #[default]
    Date,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl EventOrder {
    pub const ALL: [EventOrder; 3] = [EventOrder::Type, EventOrder::Date, EventOrder::User];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "type" => Some(Self::Type),
            "date" => Some(Self::Date),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Date => "date",
            Self::User => "user",
        }
    }
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for EventOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw query string of `GET /events`, validated by
/// [`crate::validation::parse_event_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct EventListParams {
    /// One of `type`, `date`, `user`.
    pub order: Option<String>,
    /// One of `asc`, `desc`.
    pub sort: Option<String>,
    /// Comma-separated list of event types.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Comma-separated list of severity levels (0-7).
    pub severity: Option<String>,
    /// Zero-based page index.
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub types: Vec<String>,
    pub severities: Vec<Severity>,
}

impl EventFilter {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.severities.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub filter: EventFilter,
    pub order: EventOrder,
    pub sort: SortDirection,
    pub page: u32,
}

impl EventQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(PAGE_SIZE)
    }
}
