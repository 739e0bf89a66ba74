use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EventId(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    InvalidFormat { value: String },
    Negative { value: i64 },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat { value } => write!(f, "invalid id format: {value}"),
            Self::Negative { value } => write!(f, "id must not be negative: {value}"),
        }
    }
}

impl std::error::Error for IdError {}

fn parse_non_negative(value: &str) -> Result<i64, IdError> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|_| IdError::InvalidFormat {
            value: value.to_string(),
        })?;
    if parsed < 0 {
        return Err(IdError::Negative { value: parsed });
    }
    Ok(parsed)
}

impl EventId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn parse(value: &str) -> Result<Self, IdError> {
        parse_non_negative(value).map(Self)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl UserId {
    /// uid 0 is the anonymous account.
    pub const ANONYMOUS: UserId = UserId(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_anonymous(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for EventId {
    type Err = IdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
