use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// RFC 5424 log levels. Lower values are more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverity(pub i64);

impl fmt::Display for InvalidSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "severity out of range: {}", self.0)
    }
}

impl std::error::Error for InvalidSeverity {}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn from_level(level: i64) -> Result<Self, InvalidSeverity> {
        usize::try_from(level)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(InvalidSeverity(level))
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Emergency => "Emergency",
            Severity::Alert => "Alert",
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Notice => "Notice",
            Severity::Info => "Info",
            Severity::Debug => "Debug",
        }
    }

    /// Row class used by the list table.
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Emergency => "dblog-emergency",
            Severity::Alert => "dblog-alert",
            Severity::Critical => "dblog-critical",
            Severity::Error => "dblog-error",
            Severity::Warning => "dblog-warning",
            Severity::Notice => "dblog-notice",
            Severity::Info => "dblog-info",
            Severity::Debug => "dblog-debug",
        }
    }

    pub fn levels() -> BTreeMap<u8, String> {
        Self::ALL
            .iter()
            .map(|severity| (severity.level(), severity.label().to_string()))
            .collect()
    }
}

impl From<Severity> for u8 {
    fn from(value: Severity) -> Self {
        value.level()
    }
}

impl TryFrom<u8> for Severity {
    type Error = InvalidSeverity;

    fn try_from(value: u8) -> Result<Self, InvalidSeverity> {
        Severity::from_level(i64::from(value))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
