use crate::types::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Configuration handed to the viewer once, when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    /// Severity level to human label, used for filter options and the
    /// detail view.
    pub severity_levels: BTreeMap<u8, String>,
}

impl ClientSettings {
    pub fn standard() -> Self {
        Self {
            severity_levels: Severity::levels(),
        }
    }

    pub fn severity_label(&self, severity: Severity) -> &str {
        self.severity_levels
            .get(&severity.level())
            .map_or_else(|| severity.label(), String::as_str)
    }
}
