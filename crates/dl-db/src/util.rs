use dl_core::error::StoreError;
use serde_json::{Map, Value};

pub fn query_err(err: rusqlite::Error) -> StoreError {
    StoreError::Query {
        message: err.to_string(),
    }
}

pub fn corrupt(message: impl Into<String>) -> StoreError {
    StoreError::CorruptRow {
        message: message.into(),
    }
}

pub fn encode_variables(variables: Option<&Map<String, Value>>) -> Option<String> {
    variables.map(|map| Value::Object(map.clone()).to_string())
}

/// `?, ?, ?` with one placeholder per item.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
