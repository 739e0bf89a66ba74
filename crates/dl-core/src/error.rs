use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found")]
    NotFound,
    #[error("invalid order: {value}")]
    InvalidOrder { value: String },
    #[error("invalid sort: {value}")]
    InvalidSort { value: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {message}")]
    Query { message: String },
    #[error("corrupt row: {message}")]
    CorruptRow { message: String },
}

#[derive(Debug, Error)]
pub enum DblogError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
