/// Lifecycle of a view's data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last request failed. Previously loaded data stays visible.
    Failed { message: String, retryable: bool },
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Failed { retryable: true, .. })
    }
}
