use crate::error::ClientError;
use crate::router::{Location, Route, Router};
use crate::state::LoadState;
use crate::store::EventStore;
use dl_core::types::{ClientSettings, EventDetail, EventId};
use std::sync::Arc;
use tokio::sync::watch;

/// Full view of one event. Read-only: it loads once per id.
pub struct DetailView {
    store: Arc<dyn EventStore>,
    settings: ClientSettings,
    state: LoadState,
    id: Option<EventId>,
    event: Option<EventDetail>,
}

impl DetailView {
    pub fn new(store: Arc<dyn EventStore>, settings: ClientSettings) -> Self {
        Self {
            store,
            settings,
            state: LoadState::Idle,
            id: None,
            event: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn event(&self) -> Option<&EventDetail> {
        self.event.as_ref()
    }

    /// Loads the event when `location` is a detail route. Returns `false`
    /// for any other route.
    pub async fn enter(&mut self, location: &Location) -> bool {
        match Route::resolve(location) {
            Some(Route::Detail { id }) => {
                self.load(id).await;
                true
            }
            _ => false,
        }
    }

    /// Loads whatever detail route the router is on, then keeps following
    /// navigation until the router goes away.
    pub async fn run(&mut self, router: &Router) {
        let mut changes = router.subscribe();
        let location = changes.borrow_and_update().clone();
        self.enter(&location).await;
        while self.follow(&mut changes).await {}
    }

    /// Waits for the next navigation and loads the event if it targets a
    /// detail route. Returns `false` when the router has been dropped.
    pub async fn follow(&mut self, changes: &mut watch::Receiver<Location>) -> bool {
        if changes.changed().await.is_err() {
            return false;
        }
        let location = changes.borrow_and_update().clone();
        self.enter(&location).await;
        true
    }

    pub async fn load(&mut self, id: EventId) {
        if self.id != Some(id) {
            self.event = None;
        }
        self.id = Some(id);
        self.state = LoadState::Loading;

        match self.store.get_record(id).await {
            Ok(event) => {
                self.event = Some(event);
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                if matches!(err, ClientError::NotFound) {
                    self.event = None;
                    tracing::debug!(%id, "event not found");
                } else {
                    tracing::warn!(%id, error = %err, "failed to load event");
                }
                self.state = LoadState::Failed {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
            }
        }
    }

    pub async fn retry(&mut self) -> bool {
        match self.id {
            Some(id) if self.state.can_retry() => {
                self.load(id).await;
                true
            }
            _ => false,
        }
    }

    /// Human label for the loaded event's severity.
    pub fn severity_label(&self) -> Option<&str> {
        self.event
            .as_ref()
            .map(|event| self.settings.severity_label(event.severity))
    }
}
