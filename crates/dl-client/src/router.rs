use dl_core::types::EventId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use url::form_urlencoded;

/// Route query parameters. Repeated keys collapse into one comma-joined
/// value.
pub type Query = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Query,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: Query::new(),
        }
    }

    pub fn new(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    pub fn event(id: EventId) -> Self {
        Self::new(format!("/event/{id}"), Query::new())
    }

    /// Parses `/path?query`, tolerating a leading `#` or `#!` from hash
    /// routing.
    pub fn parse(url: &str) -> Self {
        let url = url
            .trim()
            .trim_start_matches("#!")
            .trim_start_matches('#');
        let (path, raw_query) = url.split_once('?').unwrap_or((url, ""));
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let mut query = Query::new();
        for (key, value) in form_urlencoded::parse(raw_query.as_bytes()) {
            query
                .entry(key.into_owned())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        Self { path, query }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Sets `key`, or removes it when `value` is `None`.
    pub fn set(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.query.insert(key.to_string(), value);
            }
            None => {
                self.query.remove(key);
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Detail { id: EventId },
}

impl Route {
    /// Matches `/` and `/event/{id}`; anything else has no view.
    pub fn resolve(location: &Location) -> Option<Self> {
        let path = location.path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Self::List);
        }
        let id = path.strip_prefix("/event/")?;
        EventId::parse(id).ok().map(|id| Self::Detail { id })
    }
}

/// Holds the current location and notifies views when it changes.
#[derive(Clone)]
pub struct Router {
    current: Arc<watch::Sender<Location>>,
}

impl Router {
    pub fn new(initial: Location) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            current: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Location {
        self.current.borrow().clone()
    }

    pub fn route(&self) -> Option<Route> {
        Route::resolve(&self.current.borrow())
    }

    /// Navigates to `location`. Returns `false` when it equals the current
    /// location, in which case subscribers are not woken.
    pub fn push(&self, location: Location) -> bool {
        let changed = self.current.send_if_modified(|current| {
            if *current == location {
                false
            } else {
                *current = location;
                true
            }
        });
        if changed {
            tracing::debug!(location = %*self.current.borrow(), "navigated");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.current.subscribe()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Location::root())
    }
}
