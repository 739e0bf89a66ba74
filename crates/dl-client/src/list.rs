use crate::error::ClientError;
use crate::router::{Location, Route, Router};
use crate::state::LoadState;
use crate::store::{EventStore, params_from_query};
use dl_core::types::{
    ClientSettings, EventListParams, EventOrder, EventPage, EventSummary, PAGE_SIZE, Severity,
    SortDirection,
};
use dl_core::validation::parse_type_list;
use std::sync::Arc;
use tokio::sync::watch;

/// Filter, sort and page selection as carried by the route query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub types: Vec<String>,
    pub severities: Vec<Severity>,
    pub order: Option<EventOrder>,
    pub sort: Option<SortDirection>,
    pub page: u32,
}

impl ListState {
    /// Reads the selection from a route. Unparseable values are ignored here;
    /// the server is the one that rejects them.
    pub fn from_location(location: &Location) -> Self {
        let severities = location
            .get("severity")
            .map(|list| {
                list.split(',')
                    .filter_map(|item| item.trim().parse::<i64>().ok())
                    .filter_map(|level| Severity::from_level(level).ok())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            types: parse_type_list(location.get("type")),
            severities,
            order: location.get("order").and_then(EventOrder::parse),
            sort: location.get("sort").and_then(SortDirection::parse),
            page: location
                .get("page")
                .and_then(|page| page.parse().ok())
                .unwrap_or(0),
        }
    }

    pub fn to_location(&self) -> Location {
        let mut location = Location::root();
        location.set("type", join_types(&self.types));
        location.set("severity", join_severities(&self.severities));
        location.set("order", self.order.map(|order| order.as_str().to_string()));
        location.set("sort", self.sort.map(|sort| sort.as_str().to_string()));
        location.set("page", (self.page > 0).then(|| self.page.to_string()));
        location
    }
}

fn join_types(types: &[String]) -> Option<String> {
    (!types.is_empty()).then(|| types.join(","))
}

fn join_severities(severities: &[Severity]) -> Option<String> {
    (!severities.is_empty()).then(|| {
        severities
            .iter()
            .map(|severity| severity.level().to_string())
            .collect::<Vec<_>>()
            .join(",")
    })
}

/// A fetch that has been issued but not applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    params: EventListParams,
}

impl LoadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn params(&self) -> &EventListParams {
        &self.params
    }
}

/// Display state of a sortable column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortIndicator {
    pub active: bool,
    /// Direction a click on the header would switch to.
    pub next: SortDirection,
}

impl SortIndicator {
    pub fn css_class(self) -> &'static str {
        match self.next {
            SortDirection::Asc => "tablesort--asc",
            SortDirection::Desc => "tablesort--desc",
        }
    }
}

/// The event list. Every user action turns into a navigation; data is only
/// ever loaded from the route.
pub struct ListView {
    store: Arc<dyn EventStore>,
    router: Router,
    settings: ClientSettings,
    state: LoadState,
    events: Vec<EventSummary>,
    total: u64,
    type_options: Vec<String>,
    selected_types: Vec<String>,
    selected_severities: Vec<Severity>,
    issued: u64,
}

impl ListView {
    pub fn new(store: Arc<dyn EventStore>, router: Router, settings: ClientSettings) -> Self {
        Self {
            store,
            router,
            settings,
            state: LoadState::Idle,
            events: Vec::new(),
            total: 0,
            type_options: Vec::new(),
            selected_types: Vec::new(),
            selected_severities: Vec::new(),
            issued: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn events(&self) -> &[EventSummary] {
        &self.events
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn type_options(&self) -> &[String] {
        &self.type_options
    }

    pub fn selected_types(&self) -> &[String] {
        &self.selected_types
    }

    pub fn selected_severities(&self) -> &[Severity] {
        &self.selected_severities
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(PAGE_SIZE))
    }

    /// The page shown, as requested by the route.
    pub fn current_page(&self) -> u32 {
        ListState::from_location(&self.router.current()).page
    }

    /// Severity filter options in level order, labelled from the settings.
    pub fn severity_options(&self) -> Vec<(Severity, &str)> {
        Severity::ALL
            .iter()
            .map(|&severity| (severity, self.settings.severity_label(severity)))
            .collect()
    }

    /// Starts a fetch for the current route. Checkbox selections are reset
    /// to what the route says.
    pub fn begin_load(&mut self) -> LoadTicket {
        let location = self.router.current();
        let selection = ListState::from_location(&location);
        self.selected_types = selection.types;
        self.selected_severities = selection.severities;

        self.issued += 1;
        self.state = LoadState::Loading;
        LoadTicket {
            seq: self.issued,
            params: params_from_query(&location.query),
        }
    }

    /// Applies a finished fetch. Returns `false` and changes nothing when a
    /// newer fetch has been issued since.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<EventPage, ClientError>,
    ) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.issued,
                "discarding stale event page"
            );
            return false;
        }
        match result {
            Ok(page) => {
                self.events = page.data;
                self.total = page.total;
                self.type_options = page.type_options;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load events");
                self.state = LoadState::Failed {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
            }
        }
        true
    }

    pub async fn refresh(&mut self) {
        let ticket = self.begin_load();
        let result = self.store.get_records(ticket.params()).await;
        self.finish_load(ticket, result);
    }

    /// Re-issues the failed fetch. Does nothing unless the last failure is
    /// retryable.
    pub async fn retry(&mut self) -> bool {
        if !self.state.can_retry() {
            return false;
        }
        self.refresh().await;
        true
    }

    /// Loads the current route, then reloads on every navigation that lands
    /// on the list. Returns once the router is gone.
    pub async fn run(&mut self) {
        let mut changes = self.router.subscribe();
        if self.router.route() == Some(Route::List) {
            self.refresh().await;
        }
        while self.follow(&mut changes).await {}
    }

    /// Waits for the next navigation and reloads if it targets the list.
    /// Returns `false` when the router has been dropped.
    pub async fn follow(&mut self, changes: &mut watch::Receiver<Location>) -> bool {
        if changes.changed().await.is_err() {
            return false;
        }
        let route = Route::resolve(&changes.borrow_and_update());
        if route == Some(Route::List) {
            self.refresh().await;
        }
        true
    }

    /// Route for a click on the header of `order`. The direction always
    /// flips from the current one, a missing direction counting as
    /// descending. Pending checkbox selections ride along.
    pub fn sort_location(&self, order: EventOrder) -> Location {
        let mut location = self.router.current();
        let sort = match location.get("sort").and_then(SortDirection::parse) {
            Some(SortDirection::Asc) => SortDirection::Desc,
            Some(SortDirection::Desc) | None => SortDirection::Asc,
        };
        location.set("order", Some(order.as_str().to_string()));
        location.set("sort", Some(sort.as_str().to_string()));
        location.set("type", join_types(&self.selected_types));
        location.set("severity", join_severities(&self.selected_severities));
        location.set("page", None);
        location
    }

    pub fn sort_by(&self, order: EventOrder) -> bool {
        self.router.push(self.sort_location(order))
    }

    pub fn sort_indicator(&self, order: EventOrder, is_default: bool) -> SortIndicator {
        let location = self.router.current();
        let active = match location.get("order") {
            Some(current) => current == order.as_str(),
            None => is_default,
        };
        let next = match location.get("sort").and_then(SortDirection::parse) {
            Some(SortDirection::Asc) => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        SortIndicator { active, next }
    }

    pub fn is_type_selected(&self, event_type: &str) -> bool {
        self.selected_types.iter().any(|selected| selected == event_type)
    }

    pub fn is_severity_selected(&self, severity: Severity) -> bool {
        self.selected_severities.contains(&severity)
    }

    /// Flips a type checkbox. Takes effect on the next [`ListView::filter`].
    pub fn toggle_type(&mut self, event_type: &str) {
        if let Some(index) = self
            .selected_types
            .iter()
            .position(|selected| selected == event_type)
        {
            self.selected_types.remove(index);
        } else {
            self.selected_types.push(event_type.to_string());
        }
    }

    pub fn toggle_severity(&mut self, severity: Severity) {
        if let Some(index) = self
            .selected_severities
            .iter()
            .position(|&selected| selected == severity)
        {
            self.selected_severities.remove(index);
        } else {
            self.selected_severities.push(severity);
        }
    }

    /// Route with the checkbox selections applied. Empty selections drop the
    /// key; the page goes back to the first one.
    pub fn filter_location(&self) -> Location {
        let mut location = self.router.current();
        location.set("type", join_types(&self.selected_types));
        location.set("severity", join_severities(&self.selected_severities));
        location.set("page", None);
        location
    }

    pub fn filter(&self) -> bool {
        self.router.push(self.filter_location())
    }

    pub fn reset(&mut self) -> bool {
        self.selected_types.clear();
        self.selected_severities.clear();
        self.filter()
    }

    pub fn page_location(&self, page: u32) -> Location {
        let mut location = self.router.current();
        location.set("page", (page > 0).then(|| page.to_string()));
        location
    }

    pub fn go_to_page(&self, page: u32) -> bool {
        self.router.push(self.page_location(page))
    }

    /// CSS class for a pager entry.
    pub fn active_class(&self, page: u32) -> &'static str {
        if page == self.current_page() {
            "is-active"
        } else {
            ""
        }
    }
}
