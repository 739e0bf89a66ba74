use crate::error::ClientError;
use crate::router::Query;
use async_trait::async_trait;
use dl_core::types::{ClientSettings, EventDetail, EventId, EventListParams, EventPage};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

/// The two reads the views need, plus the one-time settings fetch.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_records(&self, params: &EventListParams) -> Result<EventPage, ClientError>;
    async fn get_record(&self, id: EventId) -> Result<EventDetail, ClientError>;
    async fn settings(&self) -> Result<ClientSettings, ClientError>;
}

pub struct HttpEventStore {
    base_url: String,
    http: reqwest::Client,
}

impl HttpEventStore {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:4830/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn events_url(&self, params: &EventListParams) -> String {
        let query = encode_query(params);
        if query.is_empty() {
            format!("{}/events", self.base_url)
        } else {
            format!("{}/events?{query}", self.base_url)
        }
    }

    pub fn event_url(&self, id: EventId) -> String {
        format!("{}/event/{id}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        tracing::debug!(%url, "fetching");
        let response = self.http.get(url).send().await?;
        handle_response(response).await
    }
}

#[async_trait]
impl EventStore for HttpEventStore {
    async fn get_records(&self, params: &EventListParams) -> Result<EventPage, ClientError> {
        self.get(&self.events_url(params)).await
    }

    async fn get_record(&self, id: EventId) -> Result<EventDetail, ClientError> {
        self.get(&self.event_url(id)).await
    }

    async fn settings(&self) -> Result<ClientSettings, ClientError> {
        self.get(&format!("{}/settings", self.base_url)).await
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(error = %err, status = status.as_u16(), "failed to read error body");
            String::new()
        }
    };
    let message = error_message(&body);
    if status == StatusCode::BAD_REQUEST {
        return Err(ClientError::BadRequest { message });
    }
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pulls `message` out of the server's error envelope, falling back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Query string for the list endpoint. List values are already comma
/// joined; absent parameters are left out entirely.
pub fn encode_query(params: &EventListParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let pairs = [
        ("order", &params.order),
        ("sort", &params.sort),
        ("type", &params.event_type),
        ("severity", &params.severity),
        ("page", &params.page),
    ];
    for (key, value) in pairs {
        if let Some(value) = value {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Route query to endpoint parameters. Unknown keys are dropped.
pub fn params_from_query(query: &Query) -> EventListParams {
    let take = |key: &str| query.get(key).cloned();
    EventListParams {
        order: take("order"),
        sort: take("sort"),
        event_type: take("type"),
        severity: take("severity"),
        page: take("page"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_only_present_parameters() {
        let params = EventListParams {
            order: Some("type".to_string()),
            sort: Some("asc".to_string()),
            event_type: Some("page not found,php".to_string()),
            ..EventListParams::default()
        };
        assert_eq!(
            encode_query(&params),
            "order=type&sort=asc&type=page+not+found%2Cphp"
        );
        assert_eq!(encode_query(&EventListParams::default()), "");
    }

    #[test]
    fn builds_endpoint_urls() {
        let store = HttpEventStore::new("http://localhost:4830/api/");
        assert_eq!(
            store.events_url(&EventListParams::default()),
            "http://localhost:4830/api/events"
        );
        let params = EventListParams {
            severity: Some("3,4".to_string()),
            ..EventListParams::default()
        };
        assert_eq!(
            store.events_url(&params),
            "http://localhost:4830/api/events?severity=3%2C4"
        );
        assert_eq!(
            store.event_url(EventId::new(12)),
            "http://localhost:4830/api/event/12"
        );
    }

    #[test]
    fn maps_route_query_to_params() {
        let query = Query::from([
            ("type".to_string(), "php".to_string()),
            ("page".to_string(), "3".to_string()),
            ("utm".to_string(), "x".to_string()),
        ]);
        let params = params_from_query(&query);
        assert_eq!(params.event_type.as_deref(), Some("php"));
        assert_eq!(params.page.as_deref(), Some("3"));
        assert_eq!(params.order, None);
    }

    #[test]
    fn extracts_envelope_message() {
        assert_eq!(
            error_message(r#"{"code":"invalid_input","message":"invalid order: x"}"#),
            "invalid order: x"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }
}
