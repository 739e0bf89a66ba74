use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{ErrorEnvelope, map_error};
use crate::{AppState, with_dblog};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use dl_core::DblogError;
use dl_core::error::EventError;
use dl_core::types::{EventDetail, EventId, EventListParams, EventPage};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/event/{id}", get(get_event))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventListParams),
    responses(
        (status = 200, body = EventPage),
        (status = 400, body = ErrorEnvelope)
    )
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    query: Result<Query<EventListParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return map_error(
                &DblogError::Event(EventError::InvalidInput {
                    message: rejection.body_text(),
                }),
                Some(correlation.0),
            )
            .into_response();
        }
    };
    match with_dblog(&state, move |dblog| dblog.events().list(&params)).await {
        Ok(page) => Json(page).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/event/{id}",
    params(("id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, body = EventDetail),
        (status = 404, body = ErrorEnvelope)
    )
)]
pub(crate) async fn get_event(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match EventId::parse(&id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &DblogError::Event(EventError::InvalidInput {
                    message: err.to_string(),
                }),
                Some(correlation.0),
            )
            .into_response();
        }
    };
    match with_dblog(&state, move |dblog| dblog.events().get(event_id)).await {
        Ok(event) => Json(event).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
