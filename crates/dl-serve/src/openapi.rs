use utoipa::OpenApi;

use crate::routes::error::ErrorEnvelope;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use dl_core::types::{
    ClientSettings, EventDetail, EventId, EventListParams, EventOrder, EventPage, EventSummary,
    SortDirection, UserId, UserRef,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::events::list_events,
        crate::routes::events::get_event,
        crate::routes::settings::get_settings
    ),
    components(schemas(
        EventPage,
        EventSummary,
        EventDetail,
        EventListParams,
        EventOrder,
        SortDirection,
        EventId,
        UserId,
        UserRef,
        ClientSettings,
        ErrorEnvelope
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Database Log API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="docs"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      SwaggerUIBundle({ url: 'openapi.json', dom_id: '#docs', deepLinking: true });
    </script>
  </body>
</html>
"#;
    axum::response::Html(html)
}
