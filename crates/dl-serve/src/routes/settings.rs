use axum::routing::get;
use axum::{Json, Router};
use dl_core::types::ClientSettings;

pub fn router() -> Router {
    Router::new().route("/settings", get(get_settings))
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, body = ClientSettings))
)]
pub(crate) async fn get_settings() -> Json<ClientSettings> {
    Json(ClientSettings::standard())
}
