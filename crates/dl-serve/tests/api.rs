use axum::body::Body;
use axum::http::{Request, StatusCode};
use dl_core::events::EventRepository;
use dl_core::store::Store;
use dl_core::types::{
    ClientSettings, EventDetail, EventPage, NewEvent, Severity, UserAccount, UserId,
};
use dl_db::schema::open_and_migrate;
use dl_db::store::DbStore;
use dl_db::user_repo::UserRepo;
use dl_serve::{AppState, app};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

struct Fixture {
    _dir: TempDir,
    state: AppState,
}

fn event(event_type: &str, severity: Severity, uid: i64, timestamp: i64) -> NewEvent {
    NewEvent {
        event_type: event_type.to_string(),
        user_id: Some(UserId::new(uid)),
        timestamp,
        message: format!("{event_type} at @when"),
        variables: None,
        severity,
        link: None,
        location: "http://localhost/".to_string(),
        referrer: Some("http://localhost/admin".to_string()),
        hostname: "10.0.0.1".to_string(),
    }
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("watchdog.db");
    let db_path = db_path.to_str().unwrap().to_string();
    let store = DbStore::new(open_and_migrate(&db_path).unwrap());
    UserRepo::new(store.connection())
        .upsert(&UserAccount {
            id: UserId::new(1),
            name: "admin".to_string(),
        })
        .unwrap();
    let rows = [
        ("error", Severity::Error, 1, 1_700_000_000),
        ("notice", Severity::Notice, 0, 1_700_000_060),
        ("error", Severity::Error, 0, 1_700_000_120),
        ("notice", Severity::Notice, 1, 1_700_000_180),
        ("error", Severity::Critical, 1, 1_700_000_240),
    ];
    for (event_type, severity, uid, timestamp) in rows {
        store
            .events()
            .append(event(event_type, severity, uid, timestamp))
            .unwrap();
    }
    Fixture {
        _dir: dir,
        state: AppState::new(db_path),
    }
}

async fn get(fixture: &Fixture, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app(fixture.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let correlation = response
        .headers()
        .get("x-correlation-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec(), correlation)
}

#[tokio::test]
async fn lists_filtered_events_in_ascending_date_order() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/events?type=error&order=date&sort=asc").await;
    assert_eq!(status, StatusCode::OK);

    let page: EventPage = serde_json::from_slice(&body).unwrap();
    assert_eq!(page.total, 3);
    let ids: Vec<i64> = page.data.iter().map(|row| row.id.get()).collect();
    assert_eq!(ids, vec![1, 3, 5]);
    assert_eq!(page.data[0].severity_class, "dblog-error");
    assert_eq!(page.data[2].severity_class, "dblog-critical");
    assert_eq!(page.type_options, vec!["error", "notice"]);
}

#[tokio::test]
async fn wire_format_uses_camel_case_fields() {
    let fixture = fixture();
    let (_, body, _) = get(&fixture, "/api/events").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["typeOptions"].is_array());
    assert_eq!(json["total"], 5);
    let first = &json["data"][0];
    assert_eq!(first["id"], 5);
    assert_eq!(first["type"], "error");
    assert_eq!(first["severityClass"], "dblog-critical");
    assert_eq!(first["user"]["name"], "admin");
    assert_eq!(first["user"]["url"], "/user/1");
    assert!(first["link"].is_null());
}

#[tokio::test]
async fn severity_filter_keeps_type_options_complete() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/events?severity=5").await;
    assert_eq!(status, StatusCode::OK);
    let page: EventPage = serde_json::from_slice(&body).unwrap();
    assert_eq!(page.total, 2);
    assert!(page.data.iter().all(|row| row.severity_class == "dblog-notice"));
    assert_eq!(page.type_options, vec!["error", "notice"]);
}

#[tokio::test]
async fn rejects_invalid_order_and_sort() {
    let fixture = fixture();
    for uri in [
        "/api/events?order=hostname&sort=asc",
        "/api/events?order=type&sort=sideways",
        "/api/events?order=type",
        "/api/events?severity=11",
    ] {
        let (status, body, correlation) = get(&fixture, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "invalid_input");
        assert!(json.get("data").is_none());
        assert_eq!(json["correlation_id"].as_str(), correlation.as_deref());
    }
}

#[tokio::test]
async fn malformed_query_string_uses_error_envelope() {
    let fixture = fixture();
    let (status, body, correlation) = get(&fixture, "/api/events?type=error&type=notice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "invalid_input");
    assert!(json["message"].as_str().is_some_and(|text| !text.is_empty()));
    assert!(correlation.is_some());
    assert_eq!(json["correlation_id"].as_str(), correlation.as_deref());
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/events?type=missing").await;
    assert_eq!(status, StatusCode::OK);
    let page: EventPage = serde_json::from_slice(&body).unwrap();
    assert_eq!(page.total, 0);
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn returns_event_details() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/event/4").await;
    assert_eq!(status, StatusCode::OK);
    let detail: EventDetail = serde_json::from_slice(&body).unwrap();
    assert_eq!(detail.event_type, "notice");
    assert_eq!(detail.message, "notice at @when");
    assert_eq!(detail.severity, Severity::Notice);
    assert_eq!(detail.user.name, "admin");
    assert_eq!(detail.hostname, "10.0.0.1");
    assert_eq!(detail.referrer.as_deref(), Some("http://localhost/admin"));
    assert_eq!(detail.date, "11/14/2023 - 22:16");
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/event/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn malformed_event_id_is_bad_request() {
    let fixture = fixture();
    let (status, _, _) = get(&fixture, "/api/event/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn echoes_supplied_correlation_id() {
    let fixture = fixture();
    let request = Request::builder()
        .uri("/api/event/999")
        .header("x-correlation-id", "corr_test")
        .body(Body::empty())
        .unwrap();
    let response = app(fixture.state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-correlation-id"], "corr_test");
}

#[tokio::test]
async fn serves_client_settings() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/settings").await;
    assert_eq!(status, StatusCode::OK);
    let settings: ClientSettings = serde_json::from_slice(&body).unwrap();
    assert_eq!(settings, ClientSettings::standard());
}

#[tokio::test]
async fn serves_openapi_document() {
    let fixture = fixture();
    let (status, body, _) = get(&fixture, "/api/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["paths"]["/api/events"].is_object());
}
