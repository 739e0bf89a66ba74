use dl_core::Dblog;
use dl_core::error::{DblogError, StoreError};
use dl_core::events::EventRepository;
use dl_core::store::Store;
use dl_core::types::{
    EventFilter, EventId, EventListParams, EventOrder, EventQuery, NewEvent, Severity,
    SortDirection, UserAccount, UserId,
};
use dl_core::users::UserDirectory;
use dl_db::schema::with_test_db;
use dl_db::store::DbStore;
use dl_db::user_repo::UserRepo;

fn event(event_type: &str, severity: Severity, uid: i64, timestamp: i64) -> NewEvent {
    NewEvent {
        event_type: event_type.to_string(),
        user_id: Some(UserId::new(uid)),
        timestamp,
        message: format!("{event_type} happened"),
        variables: None,
        severity,
        link: None,
        location: "http://localhost/".to_string(),
        referrer: None,
        hostname: "127.0.0.1".to_string(),
    }
}

fn seeded_store() -> DbStore {
    let store = DbStore::new(with_test_db().unwrap());
    let rows = [
        ("php", Severity::Error, 2, 100),
        ("cron", Severity::Notice, 0, 110),
        ("php", Severity::Warning, 1, 120),
        ("access denied", Severity::Warning, 2, 130),
        ("cron", Severity::Info, 1, 140),
        ("php", Severity::Error, 0, 150),
    ];
    for (event_type, severity, uid, timestamp) in rows {
        store
            .events()
            .append(event(event_type, severity, uid, timestamp))
            .unwrap();
    }
    store
}

fn query(order: EventOrder, sort: SortDirection) -> EventQuery {
    EventQuery {
        order,
        sort,
        ..EventQuery::default()
    }
}

#[test]
fn default_order_is_newest_first() {
    let store = seeded_store();
    let rows = store.events().list(&EventQuery::default()).unwrap();
    let ids: Vec<i64> = rows.iter().map(|row| row.id.get()).collect();
    assert_eq!(ids, vec![6, 5, 4, 3, 2, 1]);
}

#[test]
fn every_order_is_monotonic_with_insertion_tiebreak() {
    let store = seeded_store();
    for order in EventOrder::ALL {
        for sort in [SortDirection::Asc, SortDirection::Desc] {
            let rows = store.events().list(&query(order, sort)).unwrap();
            assert_eq!(rows.len(), 6);
            for pair in rows.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let cmp = match order {
                    EventOrder::Type => a.event_type.cmp(&b.event_type),
                    EventOrder::Date => a.id.cmp(&b.id),
                    EventOrder::User => a.user_id.cmp(&b.user_id),
                };
                let cmp = match sort {
                    SortDirection::Asc => cmp,
                    SortDirection::Desc => cmp.reverse(),
                };
                assert!(cmp.is_le(), "{order} {sort} out of order");
                if cmp.is_eq() {
                    assert!(a.id < b.id, "ties must keep insertion order");
                }
            }
        }
    }
}

#[test]
fn filters_restrict_rows_and_count() {
    let store = seeded_store();
    let filter = EventFilter {
        types: vec!["php".to_string(), "cron".to_string()],
        severities: vec![Severity::Error, Severity::Info],
    };
    let rows = store
        .events()
        .list(&EventQuery {
            filter: filter.clone(),
            ..EventQuery::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows
        .iter()
        .all(|row| matches!(row.event_type.as_str(), "php" | "cron")));
    assert_eq!(store.events().count(&filter).unwrap(), 3);
    assert_eq!(store.events().count(&EventFilter::default()).unwrap(), 6);
}

#[test]
fn pages_are_bounded_to_fifty_rows() {
    let store = DbStore::new(with_test_db().unwrap());
    for i in 0..120 {
        store
            .events()
            .append(event("bulk", Severity::Debug, 0, 1_000 + i))
            .unwrap();
    }
    let first = store.events().list(&EventQuery::default()).unwrap();
    assert_eq!(first.len(), 50);
    assert_eq!(first[0].id, EventId::new(120));

    let last = store
        .events()
        .list(&EventQuery {
            page: 2,
            ..EventQuery::default()
        })
        .unwrap();
    assert_eq!(last.len(), 20);
    assert_eq!(last[19].id, EventId::new(1));
    assert_eq!(store.events().count(&EventFilter::default()).unwrap(), 120);
}

#[test]
fn type_options_ignore_filters() {
    let store = seeded_store();
    assert_eq!(
        store.events().types().unwrap(),
        vec!["access denied", "cron", "php"]
    );
}

#[test]
fn ascending_date_scenario() {
    let store = DbStore::new(with_test_db().unwrap());
    for (event_type, timestamp) in [
        ("error", 1_700_000_000),
        ("notice", 1_700_000_060),
        ("error", 1_700_000_120),
        ("notice", 1_700_000_180),
        ("error", 1_700_000_240),
    ] {
        store
            .events()
            .append(event(event_type, Severity::Error, 0, timestamp))
            .unwrap();
    }
    let dblog = Dblog::new(store);
    let page = dblog
        .events()
        .list(&EventListParams {
            event_type: Some("error".to_string()),
            order: Some("date".to_string()),
            sort: Some("asc".to_string()),
            ..EventListParams::default()
        })
        .unwrap();
    assert_eq!(page.total, 3);
    let dates: Vec<&str> = page.data.iter().map(|row| row.date.as_str()).collect();
    assert_eq!(
        dates,
        vec![
            "11/14/2023 - 22:13",
            "11/14/2023 - 22:15",
            "11/14/2023 - 22:17"
        ]
    );
    let ids: Vec<i64> = page.data.iter().map(|row| row.id.get()).collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[test]
fn get_round_trips_stored_columns() {
    let store = DbStore::new(with_test_db().unwrap());
    let mut new_event = event("php", Severity::Critical, 3, 1_700_000_000);
    new_event.referrer = Some("http://localhost/admin".to_string());
    new_event.link = Some("<a href=\"/node/1\">view</a>".to_string());
    let mut vars = serde_json::Map::new();
    vars.insert("@file".to_string(), serde_json::json!("index.php"));
    new_event.variables = Some(vars);
    let stored = store.events().append(new_event).unwrap();

    let row = store.events().get(stored.id).unwrap().unwrap();
    assert_eq!(row, stored);
    assert_eq!(row.variables.as_deref(), Some(r#"{"@file":"index.php"}"#));
    assert!(store.events().get(EventId::new(999)).unwrap().is_none());
}

#[test]
fn out_of_range_severity_is_reported_as_corrupt() {
    let store = DbStore::new(with_test_db().unwrap());
    store
        .connection()
        .execute(
            "INSERT INTO watchdog (type, message, severity) VALUES ('php', 'broken', 12)",
            [],
        )
        .unwrap();
    let err = store.events().get(EventId::new(1)).unwrap_err();
    assert!(matches!(err, StoreError::CorruptRow { .. }));
}

#[test]
fn resolves_users_in_batch() {
    let store = DbStore::new(with_test_db().unwrap());
    let users = UserRepo::new(store.connection());
    users
        .upsert(&UserAccount {
            id: UserId::new(1),
            name: "admin".to_string(),
        })
        .unwrap();
    users
        .upsert(&UserAccount {
            id: UserId::new(2),
            name: "editor".to_string(),
        })
        .unwrap();

    let found = store
        .users()
        .resolve(&[UserId::new(1), UserId::new(2), UserId::new(7)])
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[&UserId::new(2)].name, "editor");
}

#[test]
fn list_renders_user_names() {
    let store = seeded_store();
    UserRepo::new(store.connection())
        .upsert(&UserAccount {
            id: UserId::new(2),
            name: "editor".to_string(),
        })
        .unwrap();
    let dblog = Dblog::new(store);
    let page = dblog.events().list(&EventListParams::default()).unwrap();
    let newest = &page.data[0];
    assert_eq!(newest.user.name, "Anonymous");
    let access = page
        .data
        .iter()
        .find(|row| row.event_type == "access denied")
        .unwrap();
    assert_eq!(access.user.name, "editor");
    assert_eq!(access.user.url.as_deref(), Some("/user/2"));
}

#[test]
fn not_found_surfaces_from_facade() {
    let dblog = Dblog::new(DbStore::new(with_test_db().unwrap()));
    assert!(matches!(
        dblog.events().get(EventId::new(999)),
        Err(DblogError::Event(dl_core::error::EventError::NotFound))
    ));
}
