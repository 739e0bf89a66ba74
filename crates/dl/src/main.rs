mod output;

use clap::{Parser, Subcommand};
use dl_client::list::ListState;
use dl_client::{DetailView, EventStore, HttpEventStore, ListView, LoadState, Router};
use dl_core::Dblog;
use dl_core::types::{EventId, EventOrder, NewEvent, Severity, SortDirection, UserAccount, UserId};
use dl_db::schema;
use dl_db::store::DbStore;
use dl_db::user_repo::UserRepo;
use dl_serve::{AppState, ServeConfig};
use std::net::IpAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_API_URL: &str = "http://127.0.0.1:4830/api";

#[derive(Parser)]
#[command(name = "dl", about = "Browse and record database log events")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the JSON API.
    Serve {
        #[arg(long)]
        db: Option<String>,
        #[arg(long)]
        host: Option<IpAddr>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the OpenAPI document.
    Openapi,
    /// Append an event to the log.
    Log {
        #[arg(long = "type")]
        event_type: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=7))]
        severity: u8,
        /// Placeholder value, e.g. `--var @name=cron`.
        #[arg(long = "var", value_parser = parse_variable)]
        variables: Vec<(String, String)>,
        #[arg(long, default_value_t = 0)]
        uid: i64,
        #[arg(long)]
        link: Option<String>,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long)]
        referrer: Option<String>,
        #[arg(long, default_value = "127.0.0.1")]
        hostname: String,
        #[arg(long, env = "DBLOG_DB_PATH")]
        db: Option<String>,
    },
    /// Register a display name for a user id.
    User {
        uid: i64,
        name: String,
        #[arg(long, env = "DBLOG_DB_PATH")]
        db: Option<String>,
    },
    /// List events through the API.
    Events {
        #[arg(long, env = "DBLOG_URL", default_value = DEFAULT_API_URL)]
        url: String,
        /// Comma-separated event types.
        #[arg(long = "type")]
        types: Option<String>,
        /// Comma-separated severity levels.
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        json: bool,
    },
    /// Show one event through the API.
    Event {
        id: i64,
        #[arg(long, env = "DBLOG_URL", default_value = DEFAULT_API_URL)]
        url: String,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dl=info,dl_serve=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Serve { db, host, port } => {
            let mut config = ServeConfig::from_env();
            if let Some(db) = db {
                config.db_path = db;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            ensure_parent_dir(&config.db_path)?;
            schema::open_and_migrate(&config.db_path).map_err(|err| err.to_string())?;
            tracing::info!(db_path = %config.db_path, "database ready");
            dl_serve::serve(AppState::new(config.db_path.clone()), config.addr())
                .await
                .map_err(|err| format!("serve error: {err}"))
        }
        Command::Openapi => {
            println!("{}", dl_serve::openapi::generate_spec());
            Ok(())
        }
        Command::Log {
            event_type,
            message,
            severity,
            variables,
            uid,
            link,
            location,
            referrer,
            hostname,
            db,
        } => {
            let severity =
                Severity::from_level(i64::from(severity)).map_err(|err| err.to_string())?;
            let variables = (!variables.is_empty()).then(|| {
                variables
                    .into_iter()
                    .map(|(key, value)| (key, serde_json::Value::String(value)))
                    .collect()
            });
            let event = NewEvent {
                event_type,
                user_id: Some(UserId::new(uid)),
                timestamp: chrono::Utc::now().timestamp(),
                message,
                variables,
                severity,
                link,
                location,
                referrer,
                hostname,
            };
            let dblog = Dblog::new(open_store(db)?);
            let id = dblog.events().append(event).map_err(|err| err.to_string())?;
            println!("{id}");
            Ok(())
        }
        Command::User { uid, name, db } => {
            let store = open_store(db)?;
            UserRepo::new(store.connection())
                .upsert(&UserAccount {
                    id: UserId::new(uid),
                    name,
                })
                .map_err(|err| err.to_string())
        }
        Command::Events {
            url,
            types,
            severity,
            order,
            sort,
            page,
            json,
        } => {
            let store: Arc<dyn EventStore> = Arc::new(HttpEventStore::new(&url));
            let settings = store.settings().await.map_err(|err| err.to_string())?;
            let mut location = ListState {
                page,
                ..ListState::default()
            }
            .to_location();
            location.set("type", types);
            location.set("severity", severity);
            location.set("order", order);
            location.set("sort", sort);

            let mut view = ListView::new(store, Router::new(location), settings);
            view.refresh().await;
            if let LoadState::Failed { message, .. } = view.state() {
                return Err(message.clone());
            }
            if json {
                let rows = serde_json::to_string_pretty(view.events())
                    .map_err(|err| err.to_string())?;
                println!("{rows}");
            } else {
                print_list(&view);
            }
            Ok(())
        }
        Command::Event { id, url, json } => {
            let store: Arc<dyn EventStore> = Arc::new(HttpEventStore::new(&url));
            let settings = store.settings().await.map_err(|err| err.to_string())?;
            let mut view = DetailView::new(store, settings);
            view.load(EventId::new(id)).await;
            let Some(event) = view.event() else {
                return Err(match view.state() {
                    LoadState::Failed { message, .. } => message.clone(),
                    _ => format!("event {id} not loaded"),
                });
            };
            if json {
                let text = serde_json::to_string_pretty(event).map_err(|err| err.to_string())?;
                println!("{text}");
                return Ok(());
            }
            let label = view.severity_label().unwrap_or_default();
            output::print_field("Type", &event.event_type);
            output::print_field("Date", &event.date);
            output::print_field("User", &event.user.name);
            output::print_field("Location", &event.location);
            output::print_field("Referrer", event.referrer.as_deref().unwrap_or(""));
            output::print_field("Message", &output::plain_text(&event.message));
            output::print_field(
                "Severity",
                &output::paint_severity(event.severity.css_class(), label),
            );
            output::print_field("Hostname", &event.hostname);
            if let Some(link) = &event.link {
                output::print_field("Operations", &output::plain_text(link));
            }
            Ok(())
        }
    }
}

fn print_list(view: &ListView) {
    let columns = [
        ("", 2),
        ("ID", 6),
        (order_heading(view, EventOrder::Type, "Type", false), 16),
        (order_heading(view, EventOrder::Date, "Date", true), 18),
        ("Message", 56),
        (order_heading(view, EventOrder::User, "User", false), 14),
    ];
    output::print_table_header(&columns);
    for row in view.events() {
        let marker = output::paint_severity(&row.severity_class, "●");
        println!(
            "{marker}   {}  {}  {}  {}  {}",
            output::fit(&row.id.to_string(), 6),
            output::fit(&row.event_type, 16),
            output::fit(&row.date, 18),
            output::fit(&output::plain_text(&row.message), 56),
            output::fit(&row.user.name, 14),
        );
    }
    let pages = view.total_pages();
    println!(
        "{}",
        output::dim(&format!(
            "{} events, page {} of {}",
            view.total(),
            u64::from(view.current_page()) + 1,
            pages.max(1)
        ))
    );
}

fn order_heading(
    view: &ListView,
    order: EventOrder,
    title: &'static str,
    is_default: bool,
) -> &'static str {
    let indicator = view.sort_indicator(order, is_default);
    if !indicator.active {
        return title;
    }
    // The indicator points at the next direction; the current one is its opposite.
    match (title, indicator.next) {
        ("Type", SortDirection::Asc) => "Type ▼",
        ("Type", SortDirection::Desc) => "Type ▲",
        ("Date", SortDirection::Asc) => "Date ▼",
        ("Date", SortDirection::Desc) => "Date ▲",
        ("User", SortDirection::Asc) => "User ▼",
        ("User", SortDirection::Desc) => "User ▲",
        _ => title,
    }
}

fn parse_variable(value: &str) -> Result<(String, String), String> {
    let (key, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{value}`"))?;
    if !key.starts_with(['@', '%', ':']) {
        return Err(format!("placeholder `{key}` must start with @, % or :"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn open_store(db: Option<String>) -> Result<DbStore, String> {
    let db_path = db.unwrap_or_else(|| ServeConfig::default().db_path);
    ensure_parent_dir(&db_path)?;
    let conn = schema::open_and_migrate(&db_path).map_err(|err| err.to_string())?;
    Ok(DbStore::new(conn))
}

fn ensure_parent_dir(db_path: &str) -> Result<(), String> {
    match Path::new(db_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|err| err.to_string())
        }
        _ => Ok(()),
    }
}
