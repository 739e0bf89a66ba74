pub mod config;
pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use dl_core::{Dblog, DblogError};
use dl_db::schema;
use dl_db::store::DbStore;
use tokio::net::TcpListener;

pub use config::ServeConfig;

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
}

impl AppState {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

pub fn build_dblog(state: &AppState) -> Result<Dblog<DbStore>, DblogError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| DblogError::Internal {
        message: err.to_string(),
    })?;
    Ok(Dblog::new(DbStore::new(conn)))
}

/// Runs `f` against a freshly opened store on the blocking pool.
pub async fn with_dblog<T, F>(state: &AppState, f: F) -> Result<T, DblogError>
where
    T: Send + 'static,
    F: FnOnce(&Dblog<DbStore>) -> Result<T, DblogError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || {
        let dblog = build_dblog(&state)?;
        f(&dblog)
    })
    .await
    .map_err(|err| DblogError::Internal {
        message: err.to_string(),
    })?
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, state).await
}

pub async fn serve_listener(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, db_path = %state.db_path, "dblog api listening");
    axum::serve(listener, app(state)).await
}
