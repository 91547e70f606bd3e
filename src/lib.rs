pub mod admin;
pub mod appresult;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod courses;
pub mod error;
pub mod index;
pub mod leaderboards;
pub mod password;
pub mod profiles;
pub mod res;
pub mod session;
pub mod store;

use std::{ops::Deref, sync::Arc};

use axum::{extract::FromRef, response::{IntoResponse, Response}, routing::get, Router};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use catalog::Catalog;
pub use config::Config;
pub use store::Academy;

pub type SharedAcademy = Arc<RwLock<Academy>>;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub academy: SharedAcademy,
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
    pub hasher: password::Hasher,
}

impl AppState {
    pub fn new(catalog: Catalog, config: Config) -> anyhow::Result<AppState> {
        let hasher = password::Hasher::with_cost(config.password_memory_kib, config.password_iterations)?;
        let catalog = Arc::new(catalog);
        Ok(AppState {
            academy: Arc::new(RwLock::new(Academy::new(catalog.clone(), hasher.clone()))),
            catalog,
            config: Arc::new(config),
            hasher,
        })
    }
}

/// The whole site, sessions included.
pub fn app(app_state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(app_state.config.session_idle_minutes)));

    Router::new()
        .route("/", get(index::index))
        .route("/gallery", get(index::gallery))

        .merge(auth::router())
        .nest("/c", courses::router())
        .nest("/p", profiles::router())
        .route("/leaderboards", get(leaderboards::leaderboards))
        .route("/admin", get(admin::admin))

        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

/// A Markdown document rendered into the site layout.
pub struct Markdown<T>(pub &'static str, pub T);

impl<T> IntoResponse for Markdown<T>
where
    T: Deref<Target = str>
{
    fn into_response(self) -> Response {
        res::page(self.0, &res::markdown_to_html(&self.1)).into_response()
    }
}
