use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use sahaya_db::Connection;
use sahaya_reconcile::settings::SettingsCache;

mod error;
pub use error::ApiError;

pub mod common_works;
pub mod funerals;
pub mod meetings;
pub mod members;
pub mod settings;

pub struct AppStateInner {
    pub db: Connection,
    pub settings: SettingsCache,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(db: Connection, settings: SettingsCache) -> AppState {
        Arc::new(AppStateInner { db, settings })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/meetings", post(meetings::record))
        .route("/funerals", post(funerals::create))
        .route("/funerals/attendance", post(funerals::attendance))
        .route("/funerals/work", post(funerals::work))
        .route("/funerals/extra-due", post(funerals::extra_due))
        .route("/common-works", post(common_works::record))
        .route("/settings", get(settings::show).put(settings::update))
        .route("/members/{member_id}/fines", get(members::fines))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
