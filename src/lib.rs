pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod uploads;

pub use db::DbPool;

use auth::AuthService;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, auth: AuthService) -> Self {
        Self { config, db, auth }
    }
}
