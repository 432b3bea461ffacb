use std::sync::Arc;

use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;

use crate::{
    auth::jwt::JwtService,
    booking::ChannelPolicy,
    config::AppConfig,
    db::SqlitePool,
    error::{AppError, AppResult},
    notify::Notifier,
};

type SqlitePooledConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub notifier: Arc<dyn Notifier>,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        config: AppConfig,
        notifier: Arc<dyn Notifier>,
        jwt: JwtService,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            notifier,
            jwt,
        }
    }

    pub fn db(&self) -> AppResult<SqlitePooledConnection> {
        self.pool
            .get()
            .map_err(|err| AppError::internal(format!("database pool error: {err}")))
    }

    pub fn walk_in_policy(&self) -> ChannelPolicy {
        ChannelPolicy {
            capacity: self.config.walk_in_capacity,
        }
    }

    pub fn authenticated_policy(&self) -> ChannelPolicy {
        ChannelPolicy {
            capacity: self.config.authenticated_capacity,
        }
    }
}
