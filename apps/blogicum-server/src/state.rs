//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{
    CategoryRepository, Clock, CommentRepository, LocationRepository, PasswordService,
    PostRepository, SystemClock, TokenService, UserRepository,
};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository, connect,
};

use crate::config::{AppConfig, PaginationConfig};

/// Authentication and time services shared by every backend.
#[derive(Clone)]
pub struct Services {
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub clock: Arc<dyn Clock>,
    pub pagination: PaginationConfig,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub clock: Arc<dyn Clock>,
    pub pagination: PaginationConfig,
    /// Name of the storage backend, reported by the health check.
    pub backend: &'static str,
}

impl AppState {
    /// State backed by the in-memory store.
    pub fn in_memory(store: &InMemoryStore, services: Services) -> Self {
        Self {
            users: Arc::new(store.users()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            categories: Arc::new(store.categories()),
            locations: Arc::new(store.locations()),
            tokens: services.tokens,
            passwords: services.passwords,
            clock: services.clock,
            pagination: services.pagination,
            backend: "memory",
        }
    }

    /// Build the state described by `config`.
    ///
    /// Falls back to the in-memory store when `DATABASE_URL` is unset or the
    /// database cannot be reached.
    pub async fn from_config(config: &AppConfig) -> Self {
        let services = Services {
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            clock: Arc::new(SystemClock),
            pagination: config.pagination,
        };

        if let Some(state) = Self::postgres(config, &services).await {
            tracing::info!("Application state initialized (postgres)");
            return state;
        }

        tracing::info!("Application state initialized (memory)");
        Self::in_memory(&InMemoryStore::new(), services)
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &AppConfig, services: &Services) -> Option<Self> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return None;
        };

        let db = match connect(db_config).await {
            Ok(db) => Arc::new(db),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return None;
            }
        };

        let services = services.clone();
        Some(Self {
            users: Arc::new(PostgresUserRepository::new(Arc::clone(&db))),
            posts: Arc::new(PostgresPostRepository::new(Arc::clone(&db))),
            comments: Arc::new(PostgresCommentRepository::new(Arc::clone(&db))),
            categories: Arc::new(PostgresCategoryRepository::new(Arc::clone(&db))),
            locations: Arc::new(PostgresLocationRepository::new(db)),
            tokens: services.tokens,
            passwords: services.passwords,
            clock: services.clock,
            pagination: services.pagination,
            backend: "postgres",
        })
    }

    #[cfg(not(feature = "postgres"))]
    async fn postgres(_config: &AppConfig, _services: &Services) -> Option<Self> {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        None
    }
}
