//! Reusable GateKeeper server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! store selection, migrations, bootstrap admin, REST API, rate-limit
//! sweeper, metrics, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::seed::seed_demo_data;
use crate::config::{AppConfig, StoreBackend};
use crate::domain::RepositoryProvider;
use crate::infrastructure::{
    init_database, run_migrations, InMemoryStore, PasswordHasher, RateLimiter,
    SeaOrmRepositoryProvider, TokenService,
};
use crate::interfaces::http::modules::metrics::prometheus_handle;
use crate::interfaces::http::{create_api_router, AppState, RouterOptions};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the GateKeeper API.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin when the user table is empty (default: true).
    pub create_default_admin: bool,
    /// Load demo checkpoints and users (default: false).
    pub seed_demo: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
            seed_demo: false,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running GateKeeper API.
///
/// # Examples
///
/// ```rust,no_run
/// use gatekeeper::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Repository provider for data access.
    pub repos: Arc<dyn RepositoryProvider>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to.
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    sweeper_task: JoinHandle<()>,
}

async fn open_store(
    config: &AppConfig,
    auto_migrate: bool,
) -> Result<(Arc<dyn RepositoryProvider>, Option<DatabaseConnection>), Box<dyn std::error::Error>> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store, data is lost on restart");
            Ok((Arc::new(InMemoryStore::new()), None))
        }
        StoreBackend::Sqlite => {
            let db_config = config.database.connection();
            info!(url = %db_config.url, "Connecting to database");
            let db = init_database(&db_config).await?;
            if auto_migrate {
                run_migrations(&db).await?;
                info!("Database migrations applied");
            }
            Ok((Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db)))
        }
    }
}

impl ServerHandle {
    /// Start the GateKeeper API with the given options.
    ///
    /// This will:
    /// 1. Validate the configuration and install the Prometheus recorder
    /// 2. Open the configured store (running migrations if enabled)
    /// 3. Create the bootstrap admin and optional demo data
    /// 4. Start the rate-limit sweeper
    /// 5. Start the REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        config.validate()?;

        let metrics = prometheus_handle();

        let (repos, db) = open_store(&config, opts.auto_migrate).await?;

        let hasher = PasswordHasher::new(config.security.bcrypt_cost);
        let tokens = Arc::new(TokenService::new(config.security.jwt()));
        let state = AppState::new(repos.clone(), hasher, tokens);

        if opts.create_default_admin {
            match state
                .users
                .ensure_bootstrap_admin(&config.admin.username, &config.admin.password)
                .await
            {
                Ok(true) => {
                    info!(username = %config.admin.username, "Default admin created");
                    warn!("⚠️  Please change the admin password immediately!");
                }
                Ok(false) => {}
                Err(e) => error!(error = %e, "Failed to create admin user"),
            }
        }

        if opts.seed_demo {
            let report = seed_demo_data(repos.as_ref(), &hasher).await?;
            info!(
                checkpoints = report.checkpoints,
                users = report.users,
                "Demo data loaded"
            );
        }

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);

        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ));
        let sweeper_task = limiter.start_sweeper(
            Duration::from_secs(config.rate_limit.clear_interval_secs),
            shutdown.signal(),
        );

        let api_router = create_api_router(
            state,
            RouterOptions {
                allowed_origins: config.cors.allowed_origins.clone(),
                rate_limiter: limiter,
                metrics,
            },
        );

        let api_addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 GateKeeper API started");

        Ok(Self {
            repos,
            config,
            local_addr,
            db,
            shutdown,
            api_task,
            sweeper_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to fully stop after shutdown has been triggered.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            sweeper_task,
            ..
        } = self;

        // Nothing to drain until someone asks for shutdown
        shutdown.signal().wait().await;

        let drained = shutdown
            .drain(async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests abandoned at shutdown deadline");
        }

        if let Err(e) = sweeper_task.await {
            warn!("Rate-limit sweeper task failed: {}", e);
        }

        if let Some(db) = db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("✅ Database connection closed");
            }
        }

        info!("👋 GateKeeper shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down GateKeeper API...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.database.backend = StoreBackend::Memory;
        config.security.bcrypt_cost = 4;
        config
    }

    #[tokio::test]
    async fn starts_and_stops_on_memory_store() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            seed_demo: true,
            ..ServerOptions::default()
        })
        .await
        .unwrap();

        assert!(handle.local_addr.port() > 0);
        assert!(handle.is_running());
        // bootstrap admin plus three demo users
        assert_eq!(handle.repos.users().count().await.unwrap(), 4);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let mut config = memory_config();
        config.rate_limit.requests = 0;
        let result = ServerHandle::start(ServerOptions {
            config,
            ..ServerOptions::default()
        })
        .await;
        assert!(result.is_err());
    }
}
