//! GateKeeper API: CLI Server
//!
//! Headless checkpoint logging backend suitable for deployment as a
//! systemd service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/gatekeeper/config.toml)
//! gatekeeper-service
//!
//! # Custom config path
//! gatekeeper-service --config /etc/gatekeeper/config.toml
//!
//! # Override the listen port and load demo data
//! gatekeeper-service --port 9090 --seed
//!
//! # Validate config without starting
//! gatekeeper-service --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use gatekeeper::config::AppConfig;
use gatekeeper::server::{init_tracing, ServerHandle, ServerOptions};

/// GateKeeper: RBAC and offline sync backend for checkpoint logging.
#[derive(Parser, Debug)]
#[command(
    name = "gatekeeper-service",
    version,
    about = "Checkpoint logging backend with role-based access and offline sync",
    long_about = "GateKeeper API: REST server for checkpoint entry logging, \
                  supervisor review and offline client synchronisation.\n\n\
                  Default config: ~/.config/gatekeeper/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "GATEKEEPER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the listen address.
    #[arg(long)]
    host: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,

    /// Load demo checkpoints and users.
    #[arg(long)]
    seed: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(gatekeeper::default_config_path);

    let (mut config, load_error) = match AppConfig::load_with_env(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    cli.apply_overrides(&mut config);

    // Init tracing first so subsequent logs are formatted properly
    init_tracing(&config);

    if let Some(e) = load_error {
        error!("Failed to load config from {}: {}", config_path.display(), e);
        if cli.check {
            return ExitCode::FAILURE;
        }
        error!("Using default configuration.");
    } else {
        info!("Configuration loaded from {}", config_path.display());
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Environment : {}", config.server.environment);
        println!("   Store       : {:?} ({})", config.database.backend, config.database.url);
        println!("   Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
        seed_demo: cli.seed,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    ExitCode::SUCCESS
}
