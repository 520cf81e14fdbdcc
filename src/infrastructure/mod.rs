//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod rate_limit;
pub mod storage;

pub use crypto::{JwtConfig, PasswordHasher, TokenKind, TokenService};
pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
pub use rate_limit::RateLimiter;
pub use storage::InMemoryStore;
