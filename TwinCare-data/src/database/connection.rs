//! Database connection module for the TwinCare service
//!
//! SQLite is the only backend. The pool is created once at startup and shared
//! through a process-wide cell; repositories can also be handed a pool directly.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Shared SQLite connection pool
#[derive(Clone)]
pub struct DatabasePool {
    inner: Arc<r2d2::Pool<SqliteConnectionManager>>,
    in_memory: bool,
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state();
        f.debug_struct("DatabasePool")
            .field("in_memory", &self.in_memory)
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl DatabasePool {
    /// Check out a connection from the pool
    pub fn get(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.inner.get()
    }

    /// Whether this pool is backed by a private in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some("./data/twin_care.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = db_type_str.parse::<DatabaseType>()?;

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) => {
                info!("Using SQLite database at: {}", path);
                Some(path)
            }
            Err(_) => {
                info!("No DB_SQLITE_PATH provided, will use default path: {:?}", defaults.sqlite_path);
                defaults.sqlite_path
            }
        };

        let max_connections = parse_env_var("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let timeout_seconds = parse_env_var("DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;

        info!("Database configuration: max_connections={}, timeout={}s",
            max_connections, timeout_seconds);

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Parse an optional numeric environment variable, rejecting garbage values
fn parse_env_var<T: FromStr>(name: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            DatabaseError::ConfigError(format!("{} must be a number, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

/// Initialize the global database connection pool from the environment
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;

    info!("Initializing database pool with type: {:?}", config.db_type);

    let pool = match config.db_type {
        DatabaseType::Sqlite => create_sqlite_pool(&config)?,
    };

    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Create a file-backed SQLite pool and run migrations.
/// Falls back to an in-memory database when the file cannot be opened.
pub fn create_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use std::fs;
    use std::path::Path;

    let sqlite_path = config.sqlite_path.clone()
        .unwrap_or_else(|| "data/twin_care.db".to_string());

    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Failed to create directory: {}, falling back to in-memory database", e);
                return create_in_memory_pool();
            }
        }
    }

    let manager = SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create SQLite connection pool: {}", e);
            warn!("Falling back to in-memory SQLite database");
            return create_in_memory_pool();
        }
    };

    let pool = DatabasePool {
        inner: Arc::new(pool),
        in_memory: false,
    };
    migrate(&pool)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Create a pool over a private in-memory SQLite database.
///
/// Every SQLite `:memory:` connection is its own database, so the pool holds
/// exactly one connection and never retires it.
pub fn create_in_memory_pool() -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .max_lifetime(None)
        .idle_timeout(None)
        .build(manager)?;

    let pool = DatabasePool {
        inner: Arc::new(pool),
        in_memory: true,
    };
    migrate(&pool)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(pool)
}

/// Run database migrations against a pool
fn migrate(pool: &DatabasePool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Describe a pool for health reporting
pub fn get_connection_info(pool: &DatabasePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;

    let location = if pool.is_in_memory() {
        "SQLite in-memory database".to_string()
    } else {
        match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
            Ok(path) if path.is_empty() || path == ":memory:" => "SQLite in-memory database".to_string(),
            Ok(path) => format!("SQLite database at {}", path),
            Err(_) => "SQLite database (path unknown)".to_string(),
        }
    };

    let state = pool.inner.state();
    Ok(format!("{} (connections: active={}, idle={})",
        location,
        state.connections,
        state.idle_connections
    ))
}
