//! Runtime configuration for composing the core.
//!
//! # Responsibility
//! - Name the store variants and select one per entity kind.
//! - Read process configuration from `BOOKSHELF_*` environment variables.
//!
//! # Invariants
//! - Unknown store names are rejected, never silently defaulted.
//! - Without a database path the core runs against an in-memory database.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::default_log_level;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "BOOKSHELF_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BOOKSHELF_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BOOKSHELF_LOG_DIR";
pub const ENV_PERSON_STORE: &str = "BOOKSHELF_PERSON_STORE";
pub const ENV_BOOK_STORE: &str = "BOOKSHELF_BOOK_STORE";

/// Persistence strategy for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StoreKind {
    /// Entity-manager backed save/merge semantics.
    #[default]
    Orm,
    /// Hand-written parameterized SQL per operation.
    Statement,
}

impl StoreKind {
    /// Every variant, for callers that exercise both.
    pub const ALL: [StoreKind; 2] = [StoreKind::Orm, StoreKind::Statement];

    /// Parses a case-insensitive store name.
    ///
    /// Accepts `orm|jpa` and `statement|sql|template`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "orm" | "jpa" => Ok(Self::Orm),
            "statement" | "sql" | "template" => Ok(Self::Statement),
            other => Err(ConfigError::UnknownStoreKind(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orm => "orm",
            Self::Statement => "statement",
        }
    }
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store variant chosen independently for people and books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSelection {
    pub person: StoreKind,
    pub book: StoreKind,
}

impl StoreSelection {
    /// Same variant for both entity kinds.
    pub fn uniform(kind: StoreKind) -> Self {
        Self {
            person: kind,
            book: kind,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownStoreKind(String),
    InvalidVariable { name: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStoreKind(value) => write!(
                f,
                "unknown store kind `{value}`; expected orm|jpa|statement|sql|template"
            ),
            Self::InvalidVariable { name, reason } => write!(f, "invalid `{name}`: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Process-level settings for the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file; `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub stores: StoreSelection,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            stores: StoreSelection::default(),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidVariable {
                    name: ENV_LOG_DIR,
                    reason: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
            config.log_dir = Some(dir);
        }
        if let Some(kind) = read(ENV_PERSON_STORE) {
            config.stores.person = StoreKind::parse(&kind)?;
        }
        if let Some(kind) = read(ENV_BOOK_STORE) {
            config.stores.book = StoreKind::parse(&kind)?;
        }

        Ok(config)
    }

    /// Opens the configured database with the schema applied.
    pub fn open_connection(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}
