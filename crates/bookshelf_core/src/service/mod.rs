//! Entity-level services over the store contracts.
//!
//! # Responsibility
//! - Expose DTO-level CRUD for people and books.
//! - Turn "absent record" into [`ServiceError::NotFound`] and pass every
//!   other store failure through as [`ServiceError::Persistence`].
//!
//! # Invariants
//! - Services depend on `PersonStore`/`BookStore` only, never on a variant.
//! - Existence is checked before any id-addressed write.
//! - Cross-entity rules (a book's owner exists) belong to the facade.

use crate::model::EntityKind;
use crate::repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod book_service;
pub mod person_service;

pub use book_service::BookService;
pub use person_service::PersonService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surfaced by services and, unchanged, by the facade.
#[derive(Debug)]
pub enum ServiceError {
    /// The addressed record does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// Any lower-level store failure; aborts the current call.
    Persistence(StoreError),
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Returns `(kind, id)` when this is a not-found error.
    pub fn as_not_found(&self) -> Option<(EntityKind, i64)> {
        match self {
            Self::NotFound { kind, id } => Some((*kind, *id)),
            Self::Persistence(_) => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} with id {id} not found"),
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Persistence(other),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(StoreError::from(value))
    }
}
