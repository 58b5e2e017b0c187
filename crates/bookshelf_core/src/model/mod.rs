//! Persisted record shapes for people and their books.
//!
//! # Responsibility
//! - Define the row-level entities stored in `person` and `book`.
//! - Name entity kinds for error reporting.
//!
//! # Invariants
//! - `id` is `None` until a store assigns it on insert.
//! - Two records with the same `id` are the same logical entity.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod book;
pub mod person;

/// Entity kind carried by not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Person,
    Book,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Book => "Book",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
