//! Book entity.
//!
//! # Invariants
//! - `user_id` must name an existing person when the book is inserted.
//!   The facade guarantees this by ordering; SQLite enforces it again via
//!   the `book.user_id` foreign key.

use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};

/// Store-assigned book identifier.
pub type BookId = i64;

/// Row shape of the `book` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// `None` until inserted.
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub page_count: i32,
    /// Owning person.
    pub user_id: PersonId,
}

impl Book {
    /// Creates a not-yet-persisted book owned by `user_id`.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        page_count: i32,
        user_id: PersonId,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            page_count,
            user_id,
        }
    }

    /// Returns a copy carrying `id`.
    pub fn with_id(mut self, id: BookId) -> Self {
        self.id = Some(id);
        self
    }
}
