//! Person entity.

use serde::{Deserialize, Serialize};

/// Store-assigned person identifier.
pub type PersonId = i64;

/// Row shape of the `person` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// `None` until inserted.
    pub id: Option<PersonId>,
    pub full_name: String,
    pub title: String,
    pub age: i32,
}

impl Person {
    /// Creates a not-yet-persisted person.
    pub fn new(full_name: impl Into<String>, title: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            title: title.into(),
            age,
        }
    }

    /// Returns a copy carrying `id`.
    pub fn with_id(mut self, id: PersonId) -> Self {
        self.id = Some(id);
        self
    }
}
