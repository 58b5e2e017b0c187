//! Transport-agnostic DTOs and the inbound/outbound aggregate shapes.
//!
//! # Responsibility
//! - `PersonDto`/`BookDto` travel between facade and services.
//! - `PersonBooksRequest`/`PersonBooksResponse` mirror what a transport
//!   layer sends and receives; serde names match the wire (`userRequest`,
//!   `bookRequests`, `userId`, `booksIdList`).
//!
//! # Invariants
//! - Request shapes never carry identities; ids come from the store or from
//!   the caller's path parameter.

use crate::model::book::BookId;
use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};

/// Internal person representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: Option<PersonId>,
    pub full_name: String,
    pub title: String,
    pub age: i32,
}

/// Internal book representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub page_count: i32,
    pub user_id: PersonId,
}

/// Person fields as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    pub full_name: String,
    pub title: String,
    pub age: i32,
}

/// Book fields as sent by a client. The owner is implied by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub page_count: i32,
}

/// Create/update payload: one person plus the books to create for them.
///
/// `None` entries in `books` are tolerated and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBooksRequest {
    #[serde(rename = "userRequest")]
    pub person: PersonRequest,
    #[serde(rename = "bookRequests", default)]
    pub books: Vec<Option<BookRequest>>,
}

/// Aggregate response: the person id and the ids of its books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBooksResponse {
    #[serde(rename = "userId")]
    pub person_id: PersonId,
    /// Creation order for create/update, ascending id order for read.
    #[serde(rename = "booksIdList")]
    pub book_ids: Vec<BookId>,
}

#[cfg(test)]
mod tests {
    use super::{BookRequest, PersonBooksRequest, PersonBooksResponse};

    #[test]
    fn request_accepts_null_book_entries() {
        let json = r#"{
            "userRequest": {"fullName": "Ann", "title": "reader", "age": 30},
            "bookRequests": [
                {"title": "T1", "author": "A1", "pageCount": 100},
                null
            ]
        }"#;

        let request: PersonBooksRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.person.full_name, "Ann");
        assert_eq!(request.books.len(), 2);
        assert_eq!(
            request.books[0],
            Some(BookRequest {
                title: "T1".to_string(),
                author: "A1".to_string(),
                page_count: 100,
            })
        );
        assert!(request.books[1].is_none());
    }

    #[test]
    fn request_without_books_defaults_to_empty() {
        let json = r#"{"userRequest": {"fullName": "Bo", "title": "t", "age": 1}}"#;
        let request: PersonBooksRequest = serde_json::from_str(json).unwrap();
        assert!(request.books.is_empty());
    }

    #[test]
    fn response_uses_wire_field_names() {
        let response = PersonBooksResponse {
            person_id: 7,
            book_ids: vec![1, 2],
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["userId"], 7);
        assert_eq!(value["booksIdList"], serde_json::json!([1, 2]));
    }
}
