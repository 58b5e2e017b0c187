//! Field-level conversions between wire shapes, DTOs and entities.
//!
//! Every function is total and copies fields 1:1. The only field that is
//! not copied is one the source does not have: request shapes carry no
//! `id` (mapped to `None`) and book requests carry no owner (mapped to `0`
//! until the facade stamps it).

use crate::dto::{BookDto, BookRequest, PersonBooksResponse, PersonDto, PersonRequest};
use crate::model::book::{Book, BookId};
use crate::model::person::{Person, PersonId};

pub fn person_request_to_dto(request: &PersonRequest) -> PersonDto {
    PersonDto {
        id: None,
        full_name: request.full_name.clone(),
        title: request.title.clone(),
        age: request.age,
    }
}

pub fn book_request_to_dto(request: &BookRequest) -> BookDto {
    BookDto {
        id: None,
        title: request.title.clone(),
        author: request.author.clone(),
        page_count: request.page_count,
        user_id: 0,
    }
}

pub fn person_dto_to_entity(dto: &PersonDto) -> Person {
    Person {
        id: dto.id,
        full_name: dto.full_name.clone(),
        title: dto.title.clone(),
        age: dto.age,
    }
}

pub fn person_entity_to_dto(person: Person) -> PersonDto {
    PersonDto {
        id: person.id,
        full_name: person.full_name,
        title: person.title,
        age: person.age,
    }
}

pub fn book_dto_to_entity(dto: &BookDto) -> Book {
    Book {
        id: dto.id,
        title: dto.title.clone(),
        author: dto.author.clone(),
        page_count: dto.page_count,
        user_id: dto.user_id,
    }
}

pub fn book_entity_to_dto(book: Book) -> BookDto {
    BookDto {
        id: book.id,
        title: book.title,
        author: book.author,
        page_count: book.page_count,
        user_id: book.user_id,
    }
}

/// Builds the outbound aggregate shape.
pub fn to_response(person_id: PersonId, book_ids: Vec<BookId>) -> PersonBooksResponse {
    PersonBooksResponse {
        person_id,
        book_ids,
    }
}
