//! Store contracts and their two persistence variants.
//!
//! # Responsibility
//! - Define `PersonStore`/`BookStore`, the only persistence surface services
//!   see.
//! - Provide an ORM-style variant (`orm_store`, built on `entity_manager`)
//!   and a raw-statement variant (`statement_store`).
//! - Pick a variant at composition time from [`StoreKind`].
//!
//! # Invariants
//! - `create` returns the stored entity with its assigned id and never
//!   mutates its input.
//! - `update` reports an unknown id as [`StoreError::NotFound`]; it never
//!   turns into an insert.
//! - Stores never swallow SQLite errors.

use crate::config::StoreKind;
use crate::db::DbError;
use crate::model::book::{Book, BookId};
use crate::model::person::{Person, PersonId};
use crate::model::EntityKind;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity_manager;
pub mod orm_store;
pub mod statement_store;

pub use entity_manager::{Entity, EntityManager};
pub use orm_store::{OrmBookStore, OrmPersonStore, OrmStore};
pub use statement_store::{StatementBookStore, StatementPersonStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite or bootstrap failure, including constraint violations.
    Db(DbError),
    /// Addressed record does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// An id-addressed write was issued for an entity without id.
    MissingId(EntityKind),
    /// Insert completed without yielding a generated key for the table.
    MissingGeneratedKey(&'static str),
    /// Persisted state contradicts what was just written.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} with id {id} not found"),
            Self::MissingId(kind) => write!(f, "{kind} update requires an id"),
            Self::MissingGeneratedKey(table) => {
                write!(f, "insert into `{table}` returned no generated key")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::MissingId(_)
            | Self::MissingGeneratedKey(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for people.
pub trait PersonStore {
    /// Inserts `person` and returns it with the assigned id.
    fn create(&self, person: &Person) -> StoreResult<Person>;
    /// Overwrites every mutable column of the row addressed by `person.id`.
    fn update(&self, person: &Person) -> StoreResult<Person>;
    fn find_by_id(&self, id: PersonId) -> StoreResult<Option<Person>>;
    /// All people ordered by ascending id.
    fn find_all(&self) -> StoreResult<Vec<Person>>;
    /// Unknown ids either no-op or fail, depending on the variant.
    fn delete_by_id(&self, id: PersonId) -> StoreResult<()>;
}

/// Persistence contract for books.
pub trait BookStore {
    /// Inserts `book` and returns it with the assigned id.
    fn create(&self, book: &Book) -> StoreResult<Book>;
    /// Overwrites every mutable column of the row addressed by `book.id`.
    fn update(&self, book: &Book) -> StoreResult<Book>;
    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>>;
    /// All books ordered by ascending id.
    fn find_all(&self) -> StoreResult<Vec<Book>>;
    /// Unknown ids either no-op or fail, depending on the variant.
    fn delete_by_id(&self, id: BookId) -> StoreResult<()>;
    /// Ids of books owned by `owner_id`, ascending.
    fn find_ids_by_owner(&self, owner_id: PersonId) -> StoreResult<Vec<BookId>>;
    /// Removes every book owned by `owner_id`; no-op when there are none.
    fn delete_by_owner(&self, owner_id: PersonId) -> StoreResult<()>;
}

impl<S: PersonStore + ?Sized> PersonStore for Box<S> {
    fn create(&self, person: &Person) -> StoreResult<Person> {
        (**self).create(person)
    }

    fn update(&self, person: &Person) -> StoreResult<Person> {
        (**self).update(person)
    }

    fn find_by_id(&self, id: PersonId) -> StoreResult<Option<Person>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Person>> {
        (**self).find_all()
    }

    fn delete_by_id(&self, id: PersonId) -> StoreResult<()> {
        (**self).delete_by_id(id)
    }
}

impl<S: BookStore + ?Sized> BookStore for Box<S> {
    fn create(&self, book: &Book) -> StoreResult<Book> {
        (**self).create(book)
    }

    fn update(&self, book: &Book) -> StoreResult<Book> {
        (**self).update(book)
    }

    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Book>> {
        (**self).find_all()
    }

    fn delete_by_id(&self, id: BookId) -> StoreResult<()> {
        (**self).delete_by_id(id)
    }

    fn find_ids_by_owner(&self, owner_id: PersonId) -> StoreResult<Vec<BookId>> {
        (**self).find_ids_by_owner(owner_id)
    }

    fn delete_by_owner(&self, owner_id: PersonId) -> StoreResult<()> {
        (**self).delete_by_owner(owner_id)
    }
}

/// Builds the person store variant named by `kind` over `conn`.
pub fn person_store<'conn>(
    kind: StoreKind,
    conn: &'conn Connection,
) -> StoreResult<Box<dyn PersonStore + 'conn>> {
    Ok(match kind {
        StoreKind::Orm => Box::new(OrmPersonStore::try_new(conn)?),
        StoreKind::Statement => Box::new(StatementPersonStore::try_new(conn)?),
    })
}

/// Builds the book store variant named by `kind` over `conn`.
pub fn book_store<'conn>(
    kind: StoreKind,
    conn: &'conn Connection,
) -> StoreResult<Box<dyn BookStore + 'conn>> {
    Ok(match kind {
        StoreKind::Orm => Box::new(OrmBookStore::try_new(conn)?),
        StoreKind::Statement => Box::new(StatementBookStore::try_new(conn)?),
    })
}
