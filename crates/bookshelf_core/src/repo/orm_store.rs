//! ORM-style stores: entity mappings plus a generic store over
//! [`EntityManager`].
//!
//! # Invariants
//! - `update` loads the managed record first and applies the incoming
//!   fields onto it, so `save` always sees an id it recognizes and can never
//!   degrade into an insert.
//! - `delete_by_id` of an unknown id fails with `NotFound`.

use crate::db::ensure_table;
use crate::model::book::{Book, BookId};
use crate::model::person::{Person, PersonId};
use crate::model::EntityKind;
use crate::repo::entity_manager::{Entity, EntityManager};
use crate::repo::{BookStore, PersonStore, StoreError, StoreResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::marker::PhantomData;

impl Entity for Person {
    const KIND: EntityKind = EntityKind::Person;
    const TABLE: &'static str = "person";
    const COLUMNS: &'static [&'static str] = &["full_name", "title", "age"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn clear_id(&mut self) {
        self.id = None;
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.full_name.clone()),
            Value::Text(self.title.clone()),
            Value::Integer(i64::from(self.age)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            full_name: row.get("full_name")?,
            title: row.get("title")?,
            age: row.get("age")?,
        })
    }

    fn apply_changes(&mut self, incoming: &Self) {
        self.full_name.clone_from(&incoming.full_name);
        self.title.clone_from(&incoming.title);
        self.age = incoming.age;
    }
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;
    const TABLE: &'static str = "book";
    const COLUMNS: &'static [&'static str] = &["title", "author", "page_count", "user_id"];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn clear_id(&mut self) {
        self.id = None;
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.title.clone()),
            Value::Text(self.author.clone()),
            Value::Integer(i64::from(self.page_count)),
            Value::Integer(self.user_id),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            title: row.get("title")?,
            author: row.get("author")?,
            page_count: row.get("page_count")?,
            user_id: row.get("user_id")?,
        })
    }

    fn apply_changes(&mut self, incoming: &Self) {
        self.title.clone_from(&incoming.title);
        self.author.clone_from(&incoming.author);
        self.page_count = incoming.page_count;
        self.user_id = incoming.user_id;
    }
}

/// Generic ORM-style store for one entity type.
pub struct OrmStore<'conn, E: Entity> {
    em: EntityManager<'conn>,
    _entity: PhantomData<E>,
}

pub type OrmPersonStore<'conn> = OrmStore<'conn, Person>;
pub type OrmBookStore<'conn> = OrmStore<'conn, Book>;

impl<'conn, E: Entity> OrmStore<'conn, E> {
    /// Constructs a store over a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_table(conn, E::TABLE)?;
        Ok(Self {
            em: EntityManager::new(conn),
            _entity: PhantomData,
        })
    }

    fn create_entity(&self, entity: &E) -> StoreResult<E> {
        let mut fresh = entity.clone();
        if let Some(id) = fresh.id() {
            // Creation never targets an existing row.
            debug!(
                "event=orm_create module=store status=ok table={} ignored_id={id}",
                E::TABLE
            );
            fresh.clear_id();
        }
        self.em.save(&fresh)
    }

    fn update_entity(&self, entity: &E) -> StoreResult<E> {
        let id = entity.id().ok_or(StoreError::MissingId(E::KIND))?;
        let mut managed = self
            .em
            .find::<E>(id)?
            .ok_or(StoreError::NotFound { kind: E::KIND, id })?;
        managed.apply_changes(entity);
        self.em.save(&managed)
    }
}

impl PersonStore for OrmStore<'_, Person> {
    fn create(&self, person: &Person) -> StoreResult<Person> {
        self.create_entity(person)
    }

    fn update(&self, person: &Person) -> StoreResult<Person> {
        self.update_entity(person)
    }

    fn find_by_id(&self, id: PersonId) -> StoreResult<Option<Person>> {
        self.em.find(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Person>> {
        self.em.find_all()
    }

    fn delete_by_id(&self, id: PersonId) -> StoreResult<()> {
        self.em.remove::<Person>(id)
    }
}

impl BookStore for OrmStore<'_, Book> {
    fn create(&self, book: &Book) -> StoreResult<Book> {
        self.create_entity(book)
    }

    fn update(&self, book: &Book) -> StoreResult<Book> {
        self.update_entity(book)
    }

    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        self.em.find(id)
    }

    fn find_all(&self) -> StoreResult<Vec<Book>> {
        self.em.find_all()
    }

    fn delete_by_id(&self, id: BookId) -> StoreResult<()> {
        self.em.remove::<Book>(id)
    }

    fn find_ids_by_owner(&self, owner_id: PersonId) -> StoreResult<Vec<BookId>> {
        let books = self.em.find_where::<Book>("user_id", owner_id)?;
        Ok(books.into_iter().filter_map(|book| book.id).collect())
    }

    fn delete_by_owner(&self, owner_id: PersonId) -> StoreResult<()> {
        self.em.remove_where::<Book>("user_id", owner_id)?;
        Ok(())
    }
}
