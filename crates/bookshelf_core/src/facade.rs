//! Aggregate facade: a person together with the books they own.
//!
//! # Responsibility
//! - Run each aggregate operation as one all-or-nothing transaction.
//! - Sequence person and book steps so a book never references a person
//!   that was not created or verified earlier in the same call.
//!
//! # Invariants
//! - Every store used by a call is built over that call's transaction.
//! - Writes take the write lock when the call begins; reads start deferred
//!   and never take it.
//! - Any error rolls the whole call back and is returned unchanged.
//! - Book creation follows input order; `None` requests are skipped.
//! - Books are deleted before their owner, never after.
//! - Update adds the requested books; it does not replace existing ones.

use crate::config::StoreSelection;
use crate::dto::{BookRequest, PersonBooksRequest, PersonBooksResponse};
use crate::mapper::{book_request_to_dto, person_request_to_dto, to_response};
use crate::model::book::BookId;
use crate::model::person::PersonId;
use crate::repo::{book_store, person_store, BookStore, PersonStore, StoreError};
use crate::service::{BookService, PersonService, ServiceError, ServiceResult};
use log::{error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

/// Entry point for aggregate create/update/read/delete.
///
/// Holds its connection exclusively for as long as it lives, so two calls
/// can never share one transaction.
pub struct PersonBooksFacade<'conn> {
    conn: &'conn mut Connection,
    stores: StoreSelection,
}

/// Services bound to one open transaction.
struct UnitOfWork<'tx> {
    people: PersonService<Box<dyn PersonStore + 'tx>>,
    books: BookService<Box<dyn BookStore + 'tx>>,
}

impl<'tx> UnitOfWork<'tx> {
    fn begin(conn: &'tx Connection, stores: StoreSelection) -> ServiceResult<Self> {
        Ok(Self {
            people: PersonService::new(person_store(stores.person, conn)?),
            books: BookService::new(book_store(stores.book, conn)?),
        })
    }

    fn create_books(
        &self,
        owner_id: PersonId,
        requests: &[Option<BookRequest>],
    ) -> ServiceResult<Vec<BookId>> {
        let mut book_ids = Vec::with_capacity(requests.len());
        for request in requests.iter().flatten() {
            let mut dto = book_request_to_dto(request);
            dto.user_id = owner_id;
            let created = self.books.create(&dto)?;
            let id = created.id.ok_or_else(|| {
                ServiceError::Persistence(StoreError::MissingGeneratedKey("book"))
            })?;
            book_ids.push(id);
        }
        Ok(book_ids)
    }
}

impl<'conn> PersonBooksFacade<'conn> {
    pub fn new(conn: &'conn mut Connection, stores: StoreSelection) -> Self {
        Self { conn, stores }
    }

    pub fn stores(&self) -> StoreSelection {
        self.stores
    }

    /// Creates a person, then one book per non-null request, owned by them.
    ///
    /// Returns the new person id and the book ids in input order.
    pub fn create_with_books(
        &mut self,
        request: &PersonBooksRequest,
    ) -> ServiceResult<PersonBooksResponse> {
        self.in_transaction("create_with_books", TransactionBehavior::Immediate, |uow| {
            let person = uow.people.create(&person_request_to_dto(&request.person))?;
            let person_id = person.id.ok_or_else(|| {
                ServiceError::Persistence(StoreError::MissingGeneratedKey("person"))
            })?;

            let book_ids = uow.create_books(person_id, &request.books)?;
            Ok(to_response(person_id, book_ids))
        })
    }

    /// Overwrites person `id` with the request fields, then adds the
    /// requested books to them.
    ///
    /// # Errors
    /// - `NotFound(Person, id)` before any book is written.
    pub fn update_with_books(
        &mut self,
        request: &PersonBooksRequest,
        id: PersonId,
    ) -> ServiceResult<PersonBooksResponse> {
        self.in_transaction("update_with_books", TransactionBehavior::Immediate, |uow| {
            let mut dto = person_request_to_dto(&request.person);
            dto.id = Some(id);
            let person = uow.people.update(&dto)?;
            let person_id = person.id.unwrap_or(id);

            let book_ids = uow.create_books(person_id, &request.books)?;
            Ok(to_response(person_id, book_ids))
        })
    }

    /// Returns person `id` with the ids of every book they own, ascending.
    pub fn read_with_books(&mut self, id: PersonId) -> ServiceResult<PersonBooksResponse> {
        self.in_transaction("read_with_books", TransactionBehavior::Deferred, |uow| {
            let person = uow.people.get_by_id(id)?;
            let book_ids = uow.books.get_ids_by_owner(id)?;
            Ok(to_response(person.id.unwrap_or(id), book_ids))
        })
    }

    /// Deletes every book owned by person `id`, then the person.
    ///
    /// # Errors
    /// - `NotFound(Person, id)` before anything is deleted.
    pub fn delete_with_books(&mut self, id: PersonId) -> ServiceResult<()> {
        self.in_transaction("delete_with_books", TransactionBehavior::Immediate, |uow| {
            let person = uow.people.get_by_id(id)?;
            uow.books.delete_all_by_owner(id)?;
            uow.people.delete_by_id(person.id.unwrap_or(id))
        })
    }

    fn in_transaction<T>(
        &mut self,
        operation: &'static str,
        behavior: TransactionBehavior,
        work: impl FnOnce(&UnitOfWork<'_>) -> ServiceResult<T>,
    ) -> ServiceResult<T> {
        let started_at = Instant::now();
        let stores = self.stores;
        info!(
            "event={operation} module=facade status=start person_store={} book_store={}",
            stores.person, stores.book
        );

        let tx = self
            .conn
            .transaction_with_behavior(behavior)?;
        let outcome = UnitOfWork::begin(&tx, stores).and_then(|uow| work(&uow));

        match outcome {
            Ok(value) => {
                tx.commit()?;
                info!(
                    "event={operation} module=facade status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event={operation} module=facade status=error error_code=rollback_failed error={rollback_err}"
                    );
                }
                let duration_ms = started_at.elapsed().as_millis();
                match err.as_not_found() {
                    Some((kind, id)) => warn!(
                        "event={operation} module=facade status=error duration_ms={duration_ms} error_code=not_found kind={kind} id={id}"
                    ),
                    None => error!(
                        "event={operation} module=facade status=error duration_ms={duration_ms} error_code=persistence_failure error={err}"
                    ),
                }
                Err(err)
            }
        }
    }
}
