//! Book use-case service.

use crate::dto::BookDto;
use crate::mapper::{book_dto_to_entity, book_entity_to_dto};
use crate::model::book::BookId;
use crate::model::person::PersonId;
use crate::model::EntityKind;
use crate::repo::BookStore;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Book CRUD and owner queries over any [`BookStore`] variant.
pub struct BookService<S: BookStore> {
    store: S,
}

impl<S: BookStore> BookService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new book and returns it with the assigned id.
    ///
    /// The owner is not checked here; a dangling `user_id` surfaces as a
    /// persistence failure from the foreign key.
    pub fn create(&self, dto: &BookDto) -> ServiceResult<BookDto> {
        let created = self.store.create(&book_dto_to_entity(dto))?;
        info!(
            "event=book_create module=service status=ok id={} user_id={}",
            created.id.unwrap_or_default(),
            created.user_id
        );
        Ok(book_entity_to_dto(created))
    }

    /// Overwrites title, author, page count and owner of the book addressed
    /// by `dto.id`.
    ///
    /// # Errors
    /// - `NotFound` when `dto.id` is unset (reported as id `0`) or unknown.
    pub fn update(&self, dto: &BookDto) -> ServiceResult<BookDto> {
        let id = dto.id.ok_or(ServiceError::not_found(EntityKind::Book, 0))?;
        if self.store.find_by_id(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Book, id));
        }

        let updated = self.store.update(&book_dto_to_entity(dto))?;
        info!("event=book_update module=service status=ok id={id}");
        Ok(book_entity_to_dto(updated))
    }

    pub fn get_by_id(&self, id: BookId) -> ServiceResult<BookDto> {
        self.store
            .find_by_id(id)?
            .map(book_entity_to_dto)
            .ok_or(ServiceError::not_found(EntityKind::Book, id))
    }

    /// Deletes one book; unknown ids behave as the store variant decides.
    pub fn delete_by_id(&self, id: BookId) -> ServiceResult<()> {
        self.store.delete_by_id(id)?;
        info!("event=book_delete module=service status=ok id={id}");
        Ok(())
    }

    /// All books, ascending id.
    pub fn get_all(&self) -> ServiceResult<Vec<BookDto>> {
        let books = self.store.find_all()?;
        Ok(books.into_iter().map(book_entity_to_dto).collect())
    }

    /// Ids of the books owned by `owner_id`, ascending; empty when none.
    pub fn get_ids_by_owner(&self, owner_id: PersonId) -> ServiceResult<Vec<BookId>> {
        Ok(self.store.find_ids_by_owner(owner_id)?)
    }

    /// Deletes every book owned by `owner_id`. Idempotent.
    pub fn delete_all_by_owner(&self, owner_id: PersonId) -> ServiceResult<()> {
        self.store.delete_by_owner(owner_id)?;
        info!("event=book_delete_by_owner module=service status=ok user_id={owner_id}");
        Ok(())
    }
}
