//! Person use-case service.

use crate::dto::PersonDto;
use crate::mapper::{person_dto_to_entity, person_entity_to_dto};
use crate::model::person::PersonId;
use crate::model::EntityKind;
use crate::repo::PersonStore;
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Person CRUD over any [`PersonStore`] variant.
pub struct PersonService<S: PersonStore> {
    store: S,
}

impl<S: PersonStore> PersonService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new person and returns it with the assigned id.
    pub fn create(&self, dto: &PersonDto) -> ServiceResult<PersonDto> {
        let created = self.store.create(&person_dto_to_entity(dto))?;
        info!(
            "event=person_create module=service status=ok id={}",
            created.id.unwrap_or_default()
        );
        Ok(person_entity_to_dto(created))
    }

    /// Overwrites full name, title and age of the person addressed by `dto.id`.
    ///
    /// # Errors
    /// - `NotFound` when `dto.id` is unset (reported as id `0`) or unknown.
    pub fn update(&self, dto: &PersonDto) -> ServiceResult<PersonDto> {
        let id = dto
            .id
            .ok_or(ServiceError::not_found(EntityKind::Person, 0))?;
        if self.store.find_by_id(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Person, id));
        }

        let updated = self.store.update(&person_dto_to_entity(dto))?;
        info!("event=person_update module=service status=ok id={id}");
        Ok(person_entity_to_dto(updated))
    }

    pub fn get_by_id(&self, id: PersonId) -> ServiceResult<PersonDto> {
        self.store
            .find_by_id(id)?
            .map(person_entity_to_dto)
            .ok_or(ServiceError::not_found(EntityKind::Person, id))
    }

    /// Deletes one person; unknown ids behave as the store variant decides.
    pub fn delete_by_id(&self, id: PersonId) -> ServiceResult<()> {
        self.store.delete_by_id(id)?;
        info!("event=person_delete module=service status=ok id={id}");
        Ok(())
    }

    /// All people, ascending id.
    pub fn get_all(&self) -> ServiceResult<Vec<PersonDto>> {
        let people = self.store.find_all()?;
        Ok(people.into_iter().map(person_entity_to_dto).collect())
    }
}
