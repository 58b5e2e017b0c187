//! Minimal entity manager behind the ORM-style stores.
//!
//! # Responsibility
//! - Derive insert/update/select/delete SQL from [`Entity`] metadata.
//! - Offer `save` with insert-or-update semantics keyed on the entity id.
//!
//! # Invariants
//! - `save` of an entity without id always inserts.
//! - `save` of an entity whose id exists updates every mapped column.
//! - `save` of an entity whose id is unknown inserts a new row under a
//!   fresh id (merge semantics). Callers that mean "update" must load the
//!   managed record first; see `OrmStore::update`.
//! - Table and column names come only from `Entity` constants, never from
//!   caller input.

use crate::model::EntityKind;
use crate::repo::{StoreError, StoreResult};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

/// Mapping between a Rust record and one table with an `id` primary key.
pub trait Entity: Clone {
    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Non-id columns, in the order of [`Entity::column_values`].
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<i64>;
    /// Detaches the record from any row so `save` inserts it.
    fn clear_id(&mut self);
    /// Values bound to [`Entity::COLUMNS`], same order.
    fn column_values(&self) -> Vec<Value>;
    /// Builds the entity from a row selected as `id, COLUMNS...`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    /// Copies every mutable field of `incoming` onto `self`, keeping `self`'s id.
    fn apply_changes(&mut self, incoming: &Self);
}

/// Session-scoped entity manager over one borrowed connection.
///
/// When the connection is a transaction, every write joins it.
pub struct EntityManager<'conn> {
    conn: &'conn Connection,
}

impl<'conn> EntityManager<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts or updates `entity` and returns the row as stored.
    pub fn save<E: Entity>(&self, entity: &E) -> StoreResult<E> {
        let id = match entity.id() {
            Some(id) if self.contains::<E>(id)? => {
                self.update_row(id, entity)?;
                id
            }
            Some(unknown_id) => {
                warn!("{}", merge_insert_event(E::TABLE, unknown_id));
                self.insert_row(entity)?
            }
            None => self.insert_row(entity)?,
        };

        self.find::<E>(id)?.ok_or_else(|| {
            StoreError::InvalidData(format!("`{}` row {id} missing after save", E::TABLE))
        })
    }

    pub fn find<E: Entity>(&self, id: i64) -> StoreResult<Option<E>> {
        let sql = format!("{} WHERE id = ?1;", select_sql::<E>());
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let entity = stmt.query_row([id], |row| E::from_row(row)).optional()?;
        Ok(entity)
    }

    /// Every row of the table, ascending id.
    pub fn find_all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        let sql = format!("{} ORDER BY id ASC;", select_sql::<E>());
        self.collect::<E>(&sql, None)
    }

    /// Rows whose integer `column` equals `value`, ascending id.
    pub fn find_where<E: Entity>(&self, column: &'static str, value: i64) -> StoreResult<Vec<E>> {
        let sql = format!("{} WHERE {column} = ?1 ORDER BY id ASC;", select_sql::<E>());
        self.collect::<E>(&sql, Some(value))
    }

    pub fn contains<E: Entity>(&self, id: i64) -> StoreResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);", E::TABLE);
        let exists: i64 = self.conn.prepare_cached(&sql)?.query_row([id], |row| row.get(0))?;
        Ok(exists == 1)
    }

    /// Deletes one managed row; an unknown id is reported as `NotFound`.
    pub fn remove<E: Entity>(&self, id: i64) -> StoreResult<()> {
        if !self.contains::<E>(id)? {
            return Err(StoreError::NotFound { kind: E::KIND, id });
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1;", E::TABLE);
        self.conn.prepare_cached(&sql)?.execute([id])?;
        debug!("event=orm_remove module=store status=ok table={} id={id}", E::TABLE);
        Ok(())
    }

    /// Deletes every row whose integer `column` equals `value`.
    pub fn remove_where<E: Entity>(&self, column: &'static str, value: i64) -> StoreResult<usize> {
        let sql = format!("DELETE FROM {} WHERE {column} = ?1;", E::TABLE);
        let removed = self.conn.prepare_cached(&sql)?.execute([value])?;
        debug!(
            "event=orm_remove module=store status=ok table={} {column}={value} count={removed}",
            E::TABLE
        );
        Ok(removed)
    }

    fn insert_row<E: Entity>(&self, entity: &E) -> StoreResult<i64> {
        let placeholders = (1..=E::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING id;",
            E::TABLE,
            E::COLUMNS.join(", ")
        );

        let id: i64 = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params_from_iter(entity.column_values()), |row| row.get(0))?;
        debug!("event=orm_insert module=store status=ok table={} id={id}", E::TABLE);
        Ok(id)
    }

    fn update_row<E: Entity>(&self, id: i64, entity: &E) -> StoreResult<()> {
        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            E::TABLE,
            E::COLUMNS.len() + 1
        );

        let mut values = entity.column_values();
        values.push(Value::Integer(id));
        self.conn.prepare_cached(&sql)?.execute(params_from_iter(values))?;
        debug!("event=orm_update module=store status=ok table={} id={id}", E::TABLE);
        Ok(())
    }

    fn collect<E: Entity>(&self, sql: &str, bind: Option<i64>) -> StoreResult<Vec<E>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = match bind {
            Some(value) => stmt.query([value])?,
            None => stmt.query([])?,
        };

        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }
        Ok(entities)
    }
}

/// Logged when `save` turns a detached entity into a new row.
fn merge_insert_event(table: &str, unknown_id: i64) -> String {
    format!(
        "event=orm_save module=store status=ok action=merge_insert error_code=unknown_id table={table} unknown_id={unknown_id}"
    )
}

fn select_sql<E: Entity>() -> String {
    format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

#[cfg(test)]
mod tests {
    use super::{merge_insert_event, EntityManager};
    use crate::db::open_db_in_memory;
    use crate::model::person::Person;
    use crate::model::EntityKind;
    use crate::repo::StoreError;

    #[test]
    fn save_without_id_inserts_and_assigns_id() {
        let conn = open_db_in_memory().unwrap();
        let em = EntityManager::new(&conn);

        let saved = em.save(&Person::new("Ann", "reader", 30)).unwrap();
        assert!(saved.id.is_some());
        assert_eq!(em.find::<Person>(saved.id.unwrap()).unwrap(), Some(saved));
    }

    #[test]
    fn save_with_known_id_updates_in_place() {
        let conn = open_db_in_memory().unwrap();
        let em = EntityManager::new(&conn);

        let mut saved = em.save(&Person::new("Ann", "reader", 30)).unwrap();
        saved.age = 31;
        let updated = em.save(&saved).unwrap();

        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.age, 31);
        assert_eq!(em.find_all::<Person>().unwrap().len(), 1);
    }

    #[test]
    fn save_with_unknown_id_inserts_under_fresh_id() {
        let conn = open_db_in_memory().unwrap();
        let em = EntityManager::new(&conn);

        let detached = Person::new("Ghost", "none", 1).with_id(4242);
        let saved = em.save(&detached).unwrap();

        assert_ne!(saved.id, Some(4242));
        assert!(merge_insert_event("person", 4242)
            .contains("action=merge_insert error_code=unknown_id table=person unknown_id=4242"));
        assert!(!em.contains::<Person>(4242).unwrap());
        assert_eq!(em.find_all::<Person>().unwrap().len(), 1);
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let conn = open_db_in_memory().unwrap();
        let em = EntityManager::new(&conn);

        let err = em.remove::<Person>(77).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Person, id: 77 }
        ));
    }
}
