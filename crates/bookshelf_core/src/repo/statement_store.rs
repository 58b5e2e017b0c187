//! Raw-statement stores: one hand-written parameterized statement per
//! operation.
//!
//! # Responsibility
//! - Keep the SQL for `person` and `book` explicit and reviewable.
//! - Read generated keys from the connection's last-insert channel.
//! - Map rows column-by-column into entities.
//!
//! # Invariants
//! - An insert that yields no generated key is an error, never a default id.
//! - An update that touches zero rows is `NotFound`.
//! - Deletes are "ensure absent": unknown ids are not an error.

use crate::db::ensure_table;
use crate::model::book::{Book, BookId};
use crate::model::person::{Person, PersonId};
use crate::model::EntityKind;
use crate::repo::{BookStore, PersonStore, StoreError, StoreResult};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    full_name,
    title,
    age
FROM person";

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    page_count,
    user_id
FROM book";

/// Statement-backed person store.
pub struct StatementPersonStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> StatementPersonStore<'conn> {
    /// Constructs a store over a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_table(conn, "person")?;
        Ok(Self { conn })
    }
}

impl PersonStore for StatementPersonStore<'_> {
    fn create(&self, person: &Person) -> StoreResult<Person> {
        let inserted = self.conn.execute(
            "INSERT INTO person (full_name, title, age) VALUES (?1, ?2, ?3);",
            params![person.full_name.as_str(), person.title.as_str(), person.age],
        )?;
        let id = generated_key(self.conn, inserted, "person")?;

        Ok(Person {
            id: Some(id),
            ..person.clone()
        })
    }

    fn update(&self, person: &Person) -> StoreResult<Person> {
        let id = person.id.ok_or(StoreError::MissingId(EntityKind::Person))?;
        let changed = self.conn.execute(
            "UPDATE person
             SET
                full_name = ?1,
                title = ?2,
                age = ?3
             WHERE id = ?4;",
            params![person.full_name.as_str(), person.title.as_str(), person.age, id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: EntityKind::Person,
                id,
            });
        }
        debug!("event=sql_update module=store status=ok table=person id={id}");

        Ok(person.clone())
    }

    fn find_by_id(&self, id: PersonId) -> StoreResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let person = stmt.query_row([id], parse_person_row).optional()?;
        Ok(person)
    }

    fn find_all(&self) -> StoreResult<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }
        Ok(people)
    }

    fn delete_by_id(&self, id: PersonId) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM person WHERE id = ?1;", [id])?;
        debug!("event=sql_delete module=store status=ok table=person id={id} count={removed}");
        Ok(())
    }
}

/// Statement-backed book store.
pub struct StatementBookStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> StatementBookStore<'conn> {
    /// Constructs a store over a bootstrapped connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_table(conn, "book")?;
        Ok(Self { conn })
    }
}

impl BookStore for StatementBookStore<'_> {
    fn create(&self, book: &Book) -> StoreResult<Book> {
        let inserted = self.conn.execute(
            "INSERT INTO book (title, author, page_count, user_id) VALUES (?1, ?2, ?3, ?4);",
            params![
                book.title.as_str(),
                book.author.as_str(),
                book.page_count,
                book.user_id,
            ],
        )?;
        let id = generated_key(self.conn, inserted, "book")?;

        Ok(Book {
            id: Some(id),
            ..book.clone()
        })
    }

    fn update(&self, book: &Book) -> StoreResult<Book> {
        let id = book.id.ok_or(StoreError::MissingId(EntityKind::Book))?;
        let changed = self.conn.execute(
            "UPDATE book
             SET
                user_id = ?1,
                title = ?2,
                author = ?3,
                page_count = ?4
             WHERE id = ?5;",
            params![
                book.user_id,
                book.title.as_str(),
                book.author.as_str(),
                book.page_count,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: EntityKind::Book,
                id,
            });
        }
        debug!("event=sql_update module=store status=ok table=book id={id}");

        Ok(book.clone())
    }

    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let book = stmt.query_row([id], parse_book_row).optional()?;
        Ok(book)
    }

    fn find_all(&self) -> StoreResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }

    fn delete_by_id(&self, id: BookId) -> StoreResult<()> {
        let removed = self.conn.execute("DELETE FROM book WHERE id = ?1;", [id])?;
        debug!("event=sql_delete module=store status=ok table=book id={id} count={removed}");
        Ok(())
    }

    fn find_ids_by_owner(&self, owner_id: PersonId) -> StoreResult<Vec<BookId>> {
        let mut stmt = self.conn.prepare(
            "SELECT id
             FROM book
             WHERE user_id = ?1
             ORDER BY id ASC;",
        )?;
        let ids = stmt
            .query_map([owner_id], |row| row.get::<_, BookId>("id"))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn delete_by_owner(&self, owner_id: PersonId) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM book WHERE user_id = ?1;", [owner_id])?;
        debug!(
            "event=sql_delete module=store status=ok table=book user_id={owner_id} count={removed}"
        );
        Ok(())
    }
}

/// Reads the key generated by the insert that just ran on `conn`.
fn generated_key(conn: &Connection, inserted: usize, table: &'static str) -> StoreResult<i64> {
    let id = conn.last_insert_rowid();
    if inserted != 1 || id <= 0 {
        error!(
            "event=sql_insert module=store status=error table={table} inserted={inserted} error_code=missing_generated_key"
        );
        return Err(StoreError::MissingGeneratedKey(table));
    }

    debug!("event=sql_insert module=store status=ok table={table} id={id}");
    Ok(id)
}

fn parse_person_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: Some(row.get("id")?),
        full_name: row.get("full_name")?,
        title: row.get("title")?,
        age: row.get("age")?,
    })
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        author: row.get("author")?,
        page_count: row.get("page_count")?,
        user_id: row.get("user_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::generated_key;
    use crate::db::open_db_in_memory;
    use crate::repo::StoreError;

    #[test]
    fn generated_key_fails_loudly_without_an_insert() {
        let conn = open_db_in_memory().unwrap();
        let err = generated_key(&conn, 0, "person").unwrap_err();
        assert!(matches!(err, StoreError::MissingGeneratedKey("person")));
    }
}
