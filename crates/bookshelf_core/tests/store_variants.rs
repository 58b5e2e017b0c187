use bookshelf_core::db::{open_db_in_memory, DbError};
use bookshelf_core::repo::{book_store, person_store};
use bookshelf_core::{Book, BookStore, EntityKind, Person, PersonStore, StoreError, StoreKind};
use rusqlite::Connection;

#[test]
fn create_assigns_fresh_ids_and_leaves_input_untouched() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let people = person_store(kind, &conn).unwrap();

        let input = Person::new("Ann", "reader", 30);
        let first = people.create(&input).unwrap();
        let second = people.create(&input).unwrap();

        assert!(input.id.is_none(), "{kind}");
        assert!(first.id.is_some(), "{kind}");
        assert_ne!(first.id, second.id, "{kind}");
        assert_eq!(
            people.find_by_id(first.id.unwrap()).unwrap(),
            Some(first),
            "{kind}"
        );
    }
}

#[test]
fn create_ignores_caller_supplied_id() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let people = person_store(kind, &conn).unwrap();

        let existing = people.create(&Person::new("Ann", "reader", 30)).unwrap();
        let colliding = Person::new("Bob", "writer", 40).with_id(existing.id.unwrap());
        let created = people.create(&colliding).unwrap();

        assert_ne!(created.id, existing.id, "{kind}");
        assert_eq!(
            people.find_by_id(existing.id.unwrap()).unwrap().unwrap().full_name,
            "Ann",
            "{kind}"
        );
        assert_eq!(people.find_all().unwrap().len(), 2, "{kind}");
    }
}

#[test]
fn update_overwrites_every_book_field() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let people = person_store(kind, &conn).unwrap();
        let books = book_store(kind, &conn).unwrap();

        let ann = people.create(&Person::new("Ann", "reader", 30)).unwrap();
        let bob = people.create(&Person::new("Bob", "writer", 40)).unwrap();
        let stored = books
            .create(&Book::new("A", "First", 100, ann.id.unwrap()))
            .unwrap();

        let changed = Book::new("B", "Second", 200, bob.id.unwrap()).with_id(stored.id.unwrap());
        let updated = books.update(&changed).unwrap();

        assert_eq!(updated, changed, "{kind}");
        assert_eq!(
            books.find_by_id(stored.id.unwrap()).unwrap(),
            Some(changed),
            "{kind}"
        );
        assert_eq!(books.find_all().unwrap().len(), 1, "{kind}");
    }
}

#[test]
fn update_of_unknown_id_is_not_found_and_inserts_nothing() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let people = person_store(kind, &conn).unwrap();

        let ghost = Person::new("Ghost", "none", 1).with_id(4242);
        let err = people.update(&ghost).unwrap_err();

        assert!(
            matches!(err, StoreError::NotFound { kind: EntityKind::Person, id: 4242 }),
            "{kind}: {err}"
        );
        assert!(people.find_all().unwrap().is_empty(), "{kind}");
    }
}

#[test]
fn update_without_id_is_rejected() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let books = book_store(kind, &conn).unwrap();

        let err = books.update(&Book::new("A", "B", 1, 1)).unwrap_err();
        assert!(
            matches!(err, StoreError::MissingId(EntityKind::Book)),
            "{kind}: {err}"
        );
    }
}

#[test]
fn find_by_unknown_id_is_none() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        assert!(person_store(kind, &conn).unwrap().find_by_id(9).unwrap().is_none());
        assert!(book_store(kind, &conn).unwrap().find_by_id(9).unwrap().is_none());
    }
}

#[test]
fn delete_of_unknown_id_differs_by_variant() {
    let conn = open_db_in_memory().unwrap();

    let err = person_store(StoreKind::Orm, &conn)
        .unwrap()
        .delete_by_id(55)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound { kind: EntityKind::Person, id: 55 }
    ));

    person_store(StoreKind::Statement, &conn)
        .unwrap()
        .delete_by_id(55)
        .unwrap();
    book_store(StoreKind::Statement, &conn)
        .unwrap()
        .delete_by_id(55)
        .unwrap();
}

#[test]
fn owner_queries_are_scoped_ascending_and_idempotent() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let people = person_store(kind, &conn).unwrap();
        let books = book_store(kind, &conn).unwrap();

        let ann = people.create(&Person::new("Ann", "reader", 30)).unwrap().id.unwrap();
        let bob = people.create(&Person::new("Bob", "writer", 40)).unwrap().id.unwrap();
        let first = books.create(&Book::new("T1", "X", 10, ann)).unwrap().id.unwrap();
        let other = books.create(&Book::new("T2", "Y", 20, bob)).unwrap().id.unwrap();
        let second = books.create(&Book::new("T3", "Z", 30, ann)).unwrap().id.unwrap();

        assert_eq!(books.find_ids_by_owner(ann).unwrap(), vec![first, second], "{kind}");
        assert!(books.find_ids_by_owner(999).unwrap().is_empty(), "{kind}");

        books.delete_by_owner(ann).unwrap();
        books.delete_by_owner(ann).unwrap();

        assert!(books.find_ids_by_owner(ann).unwrap().is_empty(), "{kind}");
        assert_eq!(books.find_ids_by_owner(bob).unwrap(), vec![other], "{kind}");
    }
}

#[test]
fn book_with_dangling_owner_is_a_db_error() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let books = book_store(kind, &conn).unwrap();

        let err = books.create(&Book::new("T", "A", 10, 404)).unwrap_err();
        assert!(matches!(err, StoreError::Db(DbError::Sqlite(_))), "{kind}: {err}");
        assert!(books.find_all().unwrap().is_empty(), "{kind}");
    }
}

#[test]
fn negative_age_and_page_count_are_stored_as_given() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        let people = person_store(kind, &conn).unwrap();
        let books = book_store(kind, &conn).unwrap();

        let owner = people.create(&Person::new("Ann", "reader", -1)).unwrap();
        let book = books
            .create(&Book::new("T", "A", -1, owner.id.unwrap()))
            .unwrap();

        assert_eq!(people.find_by_id(owner.id.unwrap()).unwrap().unwrap().age, -1, "{kind}");
        assert_eq!(
            books.find_by_id(book.id.unwrap()).unwrap().unwrap().page_count,
            -1,
            "{kind}"
        );
    }
}

#[test]
fn aborted_insert_surfaces_as_db_error() {
    for kind in StoreKind::ALL {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TEMP TRIGGER reject_book BEFORE INSERT ON book
             WHEN NEW.title = 'Rejected'
             BEGIN SELECT RAISE(ABORT, 'book rejected'); END;",
        )
        .unwrap();
        let owner = person_store(kind, &conn)
            .unwrap()
            .create(&Person::new("Ann", "reader", 30))
            .unwrap()
            .id
            .unwrap();
        let books = book_store(kind, &conn).unwrap();

        let err = books.create(&Book::new("Rejected", "A", 10, owner)).unwrap_err();
        assert!(matches!(err, StoreError::Db(DbError::Sqlite(_))), "{kind}: {err}");
        assert!(err.to_string().contains("book rejected"), "{kind}: {err}");
        assert!(books.find_all().unwrap().is_empty(), "{kind}");
    }
}

#[test]
fn variants_read_each_others_rows() {
    let conn = open_db_in_memory().unwrap();
    let orm = person_store(StoreKind::Orm, &conn).unwrap();
    let statement = person_store(StoreKind::Statement, &conn).unwrap();

    let via_orm = orm.create(&Person::new("Ann", "reader", 30)).unwrap();
    let via_statement = statement.create(&Person::new("Bob", "writer", 40)).unwrap();

    assert_eq!(statement.find_all().unwrap(), vec![via_orm.clone(), via_statement.clone()]);
    assert_eq!(orm.find_all().unwrap(), vec![via_orm, via_statement]);
}

#[test]
fn stores_reject_unmigrated_connections() {
    let raw = Connection::open_in_memory().unwrap();

    for kind in StoreKind::ALL {
        let err = person_store(kind, &raw).err().expect("person store should fail");
        assert!(
            matches!(err, StoreError::Db(DbError::MissingRequiredTable("person"))),
            "{kind}: {err}"
        );
        let err = book_store(kind, &raw).err().expect("book store should fail");
        assert!(
            matches!(err, StoreError::Db(DbError::MissingRequiredTable("book"))),
            "{kind}: {err}"
        );
    }
}
