//! CLI smoke probe.
//!
//! Runs one create → read → delete round trip through the facade against
//! the database named by `BOOKSHELF_DB_PATH` (in-memory when unset), using
//! the store variants named by `BOOKSHELF_PERSON_STORE`/`BOOKSHELF_BOOK_STORE`.

use bookshelf_core::{
    core_version, init_logging_from_config, BookRequest, CoreConfig, PersonBooksFacade,
    PersonBooksRequest, PersonRequest,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bookshelf_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging_from_config(&config)?;
    println!(
        "bookshelf_core version={} person_store={} book_store={}",
        core_version(),
        config.stores.person,
        config.stores.book
    );

    let mut conn = config.open_connection()?;
    let mut facade = PersonBooksFacade::new(&mut conn, config.stores);

    let request = PersonBooksRequest {
        person: PersonRequest {
            full_name: "Probe Person".to_string(),
            title: "reader".to_string(),
            age: 30,
        },
        books: vec![
            Some(BookRequest {
                title: "Probe One".to_string(),
                author: "Probe Author".to_string(),
                page_count: 100,
            }),
            None,
            Some(BookRequest {
                title: "Probe Two".to_string(),
                author: "Probe Author".to_string(),
                page_count: 200,
            }),
        ],
    };

    let created = facade.create_with_books(&request)?;
    println!("created person_id={} book_ids={:?}", created.person_id, created.book_ids);

    let read = facade.read_with_books(created.person_id)?;
    println!("read person_id={} book_ids={:?}", read.person_id, read.book_ids);

    facade.delete_with_books(created.person_id)?;
    println!("deleted person_id={}", created.person_id);
    Ok(())
}
