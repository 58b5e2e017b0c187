//! Core of the bookshelf service: people, the books they own, and the
//! transactional facade that manages both as one aggregate.
//!
//! Persistence runs on SQLite through one of two interchangeable store
//! variants per entity kind (ORM-style save/merge or raw statements),
//! selected with [`StoreSelection`].

pub mod config;
pub mod db;
pub mod dto;
pub mod facade;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, StoreKind, StoreSelection};
pub use dto::{BookDto, BookRequest, PersonBooksRequest, PersonBooksResponse, PersonDto, PersonRequest};
pub use facade::PersonBooksFacade;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::book::{Book, BookId};
pub use model::person::{Person, PersonId};
pub use model::EntityKind;
pub use repo::{
    BookStore, OrmBookStore, OrmPersonStore, PersonStore, StatementBookStore,
    StatementPersonStore, StoreError, StoreResult,
};
pub use service::{BookService, PersonService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
