//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Static
//! statements use `query_as` with `FromRow`; listing queries are assembled
//! with [`sqlx::QueryBuilder`] so optional filters stay fully parameterized.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, click counting and listing

pub mod pg_link_repository;

pub use pg_link_repository::PgLinkRepository;
