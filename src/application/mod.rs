//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the [`LinkCache`] and provide a
//! clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::RedirectService`] - Short code resolution and visit counting
//! - [`services::LinkService`] - Link creation, listing, lookup and deletion

pub mod link_cache;
pub mod services;

pub use link_cache::{CacheSettings, LinkCache};
