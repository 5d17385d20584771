//! Core domain entities.
//!
//! - [`Link`] - A shortened URL with its click counters
//! - [`NewLink`] - Input for creating a link
//! - [`LinkQuery`], [`LinkFilter`] - Listing filters, sort and pagination
//! - [`LinkPage`] - One page of a listing with its total count

pub mod link;
pub mod query;

pub use link::{Link, NewLink};
pub use query::{ClicksBound, LinkFilter, LinkPage, LinkQuery, SortField, SortOrder};
