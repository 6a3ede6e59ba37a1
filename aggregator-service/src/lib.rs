//! Book search aggregation over Project Gutenberg and Open Library.
//!
//! [`services::aggregator::Aggregator`] queries every source concurrently,
//! tolerates individual source failures and returns one deduplicated list.

pub mod config;
pub mod models;
pub mod routes;
pub mod services;
pub mod sources;
pub mod utils;
