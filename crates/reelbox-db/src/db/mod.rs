//! Database repositories for data access layer
//!
//! `store` defines the contract, `video` holds the Postgres repositories and
//! `composer` is the only place clause text is built from column names.

pub mod composer;
pub mod store;
pub mod transaction;
pub mod video;
