//! Persistence for Certward: record models and the key-value storage
//! abstraction they are kept in.

pub mod models;
pub mod storage;
