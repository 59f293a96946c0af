//! Database queries

pub mod person;
