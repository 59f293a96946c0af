//! Business logic services

pub mod registry;
pub mod roster;
