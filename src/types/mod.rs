//! Type definitions

pub mod messages;
pub mod person;
pub mod roster;

pub use messages::*;
pub use person::*;
pub use roster::*;
