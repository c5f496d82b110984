use uuid::Uuid;

pub mod prelude;

// Core entities
pub mod answers;
pub mod questions;
pub mod tags;
pub mod tenants;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
