// Core modules implementing the date predicate, the value model, and hydration.
pub mod error;
pub mod hydrate;
pub mod timestamp;
pub mod value;
