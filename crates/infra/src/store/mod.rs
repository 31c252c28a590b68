//! Keyed record storage abstractions.

pub mod keyed;

pub use keyed::{InMemoryStore, KeyedStore};
