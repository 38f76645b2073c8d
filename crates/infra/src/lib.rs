//! Infrastructure layer: persistence adapters.

pub mod in_memory;

pub use in_memory::InMemoryStore;
