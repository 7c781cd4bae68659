//! Row-source adapters.
//!
//! Production deployments plug a SQL client in behind
//! [`lightsec_core::RowSource`]; the in-memory source here backs tests and
//! local development.

pub mod in_memory;

pub use in_memory::InMemoryRowSource;
