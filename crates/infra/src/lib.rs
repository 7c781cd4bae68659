//! Infrastructure layer: collaborator adapters, configuration, wiring.

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod row_source;

pub use bootstrap::{SecurityCore, build_context};
pub use catalog::StaticQueryCatalog;
pub use config::{ConfigError, SecurityConfig};
pub use row_source::InMemoryRowSource;
