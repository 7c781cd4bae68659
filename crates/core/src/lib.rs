//! `lightsec-core` — foundation of the security core.
//!
//! Identifiers, the error taxonomy and the collaborator contracts (row source,
//! query catalog). No IO happens here.

pub mod catalog;
pub mod error;
pub mod id;
pub mod row;

pub use catalog::{QueryCatalog, QueryKey};
pub use error::{CollaboratorError, ErrorCode, SecurityError, SecurityResult, TreeBuildError};
pub use id::{NodeId, SubjectId};
pub use row::{Row, RowMapper, RowSource, Value, query_map};
