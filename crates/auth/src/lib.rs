//! `lightsec-auth` — principal resolution and authority trees.
//!
//! This crate is decoupled from storage and transport: data access goes
//! through the `RowSource` and `QueryCatalog` contracts from `lightsec-core`.

pub mod auth_type;
pub mod authority;
pub mod processor;
pub mod selector;
pub mod strategy;
pub mod subject;
pub mod tree;

pub use auth_type::{AuthType, BlankAuthType};
pub use authority::{Authority, AuthorityAppender, AuthoritySet, GrantedRole};
pub use processor::{
    AdditionalAuthorities, FnAuthorities, GroupJdbcProcessor, NoAdditionalAuthorities,
    PrincipalDataProcessor, ProcessorConfig, ProcessorContext, SimpleJdbcProcessor,
    StaticAuthorities,
};
pub use selector::ProcessorSelector;
pub use strategy::StrategyRegistry;
pub use subject::{AccountFlags, Subject, SubjectRow};
pub use tree::{
    AuthorityKind, AuthorityNode, AuthorityTree, AuthorityTreeBuilder, BuilderSelector,
    ElementAuthority, ElementAuthorityTreeBuilder, MenuAuthority, MenuAuthorityTreeBuilder,
};
