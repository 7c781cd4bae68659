//! Authority hierarchies (menus, page elements).

pub mod assemble;
pub mod builder;
pub mod node;

pub use assemble::{Forest, RootPolicy, Tree, assemble};
pub use builder::{
    AuthorityTree, AuthorityTreeBuilder, BuilderSelector, ElementAuthorityTreeBuilder,
    MenuAuthorityTreeBuilder,
};
pub use node::{AuthorityKind, AuthorityNode, ElementAuthority, MenuAuthority, TreeNode};
