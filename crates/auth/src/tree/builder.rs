//! Authority tree builders and their selector.

use std::cmp::Ordering;
use std::sync::Arc;

use lightsec_core::{SecurityError, SecurityResult, TreeBuildError};

use crate::strategy::StrategyRegistry;

use super::assemble::{Forest, RootPolicy, assemble};
use super::node::{AuthorityKind, AuthorityNode, TreeNode};

/// Built authority hierarchy.
pub type AuthorityTree = Forest<AuthorityNode>;

/// Builds a tree from authority records of the kinds it supports.
///
/// Implementations supply the kind check and the node-shape adapters (root
/// policy, sibling order); assembly is shared. Builders hold no state
/// between calls.
pub trait AuthorityTreeBuilder: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, kind: AuthorityKind) -> bool;

    fn root_policy(&self) -> RootPolicy {
        RootPolicy::Forest
    }

    fn sibling_order(&self, a: &AuthorityNode, b: &AuthorityNode) -> Ordering {
        a.node_id().cmp(&b.node_id())
    }

    fn build(&self, nodes: Vec<AuthorityNode>) -> Result<AuthorityTree, TreeBuildError> {
        if let Some(node) = nodes.iter().find(|n| !self.supports(n.kind())) {
            return Err(TreeBuildError::UnsupportedKind(node.kind().to_string()));
        }
        assemble(nodes, self.root_policy(), |a, b| self.sibling_order(a, b)).inspect_err(|err| {
            tracing::debug!(builder = self.name(), error = %err, "authority tree build failed");
        })
    }
}

/// Element authorities hang under a single page root; siblings by id.
#[derive(Debug, Default, Copy, Clone)]
pub struct ElementAuthorityTreeBuilder;

impl AuthorityTreeBuilder for ElementAuthorityTreeBuilder {
    fn name(&self) -> &'static str {
        "element"
    }

    fn supports(&self, kind: AuthorityKind) -> bool {
        kind == AuthorityKind::Element
    }

    fn root_policy(&self) -> RootPolicy {
        RootPolicy::SingleRoot
    }
}

/// Menus may have several top-level entries; siblings by `sort`, then id.
#[derive(Debug, Default, Copy, Clone)]
pub struct MenuAuthorityTreeBuilder;

impl AuthorityTreeBuilder for MenuAuthorityTreeBuilder {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn supports(&self, kind: AuthorityKind) -> bool {
        kind == AuthorityKind::Menu
    }

    fn sibling_order(&self, a: &AuthorityNode, b: &AuthorityNode) -> Ordering {
        let sort = |n: &AuthorityNode| n.as_menu().map(|m| m.sort).unwrap_or_default();
        sort(a)
            .cmp(&sort(b))
            .then_with(|| a.node_id().cmp(&b.node_id()))
    }
}

/// Chooses the builder that accepts a node kind.
#[derive(Clone, Default)]
pub struct BuilderSelector {
    registry: StrategyRegistry<dyn AuthorityTreeBuilder>,
}

impl BuilderSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element and menu builders.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Arc::new(ElementAuthorityTreeBuilder))
            .register(Arc::new(MenuAuthorityTreeBuilder))
    }

    pub fn register(self, builder: Arc<dyn AuthorityTreeBuilder>) -> Self {
        Self {
            registry: self.registry.register(builder),
        }
    }

    pub fn select(&self, kind: AuthorityKind) -> SecurityResult<&Arc<dyn AuthorityTreeBuilder>> {
        self.registry.find(|b| b.supports(kind)).ok_or_else(|| {
            tracing::warn!(kind = %kind, "no authority tree builder registered");
            SecurityError::no_strategy(format!("authority kind '{kind}'"))
        })
    }

    /// Pick a builder from the kind of the nodes and build.
    ///
    /// All nodes must share one kind. An empty collection yields an empty
    /// tree without consulting any builder.
    pub fn build(&self, nodes: Vec<AuthorityNode>) -> SecurityResult<AuthorityTree> {
        let Some(first) = nodes.first().map(AuthorityNode::kind) else {
            return Ok(AuthorityTree::default());
        };
        if let Some(other) = nodes.iter().map(AuthorityNode::kind).find(|k| *k != first) {
            return Err(TreeBuildError::MixedKinds {
                first: first.to_string(),
                other: other.to_string(),
            }
            .into());
        }
        Ok(self.select(first)?.build(nodes)?)
    }
}

#[cfg(test)]
mod tests {
    use lightsec_core::{ErrorCode, NodeId};

    use super::super::node::{ElementAuthority, MenuAuthority};
    use super::*;

    fn element(id: i64, parent: Option<i64>) -> AuthorityNode {
        ElementAuthority {
            id: NodeId::new(id),
            parent_id: parent.map(NodeId::new),
            code: format!("e{id}"),
            name: format!("Element {id}"),
            enabled: true,
            open: false,
        }
        .into()
    }

    fn menu(id: i64, parent: Option<i64>, sort: i64) -> AuthorityNode {
        MenuAuthority {
            id: NodeId::new(id),
            parent_id: parent.map(NodeId::new),
            code: format!("m{id}"),
            name: format!("Menu {id}"),
            path: format!("/m/{id}"),
            sort,
            enabled: true,
            open: false,
        }
        .into()
    }

    #[test]
    fn selector_dispatches_on_node_kind() {
        let selector = BuilderSelector::with_defaults();
        assert_eq!(selector.select(AuthorityKind::Element).unwrap().name(), "element");
        assert_eq!(selector.select(AuthorityKind::Menu).unwrap().name(), "menu");
    }

    #[test]
    fn element_tree_requires_single_root() {
        let selector = BuilderSelector::with_defaults();
        let tree = selector
            .build(vec![element(2, Some(1)), element(1, None), element(3, Some(1))])
            .unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots()[0].children.len(), 2);

        let err = selector
            .build(vec![element(1, None), element(2, None)])
            .unwrap_err();
        assert_eq!(err, SecurityError::TreeBuild(TreeBuildError::MultipleRoots(2)));
        assert_eq!(err.code(), None::<ErrorCode>);
    }

    #[test]
    fn menu_siblings_follow_sort_order() {
        let tree = BuilderSelector::with_defaults()
            .build(vec![
                menu(1, None, 2),
                menu(2, None, 1),
                menu(3, Some(2), 5),
                menu(4, Some(2), 0),
            ])
            .unwrap();

        let codes: Vec<_> = tree.iter().map(AuthorityNode::code).collect();
        assert_eq!(codes, vec!["m2", "m4", "m3", "m1"]);
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let err = BuilderSelector::with_defaults()
            .build(vec![menu(1, None, 0), element(2, None)])
            .unwrap_err();
        assert_eq!(
            err,
            SecurityError::TreeBuild(TreeBuildError::MixedKinds {
                first: "menu".to_string(),
                other: "element".to_string(),
            })
        );
    }

    #[test]
    fn builder_refuses_foreign_kind() {
        let err = ElementAuthorityTreeBuilder
            .build(vec![menu(1, None, 0)])
            .unwrap_err();
        assert_eq!(err, TreeBuildError::UnsupportedKind("menu".to_string()));
    }

    #[test]
    fn unregistered_kind_is_no_strategy() {
        let selector = BuilderSelector::new().register(Arc::new(MenuAuthorityTreeBuilder));
        let err = selector.build(vec![element(1, None)]).unwrap_err();
        assert_eq!(
            err,
            SecurityError::NoStrategyFound("authority kind 'element'".to_string())
        );
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree = BuilderSelector::new().build(Vec::new()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn tree_serializes_nested() {
        let tree = BuilderSelector::with_defaults()
            .build(vec![menu(1, None, 0), menu(2, Some(1), 0)])
            .unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["node"]["kind"], "menu");
        assert_eq!(json[0]["children"][0]["node"]["code"], "m2");
    }
}
