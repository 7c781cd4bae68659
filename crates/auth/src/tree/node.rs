use serde::{Deserialize, Serialize};

use lightsec_core::{CollaboratorError, NodeId, Row};

use crate::authority::Authority;

/// Minimal node contract for tree assembly.
pub trait TreeNode {
    fn node_id(&self) -> NodeId;

    /// `None` marks a root.
    fn parent_id(&self) -> Option<NodeId>;
}

/// The closed set of authority kinds that can be arranged in a tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityKind {
    Element,
    Menu,
}

impl AuthorityKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuthorityKind::Element => "element",
            AuthorityKind::Menu => "menu",
        }
    }
}

impl core::fmt::Display for AuthorityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission on a page element (button, field, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementAuthority {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub code: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub open: bool,
}

impl ElementAuthority {
    /// Maps `[id, parent_id?, code, name, enabled, open]`.
    pub fn from_row(row: &Row, _row_num: usize) -> Result<Self, CollaboratorError> {
        Ok(Self {
            id: NodeId::new(row.get_i64(0)?),
            parent_id: row.get_opt_i64(1)?.map(NodeId::new),
            code: row.get_str(2)?.to_string(),
            name: row.get_str(3)?.to_string(),
            enabled: row.get_bool(4)?,
            open: row.get_bool(5)?,
        })
    }
}

/// Permission on a navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAuthority {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub code: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sort: i64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub open: bool,
}

impl MenuAuthority {
    /// Maps `[id, parent_id?, code, name, path, sort, enabled, open]`.
    pub fn from_row(row: &Row, _row_num: usize) -> Result<Self, CollaboratorError> {
        Ok(Self {
            id: NodeId::new(row.get_i64(0)?),
            parent_id: row.get_opt_i64(1)?.map(NodeId::new),
            code: row.get_str(2)?.to_string(),
            name: row.get_str(3)?.to_string(),
            path: row.get_str(4)?.to_string(),
            sort: row.get_i64(5)?,
            enabled: row.get_bool(6)?,
            open: row.get_bool(7)?,
        })
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Any authority record that can take part in a tree build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorityNode {
    Element(ElementAuthority),
    Menu(MenuAuthority),
}

impl AuthorityNode {
    pub fn kind(&self) -> AuthorityKind {
        match self {
            AuthorityNode::Element(_) => AuthorityKind::Element,
            AuthorityNode::Menu(_) => AuthorityKind::Menu,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthorityNode::Element(e) => &e.code,
            AuthorityNode::Menu(m) => &m.code,
        }
    }

    pub fn as_menu(&self) -> Option<&MenuAuthority> {
        match self {
            AuthorityNode::Menu(m) => Some(m),
            AuthorityNode::Element(_) => None,
        }
    }
}

impl From<ElementAuthority> for AuthorityNode {
    fn from(value: ElementAuthority) -> Self {
        AuthorityNode::Element(value)
    }
}

impl From<MenuAuthority> for AuthorityNode {
    fn from(value: MenuAuthority) -> Self {
        AuthorityNode::Menu(value)
    }
}

impl TreeNode for ElementAuthority {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }
}

impl TreeNode for MenuAuthority {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }
}

impl TreeNode for AuthorityNode {
    fn node_id(&self) -> NodeId {
        match self {
            AuthorityNode::Element(e) => e.node_id(),
            AuthorityNode::Menu(m) => m.node_id(),
        }
    }

    fn parent_id(&self) -> Option<NodeId> {
        match self {
            AuthorityNode::Element(e) => e.parent_id(),
            AuthorityNode::Menu(m) => m.parent_id(),
        }
    }
}

impl Authority for ElementAuthority {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Authority for MenuAuthority {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Authority for AuthorityNode {
    fn is_enabled(&self) -> bool {
        match self {
            AuthorityNode::Element(e) => e.is_enabled(),
            AuthorityNode::Menu(m) => m.is_enabled(),
        }
    }

    fn is_open(&self) -> bool {
        match self {
            AuthorityNode::Element(e) => e.is_open(),
            AuthorityNode::Menu(m) => m.is_open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use lightsec_core::Value;

    use super::*;

    #[test]
    fn maps_menu_row_with_null_parent() {
        let row = Row::new(vec![
            Value::Int(1),
            Value::Null,
            Value::from("sys"),
            Value::from("System"),
            Value::from("/sys"),
            Value::Int(2),
            Value::Bool(true),
            Value::Int(0),
        ]);
        let menu = MenuAuthority::from_row(&row, 0).unwrap();
        assert_eq!(menu.parent_id, None);
        assert_eq!(menu.sort, 2);
        assert!(menu.is_enabled());
        assert!(!menu.is_open());
    }

    #[test]
    fn node_json_is_tagged_by_kind() {
        let node: AuthorityNode = serde_json::from_str(
            r#"{"kind":"element","id":5,"parent_id":1,"code":"user.delete","name":"Delete"}"#,
        )
        .unwrap();
        assert_eq!(node.kind(), AuthorityKind::Element);
        assert_eq!(node.node_id(), NodeId::new(5));
        assert_eq!(node.parent_id(), Some(NodeId::new(1)));
        assert!(node.is_enabled());
        assert_eq!(node.code(), "user.delete");
    }
}
