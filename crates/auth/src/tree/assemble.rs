//! Kind-independent tree assembly.
//!
//! Input is a flat node collection where each node names its parent. Output
//! is a forest in which every input node appears exactly once. Rejected
//! inputs: duplicate ids, parent ids that match no node, cycles, and (under
//! [`RootPolicy::SingleRoot`]) anything other than exactly one root.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use lightsec_core::{NodeId, TreeBuildError};

use super::node::TreeNode;

/// How many roots a built tree may have.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RootPolicy {
    Forest,
    SingleRoot,
}

/// A node with its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree<N> {
    pub node: N,
    pub children: Vec<Tree<N>>,
}

impl<N> Tree<N> {
    pub fn leaf(node: N) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including the root.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((tree, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(tree.children.iter().map(|c| (c, level + 1)));
        }
        deepest
    }

    /// Pre-order traversal.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        let mut stack = vec![self];
        core::iter::from_fn(move || {
            let tree = stack.pop()?;
            stack.extend(tree.children.iter().rev());
            Some(&tree.node)
        })
    }
}

impl<N: TreeNode> Tree<N> {
    pub fn find(&self, id: NodeId) -> Option<&Tree<N>> {
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            if tree.node.node_id() == id {
                return Some(tree);
            }
            stack.extend(tree.children.iter().rev());
        }
        None
    }
}

// Deep chains would otherwise drop one stack frame per level.
impl<N> Drop for Tree<N> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut tree) = pending.pop() {
            pending.append(&mut tree.children);
        }
    }
}

/// Ordered root trees produced by one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Forest<N> {
    roots: Vec<Tree<N>>,
}

impl<N> Forest<N> {
    pub fn new(roots: Vec<Tree<N>>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Tree<N>] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<Tree<N>> {
        self.roots
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.roots.iter().map(Tree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.roots.iter().flat_map(Tree::iter)
    }
}

impl<N> Default for Forest<N> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<N: TreeNode> Forest<N> {
    pub fn find(&self, id: NodeId) -> Option<&Tree<N>> {
        self.roots.iter().find_map(|r| r.find(id))
    }
}

/// Assemble `nodes` into a forest, ordering siblings with `order`.
pub fn assemble<N, F>(
    nodes: Vec<N>,
    policy: RootPolicy,
    order: F,
) -> Result<Forest<N>, TreeBuildError>
where
    N: TreeNode,
    F: Fn(&N, &N) -> Ordering,
{
    let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.node_id(), i).is_some() {
            return Err(TreeBuildError::DuplicateId(node.node_id()));
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        match node.parent_id() {
            None => roots.push(i),
            Some(parent) => match index.get(&parent) {
                Some(&p) => children[p].push(i),
                None => {
                    return Err(TreeBuildError::DanglingParent {
                        node: node.node_id(),
                        parent,
                    });
                }
            },
        }
    }

    // Breadth-first from the roots. Every parent resolved above, so any node
    // left unvisited sits on a parent cycle.
    let mut visit_order: Vec<usize> = Vec::with_capacity(nodes.len());
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(i) = queue.pop_front() {
        visit_order.push(i);
        queue.extend(children[i].iter().copied());
    }
    if visit_order.len() < nodes.len() {
        let mut visited = vec![false; nodes.len()];
        for &i in &visit_order {
            visited[i] = true;
        }
        let start = visited.iter().position(|v| !v).unwrap_or_default();
        return Err(TreeBuildError::Cycle(cycle_member(&nodes, &index, start)));
    }

    if policy == RootPolicy::SingleRoot {
        match roots.len() {
            1 => {}
            0 => return Err(TreeBuildError::MissingRoot),
            n => return Err(TreeBuildError::MultipleRoots(n)),
        }
    }

    roots.sort_by(|a, b| order(&nodes[*a], &nodes[*b]));
    for kids in &mut children {
        kids.sort_by(|a, b| order(&nodes[*a], &nodes[*b]));
    }

    // Children come later than their parent in breadth-first order, so
    // building in reverse finishes every subtree before its parent needs it.
    let mut slots: Vec<Option<N>> = nodes.into_iter().map(Some).collect();
    let mut built: Vec<Option<Tree<N>>> = (0..slots.len()).map(|_| None).collect();
    for &i in visit_order.iter().rev() {
        let Some(node) = slots[i].take() else {
            continue;
        };
        let subtrees = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(Tree {
            node,
            children: subtrees,
        });
    }

    Ok(Forest::new(
        roots.iter().filter_map(|&r| built[r].take()).collect(),
    ))
}

/// Follow parent links from `start` until a node repeats; that node is on
/// the cycle.
fn cycle_member<N: TreeNode>(nodes: &[N], index: &HashMap<NodeId, usize>, start: usize) -> NodeId {
    let mut seen = vec![false; nodes.len()];
    let mut current = start;
    loop {
        if seen[current] {
            return nodes[current].node_id();
        }
        seen[current] = true;
        match nodes[current].parent_id().and_then(|p| index.get(&p)) {
            Some(&next) => current = next,
            None => return nodes[current].node_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct N(i64, Option<i64>);

    impl TreeNode for N {
        fn node_id(&self) -> NodeId {
            NodeId::new(self.0)
        }

        fn parent_id(&self) -> Option<NodeId> {
            self.1.map(NodeId::new)
        }
    }

    fn by_id(a: &N, b: &N) -> Ordering {
        a.0.cmp(&b.0)
    }

    #[test]
    fn builds_nested_tree_with_sorted_children() {
        let nodes = vec![N(3, Some(1)), N(1, None), N(2, Some(1)), N(4, Some(2))];
        let forest = assemble(nodes, RootPolicy::SingleRoot, by_id).unwrap();

        assert_eq!(forest.roots().len(), 1);
        let root = &forest.roots()[0];
        assert_eq!(root.node, N(1, None));
        assert_eq!(root.depth(), 3);
        let ids: Vec<_> = forest.iter().map(|n| n.0).collect();
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(forest.find(NodeId::new(2)).unwrap().children.len(), 1);
    }

    #[test]
    fn empty_input_is_an_empty_forest() {
        let forest = assemble(Vec::<N>::new(), RootPolicy::Forest, by_id).unwrap();
        assert!(forest.is_empty());
        assert_eq!(
            assemble(Vec::<N>::new(), RootPolicy::SingleRoot, by_id).unwrap_err(),
            TreeBuildError::MissingRoot
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let nodes = vec![N(1, None), N(1, None)];
        assert_eq!(
            assemble(nodes, RootPolicy::Forest, by_id).unwrap_err(),
            TreeBuildError::DuplicateId(NodeId::new(1))
        );
    }

    #[test]
    fn rejects_dangling_parent() {
        let nodes = vec![N(1, None), N(2, Some(9))];
        assert_eq!(
            assemble(nodes, RootPolicy::Forest, by_id).unwrap_err(),
            TreeBuildError::DanglingParent {
                node: NodeId::new(2),
                parent: NodeId::new(9)
            }
        );
    }

    #[test]
    fn rejects_cycles_including_self_parent() {
        let nodes = vec![N(1, None), N(2, Some(3)), N(3, Some(2))];
        let err = assemble(nodes, RootPolicy::Forest, by_id).unwrap_err();
        assert!(matches!(err, TreeBuildError::Cycle(id) if id == NodeId::new(2) || id == NodeId::new(3)));

        let nodes = vec![N(7, Some(7))];
        assert_eq!(
            assemble(nodes, RootPolicy::Forest, by_id).unwrap_err(),
            TreeBuildError::Cycle(NodeId::new(7))
        );
    }

    #[test]
    fn single_root_policy_rejects_forests() {
        let nodes = vec![N(1, None), N(2, None)];
        assert_eq!(
            assemble(nodes.clone(), RootPolicy::SingleRoot, by_id).unwrap_err(),
            TreeBuildError::MultipleRoots(2)
        );
        assert_eq!(assemble(nodes, RootPolicy::Forest, by_id).unwrap().len(), 2);
    }

    #[test]
    fn deep_chain_builds_counts_and_drops_on_a_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let nodes: Vec<N> = (0..10_000).map(|i| N(i, (i > 0).then(|| i - 1))).collect();
                let forest = assemble(nodes, RootPolicy::SingleRoot, by_id).unwrap();
                assert_eq!(forest.len(), 10_000);
                assert_eq!(forest.roots()[0].depth(), 10_000);
                assert_eq!(forest.find(NodeId::new(9_999)).map(|t| t.node.0), Some(9_999));
                drop(forest);
            })
            .unwrap();
        handle.join().unwrap();
    }

    /// Random well-formed single-root tree: node i > 0 hangs under some j < i.
    fn arb_tree() -> impl Strategy<Value = Vec<N>> {
        prop::collection::vec(any::<prop::sample::Index>(), 0..40).prop_map(|picks| {
            let mut nodes = vec![N(0, None)];
            for (i, pick) in picks.iter().enumerate() {
                let id = i as i64 + 1;
                nodes.push(N(id, Some(pick.index(id as usize) as i64)));
            }
            nodes.reverse();
            nodes
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: every input node appears exactly once under the root.
        #[test]
        fn every_node_appears_exactly_once(nodes in arb_tree()) {
            let total = nodes.len();
            let forest = assemble(nodes, RootPolicy::SingleRoot, by_id).unwrap();

            prop_assert_eq!(forest.roots().len(), 1);
            let mut ids: Vec<i64> = forest.iter().map(|n| n.0).collect();
            prop_assert_eq!(ids.len(), total);
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), total);
        }

        /// Property: re-parenting the root under any node creates a cycle.
        #[test]
        fn closing_a_loop_is_rejected(nodes in arb_tree(), pick in any::<prop::sample::Index>()) {
            let target = pick.index(nodes.len()) as i64;
            let nodes: Vec<N> = nodes
                .into_iter()
                .map(|n| if n.0 == 0 { N(0, Some(target)) } else { n })
                .collect();

            let err = assemble(nodes, RootPolicy::Forest, by_id).unwrap_err();
            prop_assert!(matches!(err, TreeBuildError::Cycle(_)));
        }
    }
}
