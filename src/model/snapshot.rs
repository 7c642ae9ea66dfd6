// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::DiagramConfig;

use super::connection::Connection;
use super::diagram::{Diagram, StructuralError};
use super::ids::NodeId;
use super::node::{Direction, Node};

/// Immutable view of the (sub)tree that one render pass works on.
///
/// The snapshot borrows the diagram, so the tree cannot change while a layout or render is in
/// flight. Children lists are filtered to the view (depth limit) and only connections whose both
/// endpoints are inside the view are kept.
#[derive(Debug, Clone)]
pub struct TreeSnapshot<'a> {
    diagram: &'a Diagram,
    root: NodeId,
    order: Vec<NodeId>,
    children: BTreeMap<NodeId, Vec<NodeId>>,
    connections: Vec<&'a Connection>,
    dangling: Vec<&'a Connection>,
}

impl<'a> TreeSnapshot<'a> {
    pub fn full(diagram: &'a Diagram) -> Self {
        Self::collect(diagram, diagram.root(), None)
    }

    /// Scopes the view to the subtree under `root`, optionally cut off below `depth` levels.
    pub fn subtree(
        diagram: &'a Diagram,
        root: NodeId,
        depth: Option<usize>,
    ) -> Result<Self, StructuralError> {
        diagram.node(root).ok_or(StructuralError::UnknownNode { node: root })?;
        Ok(Self::collect(diagram, root, depth))
    }

    fn collect(diagram: &'a Diagram, root: NodeId, depth: Option<usize>) -> Self {
        let mut order = Vec::<NodeId>::new();
        let mut children = BTreeMap::<NodeId, Vec<NodeId>>::new();
        let mut seen = BTreeSet::<NodeId>::new();

        let mut stack = vec![(root, 0usize)];
        while let Some((id, level)) = stack.pop() {
            let Some(node) = diagram.node(id) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            order.push(id);

            let within_depth = depth.map_or(true, |depth| level < depth);
            let kept = if within_depth {
                node.children()
                    .iter()
                    .copied()
                    .filter(|child| diagram.node(*child).is_some() && !seen.contains(child))
                    .collect::<Vec<_>>()
            } else {
                Vec::new()
            };

            // Reverse push keeps pre-order in insertion order.
            for child in kept.iter().rev() {
                stack.push((*child, level + 1));
            }
            children.insert(id, kept);
        }

        let mut connections = Vec::new();
        let mut dangling = Vec::new();
        for connection in diagram.connections() {
            let source_live = diagram.node(connection.source()).is_some();
            let target_live = diagram.node(connection.target()).is_some();
            if !source_live || !target_live {
                dangling.push(connection);
            } else if seen.contains(&connection.source()) && seen.contains(&connection.target()) {
                connections.push(connection);
            }
        }

        Self { diagram, root, order, children, connections, dangling }
    }

    pub fn config(&self) -> &'a DiagramConfig {
        self.diagram.config()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Nodes in pre-order (parent before children, children in insertion order).
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.children.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> &'a Node {
        self.diagram.node(id).expect("snapshot only holds live nodes")
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Placement relative to the parent. The snapshot root has none, even when it is a child in
    /// the full tree.
    pub fn direction(&self, id: NodeId) -> Option<Direction> {
        if id == self.root {
            return None;
        }
        self.node(id).direction()
    }

    pub fn connections(&self) -> &[&'a Connection] {
        &self.connections
    }

    /// Cells pinned with [`Diagram::use_grid_layout`], if any.
    pub fn manual_grid(&self) -> Option<&'a [Vec<NodeId>]> {
        self.diagram.grid_layout()
    }

    /// Connections with an endpoint that is no longer in the tree.
    pub fn dangling_connections(&self) -> &[&'a Connection] {
        &self.dangling
    }
}

#[cfg(test)]
mod tests {
    use super::TreeSnapshot;
    use crate::model::{ConnectOptions, Diagram};

    #[test]
    fn full_snapshot_is_pre_order_in_insertion_order() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_right(root, "a").unwrap();
        let a1 = diagram.add_bottom(a, "a1").unwrap();
        let b = diagram.add_bottom(root, "b").unwrap();
        let a2 = diagram.add_right(a, "a2").unwrap();

        let snapshot = TreeSnapshot::full(&diagram);
        assert_eq!(snapshot.nodes(), &[root, a, a1, a2, b]);
        assert_eq!(snapshot.children(a), &[a1, a2]);
        assert_eq!(snapshot.direction(root), None);
    }

    #[test]
    fn subtree_snapshot_treats_node_as_root_and_cuts_depth() {
        let mut diagram = Diagram::new("api");
        let api = diagram.root();
        let worker = diagram.add_right(api, "worker").unwrap();
        let store = diagram.add_bottom(worker, "store").unwrap();
        let disk = diagram.add_bottom(store, "disk").unwrap();
        diagram.connect(api, store, ConnectOptions::default()).unwrap();
        diagram.connect(worker, disk, ConnectOptions::default()).unwrap();

        let snapshot = TreeSnapshot::subtree(&diagram, worker, None).unwrap();
        assert_eq!(snapshot.nodes(), &[worker, store, disk]);
        assert_eq!(snapshot.direction(worker), None);
        assert!(!snapshot.contains(api));
        assert_eq!(snapshot.connections().len(), 1);
        assert_eq!(snapshot.connections()[0].source(), worker);

        let shallow = TreeSnapshot::subtree(&diagram, worker, Some(1)).unwrap();
        assert_eq!(shallow.nodes(), &[worker, store]);
        assert!(shallow.children(store).is_empty());
        assert!(shallow.connections().is_empty());
    }

    #[test]
    fn detached_endpoints_are_reported_as_dangling() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_right(root, "a").unwrap();
        diagram.connect(root, a, ConnectOptions::default()).unwrap();
        diagram.detach(a).unwrap();

        let snapshot = TreeSnapshot::full(&diagram);
        assert_eq!(snapshot.nodes(), &[root]);
        assert!(snapshot.connections().is_empty());
        assert_eq!(snapshot.dangling_connections().len(), 1);
    }
}
