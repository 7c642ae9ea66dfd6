// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use smol_str::SmolStr;

use crate::config::{ConfigError, DiagramConfig};
use crate::layout::{layout_scene, Layout};
use crate::render::diagram::{paginate, render_snapshot, PageOptions, SubtreeOptions};
use crate::render::RenderError;

use super::connection::{ConnectOptions, Connection};
use super::ids::{ConnectionId, DiagramTag, NodeId};
use super::node::{Direction, Node, NodeOptions};
use super::snapshot::TreeSnapshot;

/// Owner of the node tree and the explicit connection list.
///
/// Nodes live in an arena addressed by [`NodeId`]. Detached nodes leave a tombstone so handles
/// are never reused. All mutation goes through the builder methods below, which either succeed
/// or leave the diagram exactly as it was.
#[derive(Debug, Clone)]
pub struct Diagram {
    tag: DiagramTag,
    config: DiagramConfig,
    nodes: Vec<Option<Node>>,
    root: NodeId,
    connections: Vec<Connection>,
    grid: Option<Vec<Vec<NodeId>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("node {node} is not part of this diagram")]
    UnknownNode { node: NodeId },
    #[error("node {node} cannot be connected to itself")]
    SelfConnection { node: NodeId },
    #[error("moving {node} under {new_parent} would create a cycle")]
    Cycle { node: NodeId, new_parent: NodeId },
    #[error("the root node cannot be moved or detached")]
    RootImmutable,
}

impl Diagram {
    pub fn new(root_text: impl Into<String>) -> Self {
        Self::build(root_text, DiagramConfig::default())
    }

    pub fn with_config(
        root_text: impl Into<String>,
        config: DiagramConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(root_text, config))
    }

    fn build(root_text: impl Into<String>, config: DiagramConfig) -> Self {
        let tag = DiagramTag::next();
        let root = NodeId::new(tag, 0);
        Self {
            tag,
            config,
            nodes: vec![Some(Node::root(root, root_text))],
            root,
            connections: Vec::new(),
            grid: None,
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node if `id` was issued by this diagram and has not been detached.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id.owner() != self.tag {
            return None;
        }
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Live nodes in arena (creation) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub(crate) fn slots(&self) -> &[Option<Node>] {
        &self.nodes
    }

    #[cfg(test)]
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Node>] {
        &mut self.nodes
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, StructuralError> {
        if id.owner() != self.tag {
            return Err(StructuralError::UnknownNode { node: id });
        }
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(StructuralError::UnknownNode { node: id })
    }

    fn require(&self, id: NodeId) -> Result<&Node, StructuralError> {
        self.node(id).ok_or(StructuralError::UnknownNode { node: id })
    }

    /// Adds a child of `parent` placed toward `direction` and returns its handle.
    pub fn add(
        &mut self,
        parent: NodeId,
        direction: Direction,
        text: impl Into<String>,
        options: NodeOptions,
    ) -> Result<NodeId, StructuralError> {
        self.require(parent)?;

        let id = NodeId::new(self.tag, self.nodes.len());
        self.nodes.push(Some(Node::child(id, parent, direction, text, options)));
        self.node_mut(parent)?.children_mut().push(id);
        Ok(id)
    }

    pub fn add_right(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Right, text, NodeOptions::default())
    }

    pub fn add_left(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Left, text, NodeOptions::default())
    }

    pub fn add_top(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Top, text, NodeOptions::default())
    }

    pub fn add_bottom(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Bottom, text, NodeOptions::default())
    }

    pub fn add_right_with(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
        options: NodeOptions,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Right, text, options)
    }

    pub fn add_left_with(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
        options: NodeOptions,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Left, text, options)
    }

    pub fn add_top_with(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
        options: NodeOptions,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Top, text, options)
    }

    pub fn add_bottom_with(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
        options: NodeOptions,
    ) -> Result<NodeId, StructuralError> {
        self.add(parent, Direction::Bottom, text, options)
    }

    /// Replaces a node's text. This is the hook external text generators use between renders.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), StructuralError> {
        self.node_mut(id)?.set_text(text);
        Ok(())
    }

    pub fn set_title(&mut self, id: NodeId, title: Option<String>) -> Result<(), StructuralError> {
        self.node_mut(id)?.set_title(title);
        Ok(())
    }

    pub fn set_style(
        &mut self,
        id: NodeId,
        style: Option<SmolStr>,
    ) -> Result<(), StructuralError> {
        self.node_mut(id)?.set_style(style);
        Ok(())
    }

    /// Re-parents `node` (with its subtree) under `new_parent`, appended as the last child.
    pub fn move_node(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        direction: Direction,
    ) -> Result<(), StructuralError> {
        if node == self.root {
            return Err(StructuralError::RootImmutable);
        }
        let old_parent = self.require(node)?.parent();
        self.require(new_parent)?;
        if self.is_ancestor_or_self(node, new_parent) {
            return Err(StructuralError::Cycle { node, new_parent });
        }

        if let Some(old_parent) = old_parent {
            self.node_mut(old_parent)?.children_mut().retain(|child| *child != node);
        }
        self.node_mut(new_parent)?.children_mut().push(node);
        self.node_mut(node)?.set_placement(new_parent, direction);
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        // Bounded walk: a corrupted parent chain must not hang the check.
        for _ in 0..self.nodes.len() {
            if node == ancestor {
                return true;
            }
            match self.node(node).and_then(Node::parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
        true
    }

    /// Removes `node` and its subtree from the tree and returns the removed handles in pre-order.
    ///
    /// Connections touching removed nodes are kept; they dangle until cleared and are reported by
    /// [`Diagram::validate`].
    pub fn detach(&mut self, node: NodeId) -> Result<Vec<NodeId>, StructuralError> {
        if node == self.root {
            return Err(StructuralError::RootImmutable);
        }
        let parent = self.require(node)?.parent();

        let removed = TreeSnapshot::subtree(self, node, None)?.nodes().to_vec();
        if let Some(parent) = parent {
            self.node_mut(parent)?.children_mut().retain(|child| *child != node);
        }
        for id in &removed {
            self.nodes[id.index()] = None;
        }
        Ok(removed)
    }

    /// Registers an explicit connection between two nodes of this diagram.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        options: ConnectOptions,
    ) -> Result<ConnectionId, StructuralError> {
        self.require(source)?;
        self.require(target)?;
        if source == target {
            return Err(StructuralError::SelfConnection { node: source });
        }

        let id = ConnectionId::new(self.tag, self.connections.len());
        self.connections.push(Connection::new(id, source, target, options));
        Ok(id)
    }

    pub fn clear_connections(&mut self) {
        self.connections.clear();
    }

    /// Pins nodes to grid cells: `rows[r][c]` is placed at row `r`, column `c`.
    ///
    /// Rows must be non-empty and equally long, and every cell must name a distinct node of this
    /// diagram. Nodes left out are appended below the grid in pre-order. Replaces any earlier
    /// grid; on error the diagram is unchanged.
    pub fn use_grid_layout(&mut self, rows: Vec<Vec<NodeId>>) -> Result<(), ConfigError> {
        let expected = rows.first().map(Vec::len).ok_or(ConfigError::EmptyGrid)?;
        let mut seen = BTreeSet::new();
        for (row, members) in rows.iter().enumerate() {
            if members.is_empty() {
                return Err(ConfigError::EmptyGridRow { row });
            }
            if members.len() != expected {
                return Err(ConfigError::RaggedGrid { row, expected, found: members.len() });
            }
            for &node in members {
                if !self.contains(node) {
                    return Err(ConfigError::ForeignGridNode { node });
                }
                if !seen.insert(node) {
                    return Err(ConfigError::DuplicateGridNode { node });
                }
            }
        }
        self.grid = Some(rows);
        Ok(())
    }

    /// Returns to automatic placement.
    pub fn clear_grid_layout(&mut self) {
        self.grid = None;
    }

    pub fn grid_layout(&self) -> Option<&[Vec<NodeId>]> {
        self.grid.as_deref()
    }

    /// Runs the layout pipeline and returns the finished, read-only model.
    pub fn layout(&self) -> Layout {
        layout_scene(&TreeSnapshot::full(self))
    }

    pub fn render(&self, include_markup: bool) -> Result<String, RenderError> {
        render_snapshot(&TreeSnapshot::full(self), include_markup)
    }

    /// Renders only the subtree under `node`, laid out as if `node` were the root.
    pub fn render_subtree(
        &self,
        node: NodeId,
        options: SubtreeOptions,
    ) -> Result<String, RenderError> {
        let snapshot = TreeSnapshot::subtree(self, node, options.depth)?;
        render_snapshot(&snapshot, options.include_markup)
    }

    pub fn render_paginated(&self, options: PageOptions) -> Result<Vec<String>, RenderError> {
        let text = self.render(options.include_markup)?;
        Ok(paginate(&text, &options))
    }

    /// Human-readable diagnostics; empty when the diagram is healthy.
    pub fn validate(&self) -> Vec<String> {
        self.check().iter().map(ToString::to_string).collect()
    }
}
