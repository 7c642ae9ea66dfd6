// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural and layout diagnostics.
//!
//! The builder API keeps the tree sound, so on a diagram built only through it the tree checks
//! are expected to pass. They still run on every call: a diagnostics consumer must be able to
//! trust a clean report.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::layout::{GridPos, LayoutWarning};

use super::diagram::Diagram;
use super::ids::{ConnectionId, NodeId};
use super::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `parent` lists `node` as a child, but `node` points at a different parent.
    ParentMismatch { node: NodeId, parent: NodeId },
    MultipleParents { node: NodeId, parents: Vec<NodeId> },
    MissingDirection { node: NodeId },
    /// Walking up from `node` never reaches the root.
    Cycle { node: NodeId },
    Unreachable { node: NodeId },
    UnknownEndpoint { connection: ConnectionId, endpoint: Endpoint, node: NodeId },
    GridCollision { first: NodeId, second: NodeId, position: GridPos },
    Layout(LayoutWarning),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentMismatch { node, parent } => {
                write!(f, "node {node} is listed as a child of {parent} but points at another parent")
            }
            Self::MultipleParents { node, parents } => {
                write!(f, "node {node} has multiple parents: ")?;
                for (idx, parent) in parents.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{parent}")?;
                }
                Ok(())
            }
            Self::MissingDirection { node } => {
                write!(f, "node {node} has no placement direction")
            }
            Self::Cycle { node } => write!(f, "node {node} is part of a parent cycle"),
            Self::Unreachable { node } => write!(f, "node {node} is not reachable from the root"),
            Self::UnknownEndpoint { connection, endpoint, node } => {
                write!(f, "connection {connection} references unknown {endpoint} node {node}")
            }
            Self::GridCollision { first, second, position } => {
                write!(f, "nodes {first} and {second} share grid cell {position}")
            }
            Self::Layout(warning) => write!(f, "layout warning: {warning}"),
        }
    }
}

impl Diagram {
    /// Runs every structural check, then (if the tree is sound) a layout pass.
    pub fn check(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        check_tree(self, &mut out);
        check_connections(self, &mut out);

        let tree_is_sound =
            !out.iter().any(|diagnostic| !matches!(diagnostic, Diagnostic::UnknownEndpoint { .. }));
        if tree_is_sound {
            let layout = self.layout();
            check_grid(layout.positions(), &mut out);
            out.extend(layout.warnings().iter().cloned().map(Diagnostic::Layout));
        }
        out
    }
}

fn live_nodes(diagram: &Diagram) -> impl Iterator<Item = &Node> {
    diagram.slots().iter().flatten()
}

fn check_tree(diagram: &Diagram, out: &mut Vec<Diagnostic>) {
    let root = diagram.root();

    let mut listed_by = BTreeMap::<NodeId, Vec<NodeId>>::new();
    for node in live_nodes(diagram) {
        for child in node.children() {
            listed_by.entry(*child).or_default().push(node.id());
        }
    }

    for node in live_nodes(diagram) {
        let id = node.id();
        if id != root && node.direction().is_none() {
            out.push(Diagnostic::MissingDirection { node: id });
        }

        match listed_by.get(&id).map(Vec::as_slice) {
            Some([parent]) if node.parent() != Some(*parent) => {
                out.push(Diagnostic::ParentMismatch { node: id, parent: *parent });
            }
            Some(parents) if parents.len() > 1 => {
                out.push(Diagnostic::MultipleParents { node: id, parents: parents.to_vec() });
            }
            _ => {}
        }

        if !reaches_root(diagram, id) {
            out.push(Diagnostic::Cycle { node: id });
        }
    }

    let mut reachable = BTreeSet::<NodeId>::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(node) = diagram.node(id) {
            stack.extend(node.children().iter().copied());
        }
    }
    for node in live_nodes(diagram) {
        let id = node.id();
        let already_reported = out.iter().any(|diagnostic| {
            matches!(diagnostic, Diagnostic::Cycle { node } if *node == id)
        });
        if !reachable.contains(&id) && !already_reported {
            out.push(Diagnostic::Unreachable { node: id });
        }
    }
}

fn reaches_root(diagram: &Diagram, start: NodeId) -> bool {
    let mut seen = BTreeSet::<NodeId>::new();
    let mut cursor = start;
    loop {
        if cursor == diagram.root() {
            return true;
        }
        if !seen.insert(cursor) {
            return false;
        }
        match diagram.node(cursor).and_then(Node::parent) {
            Some(parent) => cursor = parent,
            None => return false,
        }
    }
}

fn check_connections(diagram: &Diagram, out: &mut Vec<Diagnostic>) {
    for connection in diagram.connections() {
        for (endpoint, node) in
            [(Endpoint::Source, connection.source()), (Endpoint::Target, connection.target())]
        {
            if diagram.node(node).is_none() {
                out.push(Diagnostic::UnknownEndpoint {
                    connection: connection.id(),
                    endpoint,
                    node,
                });
            }
        }
    }
}

fn check_grid(positions: &BTreeMap<NodeId, GridPos>, out: &mut Vec<Diagnostic>) {
    let mut occupied = BTreeMap::<GridPos, NodeId>::new();
    for (node, position) in positions {
        if let Some(first) = occupied.insert(*position, *node) {
            out.push(Diagnostic::GridCollision { first, second: *node, position: *position });
        }
    }
}
