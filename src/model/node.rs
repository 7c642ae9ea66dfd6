// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::NodeId;

/// Where a child sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Right,
    Left,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Right, Self::Left, Self::Top, Self::Bottom];

    /// Unit `(row, col)` step toward this direction.
    pub fn step(self) -> (i32, i32) {
        match self {
            Self::Right => (0, 1),
            Self::Left => (0, -1),
            Self::Top => (-1, 0),
            Self::Bottom => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right => f.write_str("right"),
            Self::Left => f.write_str("left"),
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

/// Optional per-node settings accepted by the `add_*_with` builders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeOptions {
    pub title: Option<String>,
    pub style: Option<SmolStr>,
}

impl NodeOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }
}

/// A tree vertex. Parent and children are arena handles; the diagram owns every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    text: String,
    title: Option<String>,
    style: Option<SmolStr>,
    parent: Option<NodeId>,
    direction: Option<Direction>,
    children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn root(id: NodeId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            title: None,
            style: None,
            parent: None,
            direction: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn child(
        id: NodeId,
        parent: NodeId,
        direction: Direction,
        text: impl Into<String>,
        options: NodeOptions,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            title: options.title,
            style: options.style,
            parent: Some(parent),
            direction: Some(direction),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Placement relative to the parent; `None` only for the root.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub(crate) fn set_style(&mut self, style: Option<SmolStr>) {
        self.style = style;
    }

    pub(crate) fn set_placement(&mut self, parent: NodeId, direction: Direction) {
        self.parent = Some(parent);
        self.direction = Some(direction);
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}
