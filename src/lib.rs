// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nodegram: tree-shaped box diagrams with routed connectors, rendered as Unicode/ASCII text.
//!
//! A [`Diagram`] owns a tree of text boxes. Every child hangs off one side of its parent, and
//! extra connections may link any two nodes. Rendering runs the [`layout`] pipeline on a snapshot
//! of the tree and composites the result with [`render`].

pub mod config;
pub mod layout;
pub mod model;
pub mod render;

pub use config::{BoxStyle, ConfigError, DiagramConfig};
pub use layout::{GridMode, Layout, LayoutWarning};
pub use model::{
    ConnectOptions, ConnectionId, Diagnostic, Diagram, Direction, NodeId, NodeOptions,
    StructuralError,
};
pub use render::{PageOptions, RenderError, SubtreeOptions};
