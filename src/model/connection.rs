// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use crate::render::text::sanitize;

use super::ids::{ConnectionId, NodeId};

/// Optional settings for [`crate::Diagram::connect`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectOptions {
    pub label: Option<String>,
    /// Opaque markup tag; overrides the diagram's `connector_style`.
    pub style: Option<SmolStr>,
    /// Draw an arrowhead at the source end too.
    pub bidirectional: bool,
}

impl ConnectOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self { label: Some(label.into()), ..Self::default() }
    }
}

/// An explicit, non-tree edge drawn on top of the tree. Connections never influence placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    source: NodeId,
    target: NodeId,
    label: Option<SmolStr>,
    style: Option<SmolStr>,
    bidirectional: bool,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        source: NodeId,
        target: NodeId,
        options: ConnectOptions,
    ) -> Self {
        let label = options
            .label
            .map(|label| SmolStr::new(sanitize(&label).trim()))
            .filter(|label| !label.is_empty());
        Self {
            id,
            source,
            target,
            label,
            style: options.style,
            bidirectional: options.bidirectional,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}
