// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout pipeline: grid placement, box sizing, character expansion, and connector routing.
//!
//! [`layout_scene`] is a pure function of a [`TreeSnapshot`]. Nothing computed here is cached on
//! the diagram; every render starts from scratch.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{NodeId, TreeSnapshot};

pub mod avoid;
pub mod geometry;
pub mod grid;
pub(crate) mod maze;
pub mod route;
pub mod textbox;

pub use avoid::{find_conflicts, Conflict};
pub use geometry::{BoxGeometry, CharPoint, Geometry, Spacing};
pub use grid::{FoldPlan, GridLayout, GridMode, GridPos, AUTO_GRID_MIN_NODES};
pub use route::{EdgeKind, EdgeLabel, Pass, RoutedEdge};
pub use textbox::{wrap_text, TextBox};

/// Non-fatal layout outcome. The layout is still complete and renderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    #[error("intersection avoidance stopped after {iterations} iterations with {conflicts} conflicts left")]
    ExpansionBudgetExhausted { iterations: usize, conflicts: usize },
    #[error("layout is {width} characters wide, over the {limit} character limit")]
    WidthLimitExceeded { width: usize, limit: usize },
}

/// The finished, read-only model of one layout pass.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    root: NodeId,
    grid_mode: GridMode,
    positions: BTreeMap<NodeId, GridPos>,
    #[serde(skip)]
    text_boxes: BTreeMap<NodeId, TextBox>,
    #[serde(rename = "boxes")]
    geometry: GeometryView,
    edges: Vec<RoutedEdge>,
    warnings: Vec<LayoutWarning>,
}

#[derive(Debug, Clone)]
struct GeometryView(Geometry);

impl Serialize for GeometryView {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.boxes().serialize(serializer)
    }
}

impl Layout {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// How the grid was placed: by tree directions, by level, or from pinned cells.
    pub fn grid_mode(&self) -> GridMode {
        self.grid_mode
    }

    pub fn positions(&self) -> &BTreeMap<NodeId, GridPos> {
        &self.positions
    }

    pub fn position(&self, id: NodeId) -> Option<GridPos> {
        self.positions.get(&id).copied()
    }

    pub fn text_box(&self, id: NodeId) -> Option<&TextBox> {
        self.text_boxes.get(&id)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry.0
    }

    pub fn edges(&self) -> &[RoutedEdge] {
        &self.edges
    }

    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    /// Positions, boxes, edges, and warnings as JSON, for diff and inspection tools.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the whole layout pipeline on one snapshot.
pub fn layout_scene(snapshot: &TreeSnapshot<'_>) -> Layout {
    let config = snapshot.config();
    let _span = tracing::debug_span!(
        "layout",
        root = %snapshot.root(),
        nodes = snapshot.len(),
        connections = snapshot.connections().len()
    )
    .entered();

    for connection in snapshot.dangling_connections() {
        tracing::warn!(
            connection = %connection.id(),
            source = %connection.source(),
            target = %connection.target(),
            "skipping connection with a detached endpoint"
        );
    }

    let text_boxes = snapshot
        .nodes()
        .iter()
        .map(|id| {
            let node = snapshot.node(*id);
            (*id, TextBox::new(node.text(), node.title(), config.wrap_width))
        })
        .collect::<BTreeMap<_, _>>();

    let mut warnings = Vec::new();
    let mut spacing = Spacing::from_config(config);
    let grid = place(snapshot, &text_boxes, &spacing, &mut warnings);
    tracing::debug!(mode = ?grid.mode(), cells = grid.len(), "placed grid");

    let requests = route::edge_requests(snapshot, &grid);
    let avoid = !config.allow_intersections;
    let mut geometry = Geometry::expand(&grid, &text_boxes, &spacing);
    let mut edges = route::route_edges(&requests, &geometry, avoid);

    if avoid {
        let mut conflicts = find_conflicts(&edges, &geometry);
        let mut best = (conflicts.len(), geometry.clone(), edges.clone());
        let mut iterations = 0usize;

        while !conflicts.is_empty() && iterations < config.max_expansion_iterations {
            iterations += 1;
            avoid::widen_for_conflicts(&conflicts, &geometry, &mut spacing);
            geometry = Geometry::expand(&grid, &text_boxes, &spacing);
            edges = route::route_edges(&requests, &geometry, avoid);
            conflicts = find_conflicts(&edges, &geometry);
            tracing::debug!(iteration = iterations, conflicts = conflicts.len(), "respaced grid");

            // Stop at the first round that does not beat the best attempt so far.
            if conflicts.len() >= best.0 {
                tracing::debug!(iteration = iterations, "respacing made no progress; stopping");
                break;
            }
            best = (conflicts.len(), geometry.clone(), edges.clone());
        }

        let (remaining, best_geometry, best_edges) = best;
        geometry = best_geometry;
        edges = best_edges;
        if remaining > 0 {
            tracing::warn!(
                iterations,
                conflicts = remaining,
                "intersection avoidance budget exhausted; keeping the best layout found"
            );
            warnings.push(LayoutWarning::ExpansionBudgetExhausted {
                iterations,
                conflicts: remaining,
            });
        }
    }

    Layout {
        root: snapshot.root(),
        grid_mode: grid.mode(),
        positions: grid.positions().clone(),
        text_boxes,
        geometry: GeometryView(geometry),
        edges,
        warnings,
    }
}

/// Picks the grid for `snapshot` and keeps it within `max_layout_width` where it can.
fn place(
    snapshot: &TreeSnapshot<'_>,
    text_boxes: &BTreeMap<NodeId, TextBox>,
    spacing: &Spacing,
    warnings: &mut Vec<LayoutWarning>,
) -> GridLayout {
    let limit = snapshot.config().max_layout_width;
    let overflow = |grid: &GridLayout| {
        let limit = limit?;
        let width = Geometry::expand(grid, text_boxes, spacing).width();
        (width > limit).then_some(LayoutWarning::WidthLimitExceeded { width, limit })
    };
    let give_up = |warning: LayoutWarning, warnings: &mut Vec<LayoutWarning>| {
        tracing::warn!(%warning, "layout is wider than max_layout_width and cannot shrink further");
        warnings.push(warning);
    };

    if let Some(rows) = snapshot.manual_grid() {
        let grid = GridLayout::manual(snapshot, rows);
        if let Some(warning) = overflow(&grid) {
            give_up(warning, warnings);
        }
        return grid;
    }

    if GridLayout::prefers_levels(snapshot) {
        let mut grid = GridLayout::levels(snapshot, None);
        while let Some(warning) = overflow(&grid) {
            let widest = grid.widest_row();
            if widest <= 1 {
                give_up(warning, warnings);
                break;
            }
            tracing::debug!(per_row = widest.div_ceil(2), "wrapping levels");
            grid = GridLayout::levels(snapshot, Some(widest.div_ceil(2)));
        }
        return grid;
    }

    let mut folds = FoldPlan::default();
    loop {
        let grid = GridLayout::compute(snapshot, &folds);
        let Some(warning) = overflow(&grid) else {
            return grid;
        };
        if !folds.split_widest(snapshot) {
            give_up(warning, warnings);
            return grid;
        }
    }
}
