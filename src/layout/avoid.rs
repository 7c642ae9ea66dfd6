// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Intersection detection and the respacing step that tries to clear it.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::NodeId;

use super::geometry::{CharPoint, Geometry, Spacing};
use super::route::{Pass, RoutedEdge};

/// Extra characters opened after a grid line per respacing round.
const WIDEN_STEP: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// A path cell lies on a box (border included).
    BoxOverlap { edge: usize, node: NodeId, at: CharPoint },
    /// A connection crosses, or runs along, another path.
    Crossing { first: usize, second: usize, at: CharPoint },
}

impl Conflict {
    pub fn at(&self) -> CharPoint {
        match self {
            Self::BoxOverlap { at, .. } | Self::Crossing { at, .. } => *at,
        }
    }
}

/// Lists every conflict in `edges`, ordered by edge index.
pub fn find_conflicts(edges: &[RoutedEdge], geometry: &Geometry) -> Vec<Conflict> {
    let mut out = Vec::new();
    let mut by_cell = BTreeMap::<CharPoint, Vec<(usize, Pass)>>::new();

    for (idx, edge) in edges.iter().enumerate() {
        for (cell, pass) in edge.passes() {
            if let Some(node) = geometry.box_at(cell) {
                out.push(Conflict::BoxOverlap { edge: idx, node, at: cell });
            }
            by_cell.entry(cell).or_default().push((idx, pass));
        }
    }

    for (cell, users) in &by_cell {
        for (i, (first, first_pass)) in users.iter().enumerate() {
            for (second, second_pass) in &users[i + 1..] {
                if first == second {
                    continue;
                }
                if !(edges[*first].is_connection() || edges[*second].is_connection()) {
                    continue;
                }
                let straight = |pass: &Pass| matches!(pass, Pass::Horizontal | Pass::Vertical);
                if straight(first_pass) && straight(second_pass) {
                    out.push(Conflict::Crossing { first: *first, second: *second, at: *cell });
                }
            }
        }
    }

    out
}

/// Opens extra space after each grid column and row that holds a conflict.
pub fn widen_for_conflicts(conflicts: &[Conflict], geometry: &Geometry, spacing: &mut Spacing) {
    let mut cols = BTreeSet::new();
    let mut rows = BTreeSet::new();
    for conflict in conflicts {
        let at = conflict.at();
        if let Some(col) = geometry.col_at(at.x) {
            cols.insert(col);
        }
        if let Some(row) = geometry.row_at(at.y) {
            rows.insert(row);
        }
    }
    for col in cols {
        spacing.widen_after_col(col, WIDEN_STEP);
    }
    for row in rows {
        spacing.widen_after_row(row, WIDEN_STEP);
    }
}
