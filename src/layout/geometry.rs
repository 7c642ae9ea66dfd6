// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Character-space expansion of the grid.
//!
//! Each occupied grid column is as wide as its widest box and each occupied row as tall as its
//! tallest box; empty grid lines take no space. Boxes are centered inside their cell.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::DiagramConfig;
use crate::model::NodeId;

use super::grid::GridLayout;
use super::textbox::TextBox;

/// A point on the character canvas. May be negative before the renderer normalizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CharPoint {
    pub x: i32,
    pub y: i32,
}

impl CharPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub(crate) fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Outer rectangle of one box, border included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoxGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoxGeometry {
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(&self) -> CharPoint {
        CharPoint::new(self.x + (self.width - 1) / 2, self.y + (self.height - 1) / 2)
    }

    /// Border-inclusive hit test.
    pub fn contains(&self, p: CharPoint) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Columns strictly inside the left and right border.
    pub fn interior_cols(&self) -> (i32, i32) {
        (self.x + 1, self.right() - 1)
    }

    /// Rows strictly inside the top and bottom border.
    pub fn interior_rows(&self) -> (i32, i32) {
        (self.y + 1, self.bottom() - 1)
    }
}

/// Grid-line spacing, including extra gaps opened by intersection avoidance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spacing {
    horizontal: usize,
    vertical: usize,
    extra_after_col: BTreeMap<i32, usize>,
    extra_after_row: BTreeMap<i32, usize>,
}

impl Spacing {
    pub fn from_config(config: &DiagramConfig) -> Self {
        Self {
            horizontal: config.horizontal_spacing,
            vertical: config.vertical_spacing,
            ..Self::default()
        }
    }

    pub fn widen_after_col(&mut self, col: i32, by: usize) {
        *self.extra_after_col.entry(col).or_default() += by;
    }

    pub fn widen_after_row(&mut self, row: i32, by: usize) {
        *self.extra_after_row.entry(row).or_default() += by;
    }

    pub fn gap_after_col(&self, col: i32) -> usize {
        self.horizontal + self.extra_after_col.get(&col).copied().unwrap_or(0)
    }

    pub fn gap_after_row(&self, row: i32) -> usize {
        self.vertical + self.extra_after_row.get(&row).copied().unwrap_or(0)
    }
}

/// One occupied grid row or column in character space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Band {
    index: i32,
    start: i32,
    size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    boxes: BTreeMap<NodeId, BoxGeometry>,
    cols: Vec<Band>,
    rows: Vec<Band>,
    width: usize,
    height: usize,
}

impl Geometry {
    pub fn expand(
        grid: &GridLayout,
        text_boxes: &BTreeMap<NodeId, TextBox>,
        spacing: &Spacing,
    ) -> Self {
        let (row_ids, col_ids) = grid.occupied_axes();

        let mut col_size = BTreeMap::<i32, usize>::new();
        let mut row_size = BTreeMap::<i32, usize>::new();
        for (id, pos) in grid.positions() {
            let Some(text_box) = text_boxes.get(id) else {
                continue;
            };
            let width = col_size.entry(pos.col).or_default();
            *width = (*width).max(text_box.width());
            let height = row_size.entry(pos.row).or_default();
            *height = (*height).max(text_box.height());
        }

        let (cols, width) = bands(&col_ids, &col_size, |col| spacing.gap_after_col(col));
        let (rows, height) = bands(&row_ids, &row_size, |row| spacing.gap_after_row(row));

        let mut boxes = BTreeMap::new();
        for (id, pos) in grid.positions() {
            let (Some(text_box), Some(col), Some(row)) = (
                text_boxes.get(id),
                cols.iter().find(|band| band.index == pos.col),
                rows.iter().find(|band| band.index == pos.row),
            ) else {
                continue;
            };
            let box_width = text_box.width() as i32;
            let box_height = text_box.height() as i32;
            boxes.insert(
                *id,
                BoxGeometry {
                    x: col.start + (col.size - box_width) / 2,
                    y: row.start + (row.size - box_height) / 2,
                    width: box_width,
                    height: box_height,
                },
            );
        }

        Self { boxes, cols, rows, width, height }
    }

    pub fn get(&self, id: NodeId) -> Option<&BoxGeometry> {
        self.boxes.get(&id)
    }

    pub fn boxes(&self) -> &BTreeMap<NodeId, BoxGeometry> {
        &self.boxes
    }

    /// Width of the box area in characters, gaps between columns included.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn box_at(&self, p: CharPoint) -> Option<NodeId> {
        self.boxes.iter().find(|(_, geometry)| geometry.contains(p)).map(|(id, _)| *id)
    }

    /// Grid column whose band or trailing gap covers `x`.
    pub fn col_at(&self, x: i32) -> Option<i32> {
        band_at(&self.cols, x)
    }

    pub fn row_at(&self, y: i32) -> Option<i32> {
        band_at(&self.rows, y)
    }
}

fn bands(
    ids: &[i32],
    sizes: &BTreeMap<i32, usize>,
    gap_after: impl Fn(i32) -> usize,
) -> (Vec<Band>, usize) {
    let mut out = Vec::with_capacity(ids.len());
    let mut cursor = 0usize;
    for (idx, &index) in ids.iter().enumerate() {
        let size = sizes.get(&index).copied().unwrap_or(0);
        out.push(Band { index, start: cursor as i32, size: size as i32 });
        cursor += size;
        if idx + 1 < ids.len() {
            cursor += gap_after(index);
        }
    }
    (out, cursor)
}

fn band_at(bands: &[Band], at: i32) -> Option<i32> {
    bands.iter().rev().find(|band| band.start <= at).map(|band| band.index)
}
