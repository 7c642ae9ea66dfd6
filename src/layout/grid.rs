// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Grid placement: relative direction commands to injective integer cells.
//!
//! Every subtree is laid out on its own first, with its root at the origin. A parent then drops
//! each child's finished shape next to itself (fanning same-direction siblings perpendicular to
//! the placement direction) and slides the whole shape sideways until it no longer overlaps any
//! cell already taken. Working bottom-up means a subtree always moves as one piece.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::model::{Direction, NodeId, TreeSnapshot};

/// An abstract layout cell. Rows grow downward, columns grow to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPos {
    pub row: i32,
    pub col: i32,
}

impl GridPos {
    pub const ORIGIN: Self = Self { row: 0, col: 0 };

    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    fn offset(self, drow: i32, dcol: i32) -> Self {
        Self { row: self.row + drow, col: self.col + dcol }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row breaks inserted into vertical sibling groups to trade width for height.
///
/// A group is the children of one parent placed toward the same vertical direction. Breaks are
/// member indices inside the group; each chunk between breaks is pushed one band further away
/// from the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldPlan {
    breaks: BTreeMap<(NodeId, Direction), Vec<usize>>,
}

impl FoldPlan {
    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
    }

    pub fn breaks(&self, parent: NodeId, direction: Direction) -> &[usize] {
        self.breaks.get(&(parent, direction)).map(Vec::as_slice).unwrap_or(&[])
    }

    fn chunks(&self, parent: NodeId, direction: Direction, len: usize) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        let mut start = 0usize;
        for &split in self.breaks(parent, direction) {
            if split > start && split < len {
                out.push(start..split);
                start = split;
            }
        }
        out.push(start..len);
        out
    }

    /// Splits the largest chunk of any vertical sibling group at its midpoint.
    ///
    /// Returns `false` when every chunk already holds a single node, i.e. nothing is left to
    /// fold. Ties go to the group met first in pre-order.
    pub fn split_widest(&mut self, snapshot: &TreeSnapshot<'_>) -> bool {
        let mut widest: Option<((NodeId, Direction), Range<usize>)> = None;

        for &parent in snapshot.nodes() {
            for direction in [Direction::Top, Direction::Bottom] {
                let len = snapshot
                    .children(parent)
                    .iter()
                    .filter(|child| snapshot.direction(**child) == Some(direction))
                    .count();
                if len < 2 {
                    continue;
                }
                for chunk in self.chunks(parent, direction, len) {
                    let best_len = widest.as_ref().map_or(1, |(_, range)| range.len());
                    if chunk.len() > best_len {
                        widest = Some(((parent, direction), chunk));
                    }
                }
            }
        }

        let Some((key, chunk)) = widest else {
            return false;
        };
        let split = chunk.start + chunk.len().div_ceil(2);
        tracing::debug!(parent = %key.0, direction = %key.1, split, "folding sibling group");

        let breaks = self.breaks.entry(key).or_default();
        breaks.push(split);
        breaks.sort_unstable();
        breaks.dedup();
        true
    }
}

/// Trees with more nodes than this that only grow downward are laid out level by level.
pub const AUTO_GRID_MIN_NODES: usize = 8;

/// Which placement produced a [`GridLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    /// Placement directions, sibling fans, collision shifts and folds.
    #[default]
    Tree,
    /// One row per tree depth.
    Levels,
    /// Cells pinned with [`crate::Diagram::use_grid_layout`].
    Manual,
}

/// The resolved node to cell mapping for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    positions: BTreeMap<NodeId, GridPos>,
    mode: GridMode,
}

impl GridLayout {
    pub fn compute(snapshot: &TreeSnapshot<'_>, folds: &FoldPlan) -> Self {
        let mut shapes = BTreeMap::<NodeId, Shape>::new();

        // Reverse pre-order visits every child before its parent.
        for &id in snapshot.nodes().iter().rev() {
            let mut shape = Shape::single(id);
            for placement in plan_children(snapshot, id, folds, &shapes) {
                let Some(child) = shapes.remove(&placement.child) else {
                    continue;
                };
                shape.attach(child, placement);
            }
            shapes.insert(id, shape);
        }

        let positions = shapes
            .remove(&snapshot.root())
            .map(|shape| shape.cells.into_iter().map(|(pos, id)| (id, pos)).collect())
            .unwrap_or_default();
        Self { positions, mode: GridMode::Tree }
    }

    /// Whether `snapshot` is large enough, and grows only downward, to be laid out by level.
    pub fn prefers_levels(snapshot: &TreeSnapshot<'_>) -> bool {
        snapshot.len() > AUTO_GRID_MIN_NODES
            && snapshot.nodes().iter().all(|&id| {
                snapshot
                    .children(id)
                    .iter()
                    .all(|&child| snapshot.direction(child) == Some(Direction::Bottom))
            })
    }

    /// One row per depth, each level in breadth-first order and centered on column zero.
    ///
    /// With `wrap`, a level holding more than `wrap` nodes continues on the rows below it.
    pub fn levels(snapshot: &TreeSnapshot<'_>, wrap: Option<usize>) -> Self {
        let mut positions = BTreeMap::new();
        let mut level = vec![snapshot.root()];
        let mut row = 0i32;
        while !level.is_empty() {
            let per_row = wrap.unwrap_or(level.len()).max(1);
            for chunk in level.chunks(per_row) {
                for (index, &id) in chunk.iter().enumerate() {
                    positions.insert(id, GridPos::new(row, fan_offset(index, chunk.len())));
                }
                row += 1;
            }
            level = level.iter().flat_map(|&id| snapshot.children(id).iter().copied()).collect();
        }
        Self { positions, mode: GridMode::Levels }
    }

    /// `rows[r][c]` goes to row `r`, column `c`. Nodes outside the view are skipped; nodes in the
    /// view but missing from `rows` follow below the grid in pre-order, as many per row as the
    /// grid is wide.
    pub fn manual(snapshot: &TreeSnapshot<'_>, rows: &[Vec<NodeId>]) -> Self {
        let mut positions = BTreeMap::new();
        for (row, members) in rows.iter().enumerate() {
            for (col, &id) in members.iter().enumerate() {
                if snapshot.contains(id) {
                    positions.insert(id, GridPos::new(row as i32, col as i32));
                }
            }
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let unlisted = snapshot
            .nodes()
            .iter()
            .copied()
            .filter(|id| !positions.contains_key(id))
            .collect::<Vec<_>>();
        for (index, id) in unlisted.into_iter().enumerate() {
            let pos = GridPos::new((rows.len() + index / width) as i32, (index % width) as i32);
            positions.insert(id, pos);
        }
        Self { positions, mode: GridMode::Manual }
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    /// Node count of the fullest row.
    pub fn widest_row(&self) -> usize {
        let mut per_row = BTreeMap::<i32, usize>::new();
        for pos in self.positions.values() {
            *per_row.entry(pos.row).or_default() += 1;
        }
        per_row.into_values().max().unwrap_or(0)
    }

    pub fn position(&self, id: NodeId) -> Option<GridPos> {
        self.positions.get(&id).copied()
    }

    pub fn positions(&self) -> &BTreeMap<NodeId, GridPos> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Occupied rows and columns, each sorted and deduplicated.
    pub fn occupied_axes(&self) -> (Vec<i32>, Vec<i32>) {
        let mut rows = self.positions.values().map(|pos| pos.row).collect::<Vec<_>>();
        let mut cols = self.positions.values().map(|pos| pos.col).collect::<Vec<_>>();
        rows.sort_unstable();
        rows.dedup();
        cols.sort_unstable();
        cols.dedup();
        (rows, cols)
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    child: NodeId,
    direction: Direction,
    anchor: GridPos,
}

/// Offset of member `index` in a fan of `len` siblings, centered on zero. Even fans skip zero
/// so no sibling sits directly in line with the parent's other side.
fn fan_offset(index: usize, len: usize) -> i32 {
    let index = index as i32;
    let half = (len / 2) as i32;
    if len % 2 == 1 {
        index - half
    } else if index < half {
        index - half
    } else {
        index - half + 1
    }
}

/// Unit step perpendicular to `direction`: rows for horizontal placement, columns otherwise.
fn perpendicular(direction: Direction) -> (i32, i32) {
    if direction.is_horizontal() {
        (1, 0)
    } else {
        (0, 1)
    }
}

fn plan_children(
    snapshot: &TreeSnapshot<'_>,
    parent: NodeId,
    folds: &FoldPlan,
    shapes: &BTreeMap<NodeId, Shape>,
) -> Vec<Placement> {
    let children = snapshot.children(parent);
    let mut out = Vec::with_capacity(children.len());

    let mut groups = BTreeMap::<Direction, Vec<NodeId>>::new();
    for &child in children {
        if let Some(direction) = snapshot.direction(child) {
            groups.entry(direction).or_default().push(child);
        }
    }

    let mut anchors = BTreeMap::<NodeId, (Direction, GridPos)>::new();
    for (direction, members) in &groups {
        let direction = *direction;
        let chunks = if direction.is_horizontal() {
            vec![0..members.len()]
        } else {
            folds.chunks(parent, direction, members.len())
        };

        let (step_row, step_col) = direction.step();
        let (perp_row, perp_col) = perpendicular(direction);
        let mut distance = 1i32;
        for chunk in chunks {
            let mut reach = 0i32;
            for (index, &child) in members[chunk.clone()].iter().enumerate() {
                let fan = fan_offset(index, chunk.len());
                let anchor = GridPos::new(
                    step_row * distance + perp_row * fan,
                    step_col * distance + perp_col * fan,
                );
                anchors.insert(child, (direction, anchor));
                if let Some(shape) = shapes.get(&child) {
                    reach = reach.max(shape.reach(direction));
                }
            }
            distance += reach + 1;
        }
    }

    for &child in children {
        if let Some(&(direction, anchor)) = anchors.get(&child) {
            out.push(Placement { child, direction, anchor });
        }
    }
    out
}

/// A laid-out subtree, relative to its root at the origin.
#[derive(Debug, Clone)]
struct Shape {
    cells: BTreeMap<GridPos, NodeId>,
    bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min_row: i32,
    max_row: i32,
    min_col: i32,
    max_col: i32,
}

impl Bounds {
    fn point(pos: GridPos) -> Self {
        Self { min_row: pos.row, max_row: pos.row, min_col: pos.col, max_col: pos.col }
    }

    fn union(self, other: Self) -> Self {
        Self {
            min_row: self.min_row.min(other.min_row),
            max_row: self.max_row.max(other.max_row),
            min_col: self.min_col.min(other.min_col),
            max_col: self.max_col.max(other.max_col),
        }
    }

    fn translate(self, drow: i32, dcol: i32) -> Self {
        Self {
            min_row: self.min_row + drow,
            max_row: self.max_row + drow,
            min_col: self.min_col + dcol,
            max_col: self.max_col + dcol,
        }
    }

    fn area(self) -> i64 {
        i64::from(self.max_row - self.min_row + 1) * i64::from(self.max_col - self.min_col + 1)
    }
}

impl Shape {
    fn single(id: NodeId) -> Self {
        let mut cells = BTreeMap::new();
        cells.insert(GridPos::ORIGIN, id);
        Self { cells, bounds: Bounds::point(GridPos::ORIGIN) }
    }

    /// How far the shape extends past its root toward `direction`.
    fn reach(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Right => self.bounds.max_col,
            Direction::Left => -self.bounds.min_col,
            Direction::Top => -self.bounds.min_row,
            Direction::Bottom => self.bounds.max_row,
        }
    }

    fn fits(&self, child: &Shape, drow: i32, dcol: i32) -> bool {
        child.cells.keys().all(|pos| !self.cells.contains_key(&pos.offset(drow, dcol)))
    }

    fn attach(&mut self, child: Shape, placement: Placement) {
        let (perp_row, perp_col) = perpendicular(placement.direction);
        let base = placement.anchor;

        // Shifts are tried by growing magnitude; at equal magnitude the more compact side wins,
        // and the positive side on a tie. Some shift always fits: the shape is finite.
        let mut magnitude = 0i32;
        let (drow, dcol) = loop {
            let best = [magnitude, -magnitude]
                .iter()
                .map(|shift| (base.row + perp_row * shift, base.col + perp_col * shift))
                .filter(|(drow, dcol)| self.fits(&child, *drow, *dcol))
                .min_by_key(|(drow, dcol)| {
                    self.bounds.union(child.bounds.translate(*drow, *dcol)).area()
                });
            if let Some(offset) = best {
                if magnitude > 0 {
                    tracing::trace!(
                        node = %placement.child,
                        shift = magnitude,
                        "shifted subtree to clear occupied cells"
                    );
                }
                break offset;
            }
            magnitude += 1;
        };

        for (pos, id) in child.cells {
            self.cells.insert(pos.offset(drow, dcol), id);
        }
        self.bounds = self.bounds.union(child.bounds.translate(drow, dcol));
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{fan_offset, FoldPlan, GridLayout, GridMode, GridPos};
    use crate::model::{Diagram, Direction, NodeId, NodeOptions, TreeSnapshot};

    fn layout(diagram: &Diagram) -> GridLayout {
        GridLayout::compute(&TreeSnapshot::full(diagram), &FoldPlan::default())
    }

    #[rstest]
    #[case(1, &[0])]
    #[case(2, &[-1, 1])]
    #[case(3, &[-1, 0, 1])]
    #[case(4, &[-2, -1, 1, 2])]
    #[case(5, &[-2, -1, 0, 1, 2])]
    fn fans_siblings_around_center(#[case] len: usize, #[case] expected: &[i32]) {
        let offsets = (0..len).map(|index| fan_offset(index, len)).collect::<Vec<_>>();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn root_sits_at_origin() {
        let diagram = Diagram::new("root");
        let grid = layout(&diagram);
        assert_eq!(grid.position(diagram.root()), Some(GridPos::ORIGIN));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn same_direction_siblings_fan_out_perpendicular() {
        let mut diagram = Diagram::new("Server");
        let root = diagram.root();
        let first = diagram.add_right(root, "Layanan 1").unwrap();
        let second = diagram.add_right(root, "Layanan 2").unwrap();
        let below = (0..3)
            .map(|i| diagram.add_bottom(root, format!("b{i}")).unwrap())
            .collect::<Vec<_>>();

        let grid = layout(&diagram);
        assert_eq!(grid.position(first), Some(GridPos::new(-1, 1)));
        assert_eq!(grid.position(second), Some(GridPos::new(1, 1)));
        assert_eq!(grid.position(below[0]), Some(GridPos::new(1, -1)));
        assert_eq!(grid.position(below[1]), Some(GridPos::new(1, 0)));
        // (1, 1) is taken by the second right-hand sibling; (1, 0) by the middle one.
        assert_eq!(grid.position(below[2]), Some(GridPos::new(1, 2)));
    }

    #[test]
    fn each_direction_steps_one_cell() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let ids = Direction::ALL
            .map(|direction| diagram.add(root, direction, "x", NodeOptions::default()).unwrap());

        let grid = layout(&diagram);
        assert_eq!(grid.position(ids[0]), Some(GridPos::new(0, 1)));
        assert_eq!(grid.position(ids[1]), Some(GridPos::new(0, -1)));
        assert_eq!(grid.position(ids[2]), Some(GridPos::new(-1, 0)));
        assert_eq!(grid.position(ids[3]), Some(GridPos::new(1, 0)));
    }

    #[test]
    fn colliding_subtree_shifts_as_one_piece() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_right(root, "a").unwrap();
        let back = diagram.add_left(a, "back").unwrap();

        let grid = layout(&diagram);
        // `back` would land on the root; the pair slides one row, positive side on a tie.
        assert_eq!(grid.position(a), Some(GridPos::new(1, 1)));
        assert_eq!(grid.position(back), Some(GridPos::new(1, 0)));
    }

    #[test]
    fn folding_pushes_later_chunks_one_band_further() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let kids = (0..4)
            .map(|i| diagram.add_bottom(root, format!("k{i}")).unwrap())
            .collect::<Vec<_>>();
        let snapshot = TreeSnapshot::full(&diagram);

        let mut folds = FoldPlan::default();
        assert!(folds.split_widest(&snapshot));
        assert_eq!(folds.breaks(root, Direction::Bottom), &[2]);

        let grid = GridLayout::compute(&snapshot, &folds);
        assert_eq!(grid.position(kids[0]), Some(GridPos::new(1, -1)));
        assert_eq!(grid.position(kids[1]), Some(GridPos::new(1, 1)));
        assert_eq!(grid.position(kids[2]), Some(GridPos::new(2, -1)));
        assert_eq!(grid.position(kids[3]), Some(GridPos::new(2, 1)));

        assert!(folds.split_widest(&snapshot));
        assert!(folds.split_widest(&snapshot));
        assert_eq!(folds.breaks(root, Direction::Bottom), &[1, 2, 3]);
        assert!(!folds.split_widest(&snapshot));
    }

    #[test]
    fn folded_band_clears_deeper_subtrees() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let first = diagram.add_bottom(root, "first").unwrap();
        diagram.add_bottom(first, "deep").unwrap();
        let second = diagram.add_bottom(root, "second").unwrap();

        let snapshot = TreeSnapshot::full(&diagram);
        let mut folds = FoldPlan::default();
        assert!(folds.split_widest(&snapshot));

        let grid = GridLayout::compute(&snapshot, &folds);
        assert_eq!(grid.position(first), Some(GridPos::new(1, 0)));
        assert_eq!(grid.position(second), Some(GridPos::new(3, 0)));
    }

    /// Root with three children below it, each with two children below them.
    fn downward_tree() -> (Diagram, Vec<NodeId>, Vec<NodeId>) {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let mut kids = Vec::new();
        let mut grandkids = Vec::new();
        for i in 0..3 {
            let kid = diagram.add_bottom(root, format!("k{i}")).unwrap();
            for j in 0..2 {
                grandkids.push(diagram.add_bottom(kid, format!("g{i}{j}")).unwrap());
            }
            kids.push(kid);
        }
        (diagram, kids, grandkids)
    }

    #[test]
    fn large_downward_trees_prefer_levels() {
        let (mut diagram, kids, _) = downward_tree();
        assert!(GridLayout::prefers_levels(&TreeSnapshot::full(&diagram)));

        diagram.add_right(kids[0], "side").unwrap();
        assert!(!GridLayout::prefers_levels(&TreeSnapshot::full(&diagram)));

        let mut small = Diagram::new("root");
        let root = small.root();
        for i in 0..7 {
            small.add_bottom(root, format!("k{i}")).unwrap();
        }
        assert!(!GridLayout::prefers_levels(&TreeSnapshot::full(&small)));
    }

    #[test]
    fn levels_put_each_depth_on_its_own_row() {
        let (diagram, kids, grandkids) = downward_tree();
        let grid = GridLayout::levels(&TreeSnapshot::full(&diagram), None);

        assert_eq!(grid.mode(), GridMode::Levels);
        assert_eq!(grid.position(diagram.root()), Some(GridPos::ORIGIN));
        let cols = |ids: &[NodeId], row: i32| {
            ids.iter()
                .map(|id| grid.position(*id).filter(|pos| pos.row == row).map(|pos| pos.col))
                .collect::<Option<Vec<_>>>()
        };
        assert_eq!(cols(&kids, 1), Some(vec![-1, 0, 1]));
        assert_eq!(cols(&grandkids, 2), Some(vec![-3, -2, -1, 1, 2, 3]));
        assert_eq!(grid.widest_row(), 6);
    }

    #[test]
    fn wrapped_levels_continue_on_the_next_row() {
        let (diagram, _, grandkids) = downward_tree();
        let grid = GridLayout::levels(&TreeSnapshot::full(&diagram), Some(3));

        assert_eq!(grid.position(grandkids[0]), Some(GridPos::new(2, -1)));
        assert_eq!(grid.position(grandkids[2]), Some(GridPos::new(2, 1)));
        assert_eq!(grid.position(grandkids[3]), Some(GridPos::new(3, -1)));
        assert_eq!(grid.widest_row(), 3);
    }

    #[test]
    fn manual_grid_pins_listed_nodes_and_appends_the_rest() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_right(root, "a").unwrap();
        let b = diagram.add_right(root, "b").unwrap();
        let c = diagram.add_bottom(a, "c").unwrap();
        let d = diagram.add_bottom(b, "d").unwrap();

        let rows = vec![vec![b, root], vec![a, c]];
        let grid = GridLayout::manual(&TreeSnapshot::full(&diagram), &rows);
        assert_eq!(grid.mode(), GridMode::Manual);
        assert_eq!(grid.position(b), Some(GridPos::new(0, 0)));
        assert_eq!(grid.position(root), Some(GridPos::new(0, 1)));
        assert_eq!(grid.position(c), Some(GridPos::new(1, 1)));
        assert_eq!(grid.position(d), Some(GridPos::new(2, 0)));

        let subtree = TreeSnapshot::subtree(&diagram, a, None).unwrap();
        let grid = GridLayout::manual(&subtree, &rows);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.position(b), None);
    }
}
