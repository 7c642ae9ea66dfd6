// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Connector routing in character space.
//!
//! Every edge leaves its source one cell outside the border and stops one cell outside the
//! target border, where the arrowhead goes. Candidates are tried in a fixed order: a straight or
//! single-elbow route along the direction hint, the same with the perpendicular axis first, then
//! the maze router.

use std::collections::BTreeMap;

use serde::Serialize;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::model::{ConnectionId, Direction, NodeId, TreeSnapshot};
use crate::render::text::text_width;

use super::geometry::{BoxGeometry, CharPoint, Geometry};
use super::grid::{GridLayout, GridMode, GridPos};
use super::maze::{
    compress_to_polyline, delta, Maze, MazeBounds, USE_HORIZONTAL, USE_OTHER, USE_VERTICAL,
};

/// Room around the box area that detours may use.
const ROUTING_MARGIN: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EdgeKind {
    Tree,
    Connection(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeLabel {
    pub text: SmolStr,
    /// Leftmost cell of the label text.
    pub at: CharPoint,
}

/// How a path occupies one of its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Horizontal,
    Vertical,
    Turn,
    End,
}

impl Pass {
    pub(crate) fn use_bits(self) -> u8 {
        match self {
            Self::Horizontal => USE_HORIZONTAL,
            Self::Vertical => USE_VERTICAL,
            Self::Turn | Self::End => USE_OTHER,
        }
    }
}

/// A routed tree edge or connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedEdge {
    kind: EdgeKind,
    source: NodeId,
    target: NodeId,
    points: SmallVec<[CharPoint; 4]>,
    exit: Direction,
    entry: Direction,
    bidirectional: bool,
    label: Option<EdgeLabel>,
    style: Option<SmolStr>,
}

impl RoutedEdge {
    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn is_connection(&self) -> bool {
        matches!(self.kind, EdgeKind::Connection(_))
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Polyline vertices: start cell, elbows, end cell.
    pub fn points(&self) -> &[CharPoint] {
        &self.points
    }

    pub fn start(&self) -> CharPoint {
        self.points[0]
    }

    pub fn end(&self) -> CharPoint {
        self.points[self.points.len() - 1]
    }

    pub fn turns(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// Side of the source box the path leaves from.
    pub fn exit_side(&self) -> Direction {
        self.exit
    }

    /// Side of the target box the path arrives at.
    pub fn entry_side(&self) -> Direction {
        self.entry
    }

    /// Heading of the arrowhead drawn on the end cell.
    pub fn arrow(&self) -> Direction {
        self.entry.opposite()
    }

    /// Heading of the arrowhead on the start cell, for bidirectional connections.
    pub fn start_arrow(&self) -> Option<Direction> {
        self.bidirectional.then(|| self.exit.opposite())
    }

    pub fn label(&self) -> Option<&EdgeLabel> {
        self.label.as_ref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Every cell along the path, in travel order.
    pub fn cells(&self) -> Vec<CharPoint> {
        expand_polyline(&self.points)
    }

    pub fn passes(&self) -> Vec<(CharPoint, Pass)> {
        classify(&self.cells())
    }
}

fn expand_polyline(points: &[CharPoint]) -> Vec<CharPoint> {
    let mut out = Vec::new();
    let Some(first) = points.first() else {
        return out;
    };
    out.push(*first);
    let mut cursor = *first;
    for next in &points[1..] {
        while cursor.x != next.x {
            cursor = cursor.offset((next.x - cursor.x).signum(), 0);
            out.push(cursor);
        }
        while cursor.y != next.y {
            cursor = cursor.offset(0, (next.y - cursor.y).signum());
            out.push(cursor);
        }
    }
    out
}

fn classify(cells: &[CharPoint]) -> Vec<(CharPoint, Pass)> {
    let last = cells.len().saturating_sub(1);
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            if idx == 0 || idx == last {
                return (*cell, Pass::End);
            }
            let (prev, next) = (cells[idx - 1], cells[idx + 1]);
            let pass = if prev.y == cell.y && next.y == cell.y {
                Pass::Horizontal
            } else if prev.x == cell.x && next.x == cell.x {
                Pass::Vertical
            } else {
                Pass::Turn
            };
            (*cell, pass)
        })
        .collect()
}

/// One edge to route, in routing order.
#[derive(Debug, Clone)]
pub(crate) struct EdgeRequest<'a> {
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: NodeId,
    pub hint: Direction,
    pub label: Option<&'a str>,
    pub style: Option<SmolStr>,
    pub bidirectional: bool,
}

/// Tree edges in pre-order, then connections in insertion order.
pub(crate) fn edge_requests<'a>(
    snapshot: &TreeSnapshot<'a>,
    grid: &GridLayout,
) -> Vec<EdgeRequest<'a>> {
    let config = snapshot.config();
    let default_style = config.connector_style.as_deref().map(SmolStr::new);
    let mut out = Vec::new();

    let pinned = grid.mode() == GridMode::Manual;
    for &parent in snapshot.nodes() {
        for &child in snapshot.children(parent) {
            let Some(direction) = snapshot.direction(child) else {
                continue;
            };
            // Pinned cells may contradict the placement direction; the hint follows the cells.
            let hint = match (pinned, grid.position(parent), grid.position(child)) {
                (true, Some(from), Some(to)) => hint_between(from, to),
                _ => direction,
            };
            out.push(EdgeRequest {
                kind: EdgeKind::Tree,
                source: parent,
                target: child,
                hint,
                label: None,
                style: default_style.clone(),
                bidirectional: false,
            });
        }
    }

    for connection in snapshot.connections() {
        let (Some(from), Some(to)) =
            (grid.position(connection.source()), grid.position(connection.target()))
        else {
            continue;
        };
        let hint = hint_between(from, to);
        out.push(EdgeRequest {
            kind: EdgeKind::Connection(connection.id()),
            source: connection.source(),
            target: connection.target(),
            hint,
            label: connection.label(),
            style: connection.style().map(SmolStr::new).or_else(|| default_style.clone()),
            bidirectional: connection.is_bidirectional(),
        });
    }

    out
}

/// Dominant grid axis from `from` to `to`. Columns win ties.
fn hint_between(from: GridPos, to: GridPos) -> Direction {
    let (drow, dcol) = (to.row - from.row, to.col - from.col);
    if dcol.abs() >= drow.abs() && dcol != 0 {
        if dcol > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if drow >= 0 {
        Direction::Bottom
    } else {
        Direction::Top
    }
}

/// Cell just outside `side` of the box, at `slot` along that side.
fn outside(geometry: &BoxGeometry, side: Direction, slot: i32) -> CharPoint {
    match side {
        Direction::Right => CharPoint::new(geometry.right() + 1, slot),
        Direction::Left => CharPoint::new(geometry.x - 1, slot),
        Direction::Top => CharPoint::new(slot, geometry.y - 1),
        Direction::Bottom => CharPoint::new(slot, geometry.bottom() + 1),
    }
}

/// Attachment coordinates along one side, best first: the center, then alternating outward.
/// Left and right sides step one row; top and bottom step two columns so arrows stay apart.
/// The rows and columns of the border itself come last, so a one-line box still offers three
/// distinct exits on its left and right sides.
fn side_slots(geometry: &BoxGeometry, side: Direction) -> SmallVec<[i32; 8]> {
    let center = geometry.center();
    let (lo, hi, mid, step) = if side.is_horizontal() {
        (geometry.y, geometry.bottom(), center.y, 1)
    } else {
        (geometry.x, geometry.right(), center.x, 2)
    };

    let mut out = SmallVec::new();
    out.push(mid);
    let mut k = 1;
    loop {
        let up = mid + k * step;
        let down = mid - k * step;
        if up > hi && down < lo {
            break;
        }
        if up <= hi {
            out.push(up);
        }
        if down >= lo {
            out.push(down);
        }
        k += 1;
    }
    out
}

/// Coordinate of `at` along `side`: the row for left and right, the column for top and bottom.
fn slot_of(side: Direction, at: CharPoint) -> i32 {
    if side.is_horizontal() {
        at.y
    } else {
        at.x
    }
}

/// Hands out attachment slots per `(node, side)` in request order. Once a side runs out, slots
/// are reused from the start and connectors share exits.
#[derive(Debug, Default)]
struct SlotAllocator {
    taken: BTreeMap<(NodeId, Direction), SmallVec<[i32; 4]>>,
}

impl SlotAllocator {
    fn taken_on(&self, node: NodeId, side: Direction) -> &[i32] {
        self.taken.get(&(node, side)).map_or(&[], |taken| taken.as_slice())
    }

    fn peek(&self, node: NodeId, side: Direction, geometry: &BoxGeometry) -> i32 {
        let slots = side_slots(geometry, side);
        let taken = self.taken_on(node, side);
        slots
            .iter()
            .copied()
            .find(|slot| !taken.contains(slot))
            .unwrap_or(slots[taken.len() % slots.len()])
    }

    /// First free slot inside `lo..=hi`, if any.
    fn peek_within(
        &self,
        node: NodeId,
        side: Direction,
        geometry: &BoxGeometry,
        (lo, hi): (i32, i32),
    ) -> Option<i32> {
        let taken = self.taken_on(node, side);
        side_slots(geometry, side)
            .into_iter()
            .find(|slot| (lo..=hi).contains(slot) && !taken.contains(slot))
    }

    fn commit(&mut self, node: NodeId, side: Direction, slot: i32) {
        self.taken.entry((node, side)).or_default().push(slot);
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    points: SmallVec<[CharPoint; 4]>,
    exit: Direction,
    entry: Direction,
    entry_slot: bool,
}

impl Candidate {
    fn passes(&self) -> Vec<(CharPoint, Pass)> {
        classify(&expand_polyline(&self.points))
    }
}

pub(crate) struct Router<'g> {
    geometry: &'g Geometry,
    avoid: bool,
    slots: SlotAllocator,
    uses: BTreeMap<CharPoint, u8>,
    maze: Option<Maze>,
}

impl<'g> Router<'g> {
    pub(crate) fn new(geometry: &'g Geometry, avoid: bool) -> Self {
        let bounds = MazeBounds {
            min_x: 0,
            min_y: 0,
            max_x: geometry.width() as i32 - 1,
            max_y: geometry.height() as i32 - 1,
        }
        .expand(ROUTING_MARGIN);
        let maze = Maze::new(bounds).map(|mut maze| {
            for geometry in geometry.boxes().values() {
                maze.block(geometry);
            }
            maze
        });
        Self { geometry, avoid, slots: SlotAllocator::default(), uses: BTreeMap::new(), maze }
    }

    pub(crate) fn route(&mut self, request: &EdgeRequest<'_>) -> Option<RoutedEdge> {
        let source = *self.geometry.get(request.source)?;
        let target = *self.geometry.get(request.target)?;
        let crossing_matters = matches!(request.kind, EdgeKind::Connection(_));

        let mut headings = SmallVec::<[Direction; 2]>::new();
        headings.push(request.hint);
        if let Some(swapped) = perpendicular_toward(request.hint, &source, &target) {
            headings.push(swapped);
        }

        let mut chosen = None;
        for heading in headings {
            let Some(candidate) = self.elbow_route(request, &source, &target, heading) else {
                continue;
            };
            if self.acceptable(&candidate, crossing_matters) {
                chosen = Some(candidate);
                break;
            }
            tracing::trace!(
                source = %request.source,
                target = %request.target,
                %heading,
                "elbow route rejected"
            );
        }

        let candidate = match chosen {
            Some(candidate) => candidate,
            None => self.maze_route(request, &source, &target),
        };
        Some(self.commit(request, candidate))
    }

    fn acceptable(&self, candidate: &Candidate, crossing_matters: bool) -> bool {
        if !self.avoid {
            return true;
        }
        candidate.passes().iter().all(|(cell, pass)| {
            if self.geometry.box_at(*cell).is_some() {
                return false;
            }
            if !crossing_matters {
                return true;
            }
            // Connections neither cross nor run along an already routed line.
            let uses = self.uses.get(cell).copied().unwrap_or(0);
            match pass {
                Pass::Horizontal | Pass::Vertical => uses & (USE_HORIZONTAL | USE_VERTICAL) == 0,
                Pass::Turn | Pass::End => true,
            }
        })
    }

    /// Straight when the target spans the exit coordinate, else one elbow onto the target's
    /// near side. `None` when the target is not ahead of the exit.
    fn elbow_route(
        &self,
        request: &EdgeRequest<'_>,
        source: &BoxGeometry,
        target: &BoxGeometry,
        heading: Direction,
    ) -> Option<Candidate> {
        let (span_lo, span_hi) = if heading.is_horizontal() {
            target.interior_rows()
        } else {
            target.interior_cols()
        };
        // A free exit facing the target's interior turns an elbow into a straight line, even
        // when it is not the next slot in line.
        let mut slot = self.slots.peek(request.source, heading, source);
        if !(span_lo..=span_hi).contains(&slot) {
            if let Some(facing) =
                self.slots.peek_within(request.source, heading, source, (span_lo, span_hi))
            {
                slot = facing;
            }
        }
        let start = outside(source, heading, slot);

        let (along_start, target_near, target_far) = if heading.is_horizontal() {
            (start.x, target.x, target.right())
        } else {
            (start.y, target.y, target.bottom())
        };
        let ahead = match heading {
            Direction::Right | Direction::Bottom => target_near > along_start,
            Direction::Left | Direction::Top => target_far < along_start,
        };
        if !ahead {
            return None;
        }

        if (span_lo..=span_hi).contains(&slot) {
            let end = outside(target, heading.opposite(), slot);
            return Some(Candidate {
                points: SmallVec::from_slice(&[start, end]),
                exit: heading,
                entry: heading.opposite(),
                entry_slot: false,
            });
        }

        let (cross_lo, cross_hi) = if heading.is_horizontal() {
            (target.y, target.bottom())
        } else {
            (target.x, target.right())
        };
        let entry = match (heading.is_horizontal(), cross_hi < slot, cross_lo > slot) {
            (true, true, _) => Direction::Bottom,
            (true, _, true) => Direction::Top,
            (false, true, _) => Direction::Right,
            (false, _, true) => Direction::Left,
            _ => return None,
        };
        let entry_at = self.slots.peek(request.target, entry, target);
        let end = outside(target, entry, entry_at);
        let elbow = if heading.is_horizontal() {
            CharPoint::new(entry_at, slot)
        } else {
            CharPoint::new(slot, entry_at)
        };

        let (dx, dy) = delta(heading);
        let advance = (elbow.x - start.x) * dx + (elbow.y - start.y) * dy;
        if advance <= 0 || elbow == end {
            return None;
        }
        Some(Candidate {
            points: SmallVec::from_slice(&[start, elbow, end]),
            exit: heading,
            entry,
            entry_slot: true,
        })
    }

    fn maze_route(
        &self,
        request: &EdgeRequest<'_>,
        source: &BoxGeometry,
        target: &BoxGeometry,
    ) -> Candidate {
        let exit = request.hint;
        let start = outside(source, exit, self.slots.peek(request.source, exit, source));
        let entry = if start.x < target.x {
            Direction::Left
        } else if start.x > target.right() {
            Direction::Right
        } else if start.y < target.y {
            Direction::Top
        } else {
            Direction::Bottom
        };
        let goal = outside(target, entry, self.slots.peek(request.target, entry, target));

        let cells = self.maze.as_ref().and_then(|maze| {
            maze.shortest_path(start, exit, goal, Some(entry.opposite()))
                .or_else(|| maze.shortest_path(start, exit, goal, None))
        });
        let points = match cells {
            Some(cells) => compress_to_polyline(&cells).into_iter().collect(),
            None => {
                tracing::debug!(
                    source = %request.source,
                    target = %request.target,
                    "maze router found no path; drawing a plain elbow"
                );
                let corner = CharPoint::new(goal.x, start.y);
                if corner == start || corner == goal {
                    SmallVec::from_slice(&[start, goal])
                } else {
                    SmallVec::from_slice(&[start, corner, goal])
                }
            }
        };
        tracing::trace!(source = %request.source, target = %request.target, "maze route");
        Candidate { points, exit, entry, entry_slot: true }
    }

    fn commit(&mut self, request: &EdgeRequest<'_>, candidate: Candidate) -> RoutedEdge {
        let (start, end) = (candidate.points[0], candidate.points[candidate.points.len() - 1]);
        self.slots.commit(request.source, candidate.exit, slot_of(candidate.exit, start));
        if candidate.entry_slot {
            self.slots.commit(request.target, candidate.entry, slot_of(candidate.entry, end));
        }

        let passes = candidate.passes();
        for (cell, pass) in &passes {
            *self.uses.entry(*cell).or_default() |= pass.use_bits();
            if let Some(maze) = self.maze.as_mut() {
                maze.mark(*cell, pass.use_bits());
            }
        }

        let label = request
            .label
            .filter(|label| !label.is_empty())
            .map(|text| EdgeLabel { text: SmolStr::new(text), at: label_anchor(&passes, text) });

        RoutedEdge {
            kind: request.kind,
            source: request.source,
            target: request.target,
            points: candidate.points,
            exit: candidate.exit,
            entry: candidate.entry,
            bidirectional: request.bidirectional,
            label,
            style: request.style.clone(),
        }
    }
}

/// The heading along the other axis that points from `source` toward `target`, if any.
fn perpendicular_toward(
    hint: Direction,
    source: &BoxGeometry,
    target: &BoxGeometry,
) -> Option<Direction> {
    let (from, to) = (source.center(), target.center());
    if hint.is_horizontal() {
        match to.y.cmp(&from.y) {
            std::cmp::Ordering::Greater => Some(Direction::Bottom),
            std::cmp::Ordering::Less => Some(Direction::Top),
            std::cmp::Ordering::Equal => None,
        }
    } else {
        match to.x.cmp(&from.x) {
            std::cmp::Ordering::Greater => Some(Direction::Right),
            std::cmp::Ordering::Less => Some(Direction::Left),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Horizontal midpoints put the label one row above the line, centered; vertical ones put it
/// just right of the line.
fn label_anchor(passes: &[(CharPoint, Pass)], text: &str) -> CharPoint {
    let mid = passes.len() / 2;
    let (cell, _) = passes[mid];
    let horizontal = match passes.get(mid + 1).or_else(|| mid.checked_sub(1).map(|i| &passes[i])) {
        Some((neighbour, _)) => neighbour.y == cell.y,
        None => true,
    };
    if horizontal {
        CharPoint::new(cell.x - (text_width(text) as i32) / 2, cell.y - 1)
    } else {
        CharPoint::new(cell.x + 1, cell.y)
    }
}

/// Routes every request against one geometry.
pub(crate) fn route_edges(
    requests: &[EdgeRequest<'_>],
    geometry: &Geometry,
    avoid: bool,
) -> Vec<RoutedEdge> {
    let mut router = Router::new(geometry, avoid);
    requests.iter().filter_map(|request| router.route(request)).collect()
}
