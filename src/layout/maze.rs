// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Fallback maze router over character cells.
//!
//! Boxes are hard obstacles. Cells already used by routed connectors stay passable but carry a
//! cost, higher for running along another connector than for crossing it. The search state is
//! `(cell, heading)` so turns can be charged.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::model::Direction;

use super::geometry::{BoxGeometry, CharPoint};

const STEP_COST: u32 = 1;
const TURN_COST: u32 = 4;
const CROSS_COST: u32 = 40;
const OVERLAP_COST: u32 = 60;

/// Grids larger than this are not searched; callers fall back to a plain elbow.
const MAX_CELLS: usize = 4_000_000;

pub(crate) const USE_HORIZONTAL: u8 = 1 << 0;
pub(crate) const USE_VERTICAL: u8 = 1 << 1;
pub(crate) const USE_OTHER: u8 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MazeBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl MazeBounds {
    pub(crate) fn expand(self, margin: i32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Maze {
    min_x: i32,
    min_y: i32,
    width: usize,
    height: usize,
    blocked: Vec<bool>,
    uses: Vec<u8>,
}

fn heading_index(direction: Direction) -> usize {
    match direction {
        Direction::Right => 0,
        Direction::Left => 1,
        Direction::Top => 2,
        Direction::Bottom => 3,
    }
}

fn heading_of(index: usize) -> Direction {
    match index {
        0 => Direction::Right,
        1 => Direction::Left,
        2 => Direction::Top,
        _ => Direction::Bottom,
    }
}

/// `(dx, dy)` for one move toward `direction`.
pub(crate) fn delta(direction: Direction) -> (i32, i32) {
    let (drow, dcol) = direction.step();
    (dcol, drow)
}

/// Moves toward the goal first, then the remaining headings in a fixed order.
fn headings_towards(current: CharPoint, goal: CharPoint) -> [Direction; 4] {
    let primary_x = match (goal.x - current.x).signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let primary_y = match (goal.y - current.y).signum() {
        1 => Some(Direction::Bottom),
        -1 => Some(Direction::Top),
        _ => None,
    };

    let mut out = [Direction::Right; 4];
    let mut idx = 0usize;
    for heading in [primary_x, primary_y].into_iter().flatten() {
        out[idx] = heading;
        idx += 1;
    }
    for heading in [Direction::Bottom, Direction::Top, Direction::Right, Direction::Left] {
        if primary_x == Some(heading) || primary_y == Some(heading) {
            continue;
        }
        out[idx] = heading;
        idx += 1;
    }

    debug_assert_eq!(idx, 4);
    out
}

impl Maze {
    pub(crate) fn new(bounds: MazeBounds) -> Option<Self> {
        let width = usize::try_from(bounds.max_x - bounds.min_x + 1).ok()?;
        let height = usize::try_from(bounds.max_y - bounds.min_y + 1).ok()?;
        let len = width.checked_mul(height).filter(|len| *len <= MAX_CELLS)?;
        Some(Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            width,
            height,
            blocked: vec![false; len],
            uses: vec![0; len],
        })
    }

    fn idx_of(&self, p: CharPoint) -> Option<usize> {
        let x = usize::try_from(p.x - self.min_x).ok()?;
        let y = usize::try_from(p.y - self.min_y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    fn point_of(&self, idx: usize) -> CharPoint {
        CharPoint::new(
            (idx % self.width) as i32 + self.min_x,
            (idx / self.width) as i32 + self.min_y,
        )
    }

    pub(crate) fn block(&mut self, geometry: &BoxGeometry) {
        for y in geometry.y..=geometry.bottom() {
            for x in geometry.x..=geometry.right() {
                if let Some(idx) = self.idx_of(CharPoint::new(x, y)) {
                    self.blocked[idx] = true;
                }
            }
        }
    }

    pub(crate) fn is_blocked(&self, p: CharPoint) -> bool {
        self.idx_of(p).is_some_and(|idx| self.blocked[idx])
    }

    pub(crate) fn mark(&mut self, p: CharPoint, bits: u8) {
        if let Some(idx) = self.idx_of(p) {
            self.uses[idx] |= bits;
        }
    }

    fn move_cost(&self, idx: usize, heading: Direction) -> u32 {
        let uses = self.uses[idx];
        let (same, across) = if heading.is_horizontal() {
            (USE_HORIZONTAL | USE_OTHER, USE_VERTICAL)
        } else {
            (USE_VERTICAL | USE_OTHER, USE_HORIZONTAL)
        };
        let mut cost = STEP_COST;
        if uses & same != 0 {
            cost += OVERLAP_COST;
        } else if uses & across != 0 {
            cost += CROSS_COST;
        }
        cost
    }

    /// Cheapest cell path from `start` (leaving it toward `heading`) to `goal`.
    ///
    /// With `arrive`, the goal only counts when entered moving that way.
    pub(crate) fn shortest_path(
        &self,
        start: CharPoint,
        heading: Direction,
        goal: CharPoint,
        arrive: Option<Direction>,
    ) -> Option<Vec<CharPoint>> {
        let start_idx = self.idx_of(start)?;
        let goal_idx = self.idx_of(goal)?;
        if start_idx == goal_idx {
            return Some(vec![start]);
        }

        let states = self.blocked.len() * 4;
        let mut dist = vec![u32::MAX; states];
        let mut came_from = vec![u32::MAX; states];
        let mut heap = BinaryHeap::<Reverse<(u32, u32, u32, u32)>>::new();
        let mut tie_seq = 0u32;

        let start_state = start_idx * 4 + heading_index(heading);
        dist[start_state] = 0;
        heap.push(Reverse((manhattan(start, goal), 0, tie_seq, start_state as u32)));

        while let Some(Reverse((_, cost, _, state))) = heap.pop() {
            let state = state as usize;
            if cost > dist[state] {
                continue;
            }
            let idx = state / 4;
            let current_heading = heading_of(state % 4);
            if idx == goal_idx && arrive.map_or(true, |arrive| arrive == current_heading) {
                return Some(self.reconstruct(state, start_state, &came_from));
            }

            let current = self.point_of(idx);
            for next_heading in headings_towards(current, goal) {
                let (dx, dy) = delta(next_heading);
                let next = current.offset(dx, dy);
                let Some(next_idx) = self.idx_of(next) else {
                    continue;
                };
                if self.blocked[next_idx] && next_idx != goal_idx {
                    continue;
                }
                let mut next_cost = cost + self.move_cost(next_idx, next_heading);
                if next_heading != current_heading {
                    next_cost += TURN_COST;
                }
                let next_state = next_idx * 4 + heading_index(next_heading);
                if next_cost < dist[next_state] {
                    dist[next_state] = next_cost;
                    came_from[next_state] = state as u32;
                    tie_seq = tie_seq.wrapping_add(1);
                    heap.push(Reverse((
                        next_cost + manhattan(next, goal),
                        next_cost,
                        tie_seq,
                        next_state as u32,
                    )));
                }
            }
        }

        None
    }

    fn reconstruct(&self, goal_state: usize, start_state: usize, came_from: &[u32]) -> Vec<CharPoint> {
        let mut path = vec![self.point_of(goal_state / 4)];
        let mut cursor = goal_state;
        while cursor != start_state {
            let prev = came_from[cursor];
            if prev == u32::MAX {
                break;
            }
            cursor = prev as usize;
            path.push(self.point_of(cursor / 4));
        }
        path.reverse();
        path
    }
}

fn manhattan(a: CharPoint, b: CharPoint) -> u32 {
    (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
}

/// Drops the interior cells of straight runs, keeping endpoints and turns.
pub(crate) fn compress_to_polyline(path: &[CharPoint]) -> Vec<CharPoint> {
    match path.len() {
        0 => Vec::new(),
        1 => vec![path[0]],
        2 => vec![path[0], path[1]],
        _ => {
            let mut points = Vec::<CharPoint>::new();
            points.push(path[0]);

            let mut prev_dir = (path[1].x - path[0].x, path[1].y - path[0].y);
            for idx in 1..path.len() - 1 {
                let dir = (path[idx + 1].x - path[idx].x, path[idx + 1].y - path[idx].y);
                if dir != prev_dir {
                    points.push(path[idx]);
                    prev_dir = dir;
                }
            }

            if let Some(last) = path.last() {
                points.push(*last);
            }
            points
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compress_to_polyline, Maze, MazeBounds, USE_VERTICAL};
    use crate::layout::geometry::{BoxGeometry, CharPoint};
    use crate::model::Direction;

    fn p(x: i32, y: i32) -> CharPoint {
        CharPoint::new(x, y)
    }

    fn maze(max_x: i32, max_y: i32) -> Maze {
        Maze::new(MazeBounds { min_x: 0, min_y: 0, max_x, max_y }).expect("maze")
    }

    #[test]
    fn straight_line_when_unobstructed() {
        let maze = maze(9, 4);
        let path = maze.shortest_path(p(0, 2), Direction::Right, p(6, 2), None).expect("path");
        assert_eq!(compress_to_polyline(&path), vec![p(0, 2), p(6, 2)]);
    }

    #[test]
    fn routes_around_boxes() {
        let mut maze = maze(12, 8);
        maze.block(&BoxGeometry { x: 4, y: 2, width: 4, height: 5 });

        let path = maze.shortest_path(p(1, 4), Direction::Right, p(10, 4), None).expect("path");
        assert!(path.iter().all(|cell| !maze.is_blocked(*cell)));
        assert_eq!(path.first(), Some(&p(1, 4)));
        assert_eq!(path.last(), Some(&p(10, 4)));
        assert_eq!(compress_to_polyline(&path).len(), 6);
    }

    #[test]
    fn honours_arrival_heading() {
        let maze = maze(9, 9);
        let path = maze
            .shortest_path(p(0, 0), Direction::Right, p(5, 5), Some(Direction::Bottom))
            .expect("path");
        let n = path.len();
        assert_eq!((path[n - 2].x, path[n - 2].y + 1), (path[n - 1].x, path[n - 1].y));
    }

    #[test]
    fn prefers_crossing_over_running_along_a_connector() {
        let mut maze = maze(10, 6);
        for y in 0..=6 {
            maze.mark(p(5, y), USE_VERTICAL);
        }
        let path = maze.shortest_path(p(0, 3), Direction::Right, p(10, 3), None).expect("path");
        assert_eq!(compress_to_polyline(&path), vec![p(0, 3), p(10, 3)]);
    }

    #[test]
    fn is_deterministic() {
        let mut maze = maze(20, 12);
        maze.block(&BoxGeometry { x: 6, y: 3, width: 6, height: 5 });
        let first = maze.shortest_path(p(2, 5), Direction::Right, p(16, 5), None);
        let second = maze.shortest_path(p(2, 5), Direction::Right, p(16, 5), None);
        assert_eq!(first, second);
    }

    #[test]
    fn unreachable_goal_returns_none() {
        let mut maze = maze(6, 6);
        maze.block(&BoxGeometry { x: 3, y: 0, width: 1, height: 7 });
        assert_eq!(maze.shortest_path(p(0, 3), Direction::Right, p(6, 3), None), None);
    }

    #[test]
    fn compresses_runs_to_corners() {
        let path = [p(0, 0), p(1, 0), p(2, 0), p(2, 1), p(2, 2)];
        assert_eq!(compress_to_polyline(&path), vec![p(0, 0), p(2, 0), p(2, 2)]);
    }
}
