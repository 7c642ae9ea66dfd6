// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text rendering.
//!
//! [`Canvas`] is a fixed-size character grid that merges connector lines into junction glyphs;
//! [`diagram`] composites a finished [`crate::layout::Layout`] onto it.

use std::fmt;

use smol_str::SmolStr;

use crate::config::BoxStyle;
use crate::model::Direction;

pub mod diagram;
pub(crate) mod text;

pub use diagram::{render_layout, PageOptions, RenderError, SubtreeOptions};

/// Marks the right half of a wide glyph. Never written as content: control characters are
/// drawn as spaces.
const CONTINUATION: char = '\0';

/// Glyphs for one [`BoxStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSet {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub tee_right: char,
    pub tee_left: char,
    pub tee_down: char,
    pub tee_up: char,
    pub cross: char,
    pub arrow_up: char,
    pub arrow_down: char,
    pub arrow_left: char,
    pub arrow_right: char,
}

impl GlyphSet {
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        ..Self::SQUARE
    };

    pub const SQUARE: Self = Self {
        horizontal: '─',
        vertical: '│',
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        tee_right: '├',
        tee_left: '┤',
        tee_down: '┬',
        tee_up: '┴',
        cross: '┼',
        arrow_up: '▲',
        arrow_down: '▼',
        arrow_left: '◄',
        arrow_right: '►',
    };

    pub const ASCII: Self = Self {
        horizontal: '-',
        vertical: '|',
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        tee_right: '+',
        tee_left: '+',
        tee_down: '+',
        tee_up: '+',
        cross: '+',
        arrow_up: '^',
        arrow_down: 'v',
        arrow_left: '<',
        arrow_right: '>',
    };

    pub fn for_style(style: BoxStyle) -> Self {
        match style {
            BoxStyle::Rounded => Self::ROUNDED,
            BoxStyle::Square => Self::SQUARE,
            BoxStyle::Ascii => Self::ASCII,
        }
    }

    /// Arrowhead pointing toward `heading`.
    pub fn arrow(&self, heading: Direction) -> char {
        match heading {
            Direction::Right => self.arrow_right,
            Direction::Left => self.arrow_left,
            Direction::Top => self.arrow_up,
            Direction::Bottom => self.arrow_down,
        }
    }

    fn junction(&self, edges: BoxEdges) -> char {
        match edges.0 {
            // Empty shouldn't normally occur for line cells; treat as blank.
            0 => ' ',
            // Straight segments (including endpoints).
            1..=3 => self.horizontal,
            4 | 8 | 12 => self.vertical,
            // Corners.
            10 => self.top_left,
            9 => self.top_right,
            6 => self.bottom_left,
            5 => self.bottom_right,
            // Tees.
            14 => self.tee_right,
            13 => self.tee_left,
            11 => self.tee_down,
            7 => self.tee_up,
            // Cross, and a deterministic fallback for anything wider than 4 bits.
            _ => self.cross,
        }
    }
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self::for_style(BoxStyle::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxEdges(u8);

impl BoxEdges {
    const NONE: Self = Self(0);
    const LEFT: Self = Self(1 << 0);
    const RIGHT: Self = Self(1 << 1);
    const UP: Self = Self(1 << 2);
    const DOWN: Self = Self(1 << 3);

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn contains(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A fixed-size, bounds-checked character grid with optional per-cell style tags.
///
/// Collision behavior is deterministic:
/// - plain characters (text, box borders, arrowheads) overwrite, last writer wins
/// - lines drawn with [`Canvas::draw_hline`] / [`Canvas::draw_vline`] merge into junctions
///   (`┼`, `├`, `┤`, `┬`, `┴`) and corners instead of overwriting each other
/// - a wide glyph takes its cell and the one to its right; writing over either half blanks
///   the other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    glyphs: GlyphSet,
    cells: Vec<char>,
    box_edges: Vec<BoxEdges>,
    styles: Vec<Option<SmolStr>>,
    pen: Option<SmolStr>,
}

impl Canvas {
    /// Creates a new canvas filled with spaces (`' '`), using square line glyphs.
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        Self::new_filled(width, height, ' ')
    }

    /// Creates a new canvas filled with `fill`.
    pub fn new_filled(width: usize, height: usize, fill: char) -> Result<Self, CanvasError> {
        let len = width
            .checked_mul(height)
            .ok_or(CanvasError::AreaOverflow { width, height })?;
        let fill = if fill.is_control() { ' ' } else { fill };

        Ok(Self {
            width,
            height,
            glyphs: GlyphSet::SQUARE,
            cells: vec![fill; len],
            box_edges: vec![BoxEdges::NONE; len],
            styles: vec![None; len],
            pen: None,
        })
    }

    pub fn with_glyphs(mut self, glyphs: GlyphSet) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn glyphs(&self) -> &GlyphSet {
        &self.glyphs
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Style tag recorded for every cell written until the next call.
    pub fn set_style(&mut self, style: Option<&str>) {
        self.pen = style.map(SmolStr::new);
    }

    /// Returns the character at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.render_at(x, y, idx))
    }

    pub fn style_at(&self, x: usize, y: usize) -> Result<Option<&str>, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.styles[idx].as_deref())
    }

    /// Sets the character at `(x, y)`, replacing any line merged there.
    ///
    /// A wide glyph also claims `(x + 1, y)` and fails if that cell is off the canvas. Control
    /// characters are drawn as spaces.
    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        let ch = if ch.is_control() { ' ' } else { ch };
        let wide = text::char_width(ch) > 1;
        if wide {
            self.index_of(x + 1, y)?;
        }

        self.release(x, y);
        self.cells[idx] = ch;
        self.box_edges[idx] = BoxEdges::NONE;
        self.styles[idx] = self.pen.clone();
        if wide {
            self.release(x + 1, y);
            self.cells[idx + 1] = CONTINUATION;
            self.box_edges[idx + 1] = BoxEdges::NONE;
            self.styles[idx + 1] = self.pen.clone();
        }
        Ok(())
    }

    fn add_edges(&mut self, x: usize, y: usize, edges: BoxEdges) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        self.release(x, y);
        self.box_edges[idx] = self.box_edges[idx].union(edges);
        self.styles[idx] = self.pen.clone();
        Ok(())
    }

    /// Blanks whatever wide glyph overlaps `(x, y)`, so no half of one survives alone.
    fn release(&mut self, x: usize, y: usize) {
        let idx = (y * self.width) + x;
        if self.cells[idx] == CONTINUATION {
            self.cells[idx] = ' ';
            if x > 0 {
                self.cells[idx - 1] = ' ';
            }
        } else if x + 1 < self.width && self.cells[idx + 1] == CONTINUATION {
            self.cells[idx] = ' ';
            self.cells[idx + 1] = ' ';
        }
    }

    /// Writes `text` left-to-right starting at `(x, y)`.
    ///
    /// Behavior:
    /// - If `y` is out of bounds: returns an error.
    /// - If `text` exceeds the row: clips at the right edge. A wide glyph that would straddle the
    ///   edge is dropped.
    pub fn write_str(&mut self, x: usize, y: usize, text: &str) -> Result<(), CanvasError> {
        if y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let mut x = x;
        for ch in text.chars() {
            let width = text::char_width(ch);
            if x + width > self.width {
                break;
            }
            self.set(x, y, ch)?;
            x += width;
        }

        Ok(())
    }

    /// Fills the rectangle with corners `(x0, y0)` and `(x1, y1)` with `ch`.
    pub fn fill_rect(
        &mut self,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
        ch: char,
    ) -> Result<(), CanvasError> {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        self.index_of(max_x, max_y)?;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                self.set(x, y, ch)?;
            }
        }
        Ok(())
    }

    /// Draws a horizontal line from `x0..=x1` at `y`.
    pub fn draw_hline(&mut self, x0: usize, x1: usize, y: usize) -> Result<(), CanvasError> {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };

        if y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x: min_x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        if max_x >= self.width {
            return Err(CanvasError::OutOfBounds {
                x: max_x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        for x in min_x..=max_x {
            self.add_edges(x, y, BoxEdges::LEFT.union(BoxEdges::RIGHT))?;
        }

        Ok(())
    }

    /// Draws a vertical line from `y0..=y1` at `x`.
    pub fn draw_vline(&mut self, x: usize, y0: usize, y1: usize) -> Result<(), CanvasError> {
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };

        if x >= self.width {
            return Err(CanvasError::OutOfBounds {
                x,
                y: min_y,
                width: self.width,
                height: self.height,
            });
        }

        if max_y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x,
                y: max_y,
                width: self.width,
                height: self.height,
            });
        }

        for y in min_y..=max_y {
            self.add_edges(x, y, BoxEdges::UP.union(BoxEdges::DOWN))?;
        }

        Ok(())
    }

    /// Draws a box border with corners at `(x0, y0)` and `(x1, y1)`.
    ///
    /// Borders are plain characters: they cover lines underneath and never merge with them.
    pub fn draw_box(
        &mut self,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
    ) -> Result<(), CanvasError> {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };

        if max_x >= self.width {
            return Err(CanvasError::OutOfBounds {
                x: max_x,
                y: min_y,
                width: self.width,
                height: self.height,
            });
        }

        if max_y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x: min_x,
                y: max_y,
                width: self.width,
                height: self.height,
            });
        }

        let glyphs = self.glyphs;
        if min_x == max_x && min_y == max_y {
            return self.set(min_x, min_y, glyphs.cross);
        }

        for x in (min_x + 1)..max_x {
            self.set(x, min_y, glyphs.horizontal)?;
            self.set(x, max_y, glyphs.horizontal)?;
        }

        for y in (min_y + 1)..max_y {
            self.set(min_x, y, glyphs.vertical)?;
            self.set(max_x, y, glyphs.vertical)?;
        }

        self.set(min_x, min_y, glyphs.top_left)?;
        self.set(max_x, min_y, glyphs.top_right)?;
        self.set(min_x, max_y, glyphs.bottom_left)?;
        self.set(max_x, max_y, glyphs.bottom_right)?;

        Ok(())
    }

    /// Serializes with style runs wrapped in `[tag]...[/]`. Unstyled cells are emitted as is.
    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height);
        for y in 0..self.height {
            let mut open: Option<&str> = None;
            for x in 0..self.width {
                let idx = (y * self.width) + x;
                if self.is_continuation(idx) {
                    continue;
                }
                let style = self.styles[idx].as_deref();
                if style != open {
                    if open.is_some() {
                        out.push_str(text::CLOSE_TAG);
                    }
                    if let Some(style) = style {
                        out.push_str(&text::open_tag(style));
                    }
                    open = style;
                }
                out.push(self.render_at(x, y, idx));
            }
            if open.is_some() {
                out.push_str(text::CLOSE_TAG);
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if !self.in_bounds(x, y) {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        Ok((y * self.width) + x)
    }

    fn is_continuation(&self, idx: usize) -> bool {
        self.cells[idx] == CONTINUATION && self.box_edges[idx].is_empty()
    }

    fn render_at(&self, x: usize, y: usize, idx: usize) -> char {
        let edges = self.box_edges[idx];
        if edges.is_empty() {
            return match self.cells[idx] {
                CONTINUATION => ' ',
                ch => ch,
            };
        }

        let connected = self.connected_box_edges(x, y, edges);
        let edges_for_render = if connected.is_empty() {
            edges
        } else {
            connected
        };
        self.glyphs.junction(edges_for_render)
    }

    /// Keeps only the arms of `edges` whose neighbor has a matching arm.
    fn connected_box_edges(&self, x: usize, y: usize, edges: BoxEdges) -> BoxEdges {
        let mut connected = BoxEdges::NONE;

        if edges.contains(BoxEdges::LEFT) && x > 0 {
            let left_idx = (y * self.width) + (x - 1);
            if self.box_edges[left_idx].contains(BoxEdges::RIGHT) {
                connected = connected.union(BoxEdges::LEFT);
            }
        }

        if edges.contains(BoxEdges::RIGHT) && (x + 1) < self.width {
            let right_idx = (y * self.width) + (x + 1);
            if self.box_edges[right_idx].contains(BoxEdges::LEFT) {
                connected = connected.union(BoxEdges::RIGHT);
            }
        }

        if edges.contains(BoxEdges::UP) && y > 0 {
            let up_idx = ((y - 1) * self.width) + x;
            if self.box_edges[up_idx].contains(BoxEdges::DOWN) {
                connected = connected.union(BoxEdges::UP);
            }
        }

        if edges.contains(BoxEdges::DOWN) && (y + 1) < self.height {
            let down_idx = ((y + 1) * self.width) + x;
            if self.box_edges[down_idx].contains(BoxEdges::UP) {
                connected = connected.union(BoxEdges::DOWN);
            }
        }

        connected
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for y in 0..self.height {
            for x in 0..self.width {
                let idx = (y * self.width) + x;
                if self.is_continuation(idx) {
                    continue;
                }
                f.write_char(self.render_at(x, y, idx))?;
            }

            if y + 1 < self.height {
                f.write_char('\n')?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas area overflow: {width}*{height}")]
    AreaOverflow { width: usize, height: usize },
    #[error("out of bounds: ({x},{y}) for {width}x{height} canvas")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
}
