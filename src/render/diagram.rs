// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Compositing a [`Layout`] into text, plus the paging helper on top of it.

use crate::layout::{layout_scene, CharPoint, Layout};
use crate::model::{StructuralError, TreeSnapshot};

use super::text::{chunk_chars, normalize_style, text_width};
use super::{Canvas, CanvasError, GlyphSet};

/// Fallback page height when the caller does not know the terminal size.
pub const DEFAULT_PAGE_HEIGHT: usize = 22;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// Options for [`crate::Diagram::render_subtree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeOptions {
    /// Levels below the subtree root to include. `None` keeps the whole subtree.
    pub depth: Option<usize>,
    pub include_markup: bool,
}

/// Options for [`crate::Diagram::render_paginated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub page_height: usize,
    /// Lines longer than this are split into several lines before paging.
    pub page_width: Option<usize>,
    /// Lines repeated at the top of the next page. Clamped below `page_height`.
    pub overlap: usize,
    pub include_markup: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_height: DEFAULT_PAGE_HEIGHT,
            page_width: None,
            overlap: 0,
            include_markup: false,
        }
    }
}

pub(crate) fn render_snapshot(
    snapshot: &TreeSnapshot<'_>,
    include_markup: bool,
) -> Result<String, RenderError> {
    let layout = layout_scene(snapshot);
    render_layout(snapshot, &layout, include_markup)
}

/// Draws `layout` onto a fresh canvas sized to everything it contains.
///
/// Paint order is connector lines, arrowheads, labels, then boxes, so a box is never painted over.
pub fn render_layout(
    snapshot: &TreeSnapshot<'_>,
    layout: &Layout,
    include_markup: bool,
) -> Result<String, RenderError> {
    let config = snapshot.config();
    let extent = Extent::of(layout);
    let mut canvas = Canvas::new(extent.width(), extent.height())?
        .with_glyphs(GlyphSet::for_style(config.box_style));

    for edge in layout.edges() {
        canvas.set_style(normalize_style(edge.style()));
        for segment in edge.points().windows(2) {
            let (a, b) = (extent.local(segment[0]), extent.local(segment[1]));
            if a.1 == b.1 {
                canvas.draw_hline(a.0, b.0, a.1)?;
            } else {
                canvas.draw_vline(a.0, a.1, b.1)?;
            }
        }
    }

    for edge in layout.edges() {
        canvas.set_style(normalize_style(edge.style()));
        let glyphs = *canvas.glyphs();
        if let Some(heading) = edge.start_arrow() {
            let (x, y) = extent.local(edge.start());
            canvas.set(x, y, glyphs.arrow(heading))?;
        }
        let (x, y) = extent.local(edge.end());
        canvas.set(x, y, glyphs.arrow(edge.arrow()))?;
    }

    for edge in layout.edges() {
        if let Some(label) = edge.label() {
            canvas.set_style(normalize_style(edge.style()));
            let (x, y) = extent.local(label.at);
            canvas.write_str(x, y, &label.text)?;
        }
    }

    for &id in snapshot.nodes() {
        let (Some(geometry), Some(text_box)) = (layout.geometry().get(id), layout.text_box(id))
        else {
            continue;
        };
        let node = snapshot.node(id);
        canvas.set_style(normalize_style(node.style().or(config.node_style.as_deref())));

        let (x0, y0) = extent.local(CharPoint::new(geometry.x, geometry.y));
        let (x1, y1) = extent.local(CharPoint::new(geometry.right(), geometry.bottom()));
        if x1 > x0 + 1 && y1 > y0 + 1 {
            canvas.fill_rect(x0 + 1, y0 + 1, x1 - 1, y1 - 1, ' ')?;
        }
        canvas.draw_box(x0, y0, x1, y1)?;
        if let Some(title) = text_box.title() {
            canvas.write_str(x0 + 2, y0, title)?;
        }
        for (row, line) in text_box.lines().iter().enumerate() {
            canvas.write_str(x0 + 2, y0 + 1 + row, line)?;
        }
    }
    canvas.set_style(None);

    tracing::trace!(
        width = canvas.width(),
        height = canvas.height(),
        nodes = snapshot.len(),
        edges = layout.edges().len(),
        "rendered canvas"
    );

    Ok(if include_markup {
        canvas.to_markup()
    } else {
        canvas.to_string()
    })
}

/// Bounding box of boxes, connector cells and labels, in layout coordinates.
#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Extent {
    fn of(layout: &Layout) -> Self {
        let mut extent = Self { min_x: 0, min_y: 0, max_x: 0, max_y: 0 };
        for geometry in layout.geometry().boxes().values() {
            extent.include(CharPoint::new(geometry.x, geometry.y));
            extent.include(CharPoint::new(geometry.right(), geometry.bottom()));
        }
        for edge in layout.edges() {
            for point in edge.points() {
                extent.include(*point);
            }
            if let Some(label) = edge.label() {
                let len = i32::try_from(text_width(&label.text)).unwrap_or(i32::MAX);
                extent.include(label.at);
                extent.include(label.at.offset(len.saturating_sub(1).max(0), 0));
            }
        }
        extent
    }

    fn include(&mut self, p: CharPoint) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    fn width(&self) -> usize {
        usize::try_from(self.max_x - self.min_x + 1).unwrap_or(0)
    }

    fn height(&self) -> usize {
        usize::try_from(self.max_y - self.min_y + 1).unwrap_or(0)
    }

    /// Translates to canvas coordinates; every included point maps to a non-negative cell.
    fn local(&self, p: CharPoint) -> (usize, usize) {
        let x = usize::try_from(p.x - self.min_x).unwrap_or(0);
        let y = usize::try_from(p.y - self.min_y).unwrap_or(0);
        (x, y)
    }
}

/// Splits rendered text into pages of at most `page_height` lines.
///
/// Consecutive pages share `overlap` lines. Empty input yields a single empty page.
pub fn paginate(text: &str, options: &PageOptions) -> Vec<String> {
    let lines: Vec<String> = text
        .split('\n')
        .flat_map(|line| chunk_chars(line, options.page_width.unwrap_or(0)))
        .collect();
    if text.is_empty() {
        return vec![String::new()];
    }

    let height = options.page_height.max(1);
    let overlap = options.overlap.min(height - 1);
    let step = (height - overlap).max(1);

    let mut pages = Vec::new();
    let mut start = 0usize;
    while start < lines.len() {
        let end = (start + height).min(lines.len());
        pages.push(lines[start..end].join("\n"));
        if end == lines.len() {
            break;
        }
        start += step;
    }
    pages
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{paginate, PageOptions, SubtreeOptions};
    use crate::config::{BoxStyle, DiagramConfig};
    use crate::model::{ConnectOptions, Diagram, NodeOptions, StructuralError};
    use crate::render::RenderError;

    fn ascii() -> DiagramConfig {
        DiagramConfig { box_style: BoxStyle::Ascii, ..DiagramConfig::default() }
    }

    #[test]
    fn renders_single_root_box() {
        let diagram = Diagram::with_config("Root", ascii()).expect("diagram");
        let out = diagram.render(false).expect("render");
        assert_eq!(out, "+------+\n| Root |\n+------+");
    }

    #[test]
    fn renders_title_on_top_border() {
        let mut diagram = Diagram::with_config("body", ascii()).expect("diagram");
        let root = diagram.root();
        diagram.set_title(root, Some("T".to_owned())).expect("title");
        let out = diagram.render(false).expect("render");
        assert_eq!(out, "+-T----+\n| body |\n+------+");
    }

    #[test]
    fn renders_child_with_arrow_into_it() {
        let mut diagram = Diagram::with_config("a", ascii()).expect("diagram");
        let root = diagram.root();
        diagram.add_right(root, "b").expect("child");
        let out = diagram.render(false).expect("render");

        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].contains('>'), "{out}");
        assert!(rows[1].starts_with("| a |"), "{out}");
        assert!(rows[1].ends_with("| b |"), "{out}");
    }

    #[test]
    fn all_rows_share_the_canvas_width() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_bottom(root, "a fairly long child text").expect("a");
        diagram.add_right(a, "x").expect("x");
        diagram.add_left(root, "y").expect("y");
        let out = diagram.render(false).expect("render");

        let widths: Vec<usize> = out.lines().map(|line| line.chars().count()).collect();
        assert!(widths.windows(2).all(|pair| pair[0] == pair[1]), "{widths:?}");
    }

    #[test]
    fn markup_wraps_styled_nodes_and_connectors() {
        let config = DiagramConfig {
            connector_style: Some("dim".to_owned()),
            ..ascii()
        };
        let mut diagram = Diagram::with_config("a", config).expect("diagram");
        let root = diagram.root();
        let options = NodeOptions { style: Some("bold red".into()), ..NodeOptions::default() };
        diagram.add_right_with(root, "b", options).expect("child");

        let plain = diagram.render(false).expect("render");
        let markup = diagram.render(true).expect("render");
        assert!(!plain.contains('['));
        assert!(markup.contains("[bold red]+---+[/]"), "{markup}");
        assert!(markup.contains("[dim]"), "{markup}");
    }

    #[test]
    fn connection_labels_are_rendered_beside_the_line() {
        let mut diagram = Diagram::with_config("r", ascii()).expect("diagram");
        let root = diagram.root();
        let a = diagram.add_right(root, "a").expect("a");
        let b = diagram.add_bottom(root, "b").expect("b");
        diagram
            .connect(a, b, ConnectOptions { label: Some("go".to_owned()), ..Default::default() })
            .expect("connect");

        let out = diagram.render(false).expect("render");
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(&rows[5][8..10], "go", "{out}");
        assert!(rows[6].starts_with("| b |<-----+"), "{out}");
    }

    #[test]
    fn multi_line_labels_do_not_split_canvas_rows() {
        let mut diagram = Diagram::with_config("r", ascii()).expect("diagram");
        let root = diagram.root();
        let a = diagram.add_right(root, "a").expect("a");
        let b = diagram.add_bottom(root, "b").expect("b");
        diagram.connect(a, b, ConnectOptions::labeled("x\ny")).expect("connect");

        let out = diagram.render(false).expect("render");
        let widths: Vec<usize> = out.lines().map(|row| row.chars().count()).collect();
        assert!(widths.windows(2).all(|pair| pair[0] == pair[1]), "{out}");
        assert_eq!(out.lines().count(), 8, "{out}");
        assert!(out.contains("x y"), "{out}");
    }

    #[test]
    fn wide_glyphs_keep_box_borders_aligned() {
        let mut diagram = Diagram::with_config("漢字", ascii()).expect("diagram");
        let root = diagram.root();
        diagram.add_bottom(root, "ok").expect("child");

        let out = diagram.render(false).expect("render");
        let rows: Vec<&str> = out.lines().collect();
        assert_eq!(rows[0], "+------+", "{out}");
        assert_eq!(rows[1], "| 漢字 |", "{out}");
        assert_eq!(rows[2], "+------+", "{out}");
    }

    #[test]
    fn render_subtree_scopes_and_limits_depth() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let mid = diagram.add_right(root, "mid").expect("mid");
        diagram.add_right(mid, "leaf").expect("leaf");

        let full = diagram.render_subtree(mid, SubtreeOptions::default()).expect("subtree");
        assert!(full.contains("mid") && full.contains("leaf") && !full.contains("root"));

        let cut = diagram
            .render_subtree(mid, SubtreeOptions { depth: Some(0), include_markup: false })
            .expect("subtree");
        assert!(cut.contains("mid") && !cut.contains("leaf"));
    }

    #[test]
    fn render_subtree_rejects_unknown_nodes() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let gone = diagram.add_right(root, "gone").expect("child");
        diagram.detach(gone).expect("detach");

        let err = diagram.render_subtree(gone, SubtreeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Structural(StructuralError::UnknownNode { node }) if node == gone
        ));
    }

    #[test]
    fn paginate_splits_by_height() {
        let text = "1\n2\n3\n4\n5";
        let pages = paginate(text, &PageOptions { page_height: 2, ..PageOptions::default() });
        assert_eq!(pages, vec!["1\n2", "3\n4", "5"]);
    }

    #[rstest]
    #[case(1, vec!["1\n2\n3", "3\n4\n5"])]
    #[case(5, vec!["1\n2\n3", "2\n3\n4", "3\n4\n5"])]
    fn paginate_overlaps_pages(#[case] overlap: usize, #[case] expected: Vec<&str>) {
        let options = PageOptions { page_height: 3, overlap, ..PageOptions::default() };
        assert_eq!(paginate("1\n2\n3\n4\n5", &options), expected);
    }

    #[test]
    fn paginate_wraps_wide_lines_and_handles_empty_input() {
        let options = PageOptions { page_height: 2, page_width: Some(3), ..PageOptions::default() };
        assert_eq!(paginate("abcdefg", &options), vec!["abc\ndef", "g"]);
        assert_eq!(paginate("", &PageOptions::default()), vec![String::new()]);
    }

    #[test]
    fn render_paginated_covers_every_line() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let mut parent = root;
        for i in 0..4 {
            parent = diagram.add_bottom(parent, format!("n{i}")).expect("child");
        }
        let full = diagram.render(false).expect("render");
        let pages = diagram
            .render_paginated(PageOptions { page_height: 5, ..PageOptions::default() })
            .expect("pages");

        assert!(pages.len() > 1);
        assert_eq!(pages.join("\n"), full);
    }
}
