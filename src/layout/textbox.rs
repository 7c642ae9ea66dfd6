// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::config::BOX_HORIZONTAL_CHROME;
use crate::render::text::{char_width, sanitize, text_width, truncate_with_ellipsis};

/// Border rows above and below the content.
pub const BOX_VERTICAL_CHROME: usize = 2;

/// Splits `text` into display lines of at most `width` cells.
///
/// `\n` is a hard break (a trailing `\r` is dropped). Longer lines are cut once the next
/// character would pass `width`, mid-word if needed. Wide glyphs count two cells; one that is
/// wider than `width` on its own gets a line to itself. Other control characters become spaces.
/// Empty input yields one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let mut current = String::new();
        let mut used = 0usize;
        for ch in raw.chars() {
            let ch = if ch.is_control() { ' ' } else { ch };
            let ch_width = char_width(ch);
            if used > 0 && used + ch_width > width {
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            current.push(ch);
            used += ch_width;
        }
        lines.push(current);
    }

    lines
}

/// A node's text prepared for drawing: wrapped lines, clamped title, and outer box size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    lines: Vec<String>,
    title: Option<String>,
    content_width: usize,
}

impl TextBox {
    pub fn new(text: &str, title: Option<&str>, wrap_width: usize) -> Self {
        let lines = wrap_text(text, wrap_width);
        let title = title
            .map(|title| truncate_with_ellipsis(sanitize(title).trim(), wrap_width.max(1)))
            .filter(|title| !title.is_empty());

        let widest_line = lines.iter().map(|line| text_width(line)).max().unwrap_or(0);
        let title_width = title.as_deref().map(text_width).unwrap_or(0);
        let content_width = widest_line.max(title_width);

        Self { lines, title, content_width }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn content_width(&self) -> usize {
        self.content_width
    }

    pub fn content_height(&self) -> usize {
        self.lines.len()
    }

    /// Outer width including border and horizontal padding.
    pub fn width(&self) -> usize {
        self.content_width + BOX_HORIZONTAL_CHROME
    }

    /// Outer height including the top and bottom border. The title rides on the top border.
    pub fn height(&self) -> usize {
        self.content_height() + BOX_VERTICAL_CHROME
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{wrap_text, TextBox};

    #[rstest]
    #[case("", 10, &[""])]
    #[case("Server", 10, &["Server"])]
    #[case("Layanan 1", 10, &["Layanan 1"])]
    #[case("abcdefghijkl", 5, &["abcde", "fghij", "kl"])]
    #[case("abcde", 5, &["abcde"])]
    #[case("one\ntwo", 10, &["one", "two"])]
    #[case("a\n\nb", 10, &["a", "", "b"])]
    #[case("ab\r\ncd", 10, &["ab", "cd"])]
    #[case("tab\there", 10, &["tab here"])]
    fn wraps_text(#[case] text: &str, #[case] width: usize, #[case] expected: &[&str]) {
        assert_eq!(wrap_text(text, width), expected);
    }

    #[test]
    fn wraps_by_chars_not_bytes() {
        assert_eq!(wrap_text("αβγδ", 3), vec!["αβγ", "δ"]);
    }

    #[test]
    fn wide_glyphs_count_two_cells() {
        assert_eq!(wrap_text("漢字漢字漢字", 5), vec!["漢字", "漢字", "漢字"]);
        assert_eq!(wrap_text("a漢", 2), vec!["a", "漢"]);
        assert_eq!(wrap_text("漢", 1), vec!["漢"]);

        let text_box = TextBox::new("漢字", None, 10);
        assert_eq!(text_box.content_width(), 4);
        assert_eq!(text_box.width(), 8);

        let narrow = TextBox::new("漢", None, 1);
        assert_eq!(narrow.content_width(), 2);
    }

    #[test]
    fn titled_box_keeps_two_border_rows() {
        let titled = TextBox::new("one\ntwo", Some("T"), 10);
        let plain = TextBox::new("one\ntwo", None, 10);
        assert_eq!(titled.height(), 2 + 2);
        assert_eq!(titled.height(), plain.height());
    }

    #[test]
    fn box_size_adds_border_and_padding() {
        let text_box = TextBox::new("Server", None, 10);
        assert_eq!(text_box.content_width(), 6);
        assert_eq!(text_box.width(), 10);
        assert_eq!(text_box.height(), 3);

        let empty = TextBox::new("", None, 10);
        assert_eq!(empty.lines(), &[String::new()]);
        assert_eq!(empty.width(), 4);
        assert_eq!(empty.height(), 3);
    }

    #[test]
    fn title_widens_box_up_to_wrap_width() {
        let text_box = TextBox::new("ok", Some("Status"), 10);
        assert_eq!(text_box.title(), Some("Status"));
        assert_eq!(text_box.content_width(), 6);

        let clamped = TextBox::new("ok", Some("A very long title"), 10);
        assert_eq!(clamped.title(), Some("A very lo…"));
        assert_eq!(clamped.content_width(), 10);

        let blank = TextBox::new("ok", Some("   "), 10);
        assert_eq!(blank.title(), None);

        let broken = TextBox::new("ok", Some("a\nb"), 10);
        assert_eq!(broken.title(), Some("a b"));
    }
}
