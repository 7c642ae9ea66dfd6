// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nodegram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use unicode_width::UnicodeWidthChar;

pub(crate) const CLOSE_TAG: &str = "[/]";

/// Canvas cells taken by `ch`. Wide glyphs take two; zero-width and control characters still
/// take one so that every character stays visible and addressable.
pub(crate) fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0).max(1)
}

pub(crate) fn text_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Replaces control characters with spaces, so the text stays on one canvas row.
pub(crate) fn sanitize(text: &str) -> String {
    text.chars().map(|ch| if ch.is_control() { ' ' } else { ch }).collect()
}

/// Cuts `text` to at most `max_width` cells, marking the cut with `…`.
pub(crate) fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    if text_width(text) <= max_width {
        return text.to_owned();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let width = char_width(ch);
        if used + width > max_width - 1 {
            break;
        }
        out.push(ch);
        used += width;
    }
    out.push('…');
    out
}

/// Opening tag for a style: tags already in brackets are used verbatim, bare names get wrapped.
pub(crate) fn open_tag(style: &str) -> String {
    if style.starts_with('[') {
        style.to_owned()
    } else {
        format!("[{style}]")
    }
}

/// Trims a style tag; blank tags mean "no style".
pub(crate) fn normalize_style(style: Option<&str>) -> Option<&str> {
    style.map(str::trim).filter(|style| !style.is_empty())
}

/// Splits `line` into pieces at most `width` cells wide. A zero width leaves it whole.
///
/// A wide glyph that does not fit into a one-cell piece gets a piece of its own.
pub(crate) fn chunk_chars(line: &str, width: usize) -> Vec<String> {
    if width == 0 || text_width(line) <= width {
        return vec![line.to_owned()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut used = 0usize;
    for ch in line.chars() {
        let ch_width = char_width(ch);
        if used > 0 && used + ch_width > width {
            out.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(ch);
        used += ch_width;
    }
    out.push(current);
    out
}

#[cfg(test)]
mod tests {
    use super::{
        char_width, chunk_chars, normalize_style, open_tag, sanitize, text_width,
        truncate_with_ellipsis,
    };

    #[test]
    fn truncate_with_ellipsis_handles_small_widths() {
        assert_eq!(truncate_with_ellipsis("hello", 0), "");
        assert_eq!(truncate_with_ellipsis("hello", 1), "…");
        assert_eq!(truncate_with_ellipsis("h", 1), "h");
        assert_eq!(truncate_with_ellipsis("hello", 2), "h…");
    }

    #[test]
    fn truncate_with_ellipsis_counts_cells_not_bytes() {
        assert_eq!(text_width("αβγ"), 3);
        assert_eq!(truncate_with_ellipsis("αβγ", 2), "α…");
        assert_eq!(text_width("漢字"), 4);
        assert_eq!(truncate_with_ellipsis("漢字漢", 4), "漢…");
        assert_eq!(truncate_with_ellipsis("漢字漢", 5), "漢字…");
    }

    #[test]
    fn every_char_takes_at_least_one_cell() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('漢'), 2);
        assert_eq!(char_width('\u{301}'), 1);
        assert_eq!(char_width('\n'), 1);
    }

    #[test]
    fn sanitize_keeps_text_on_one_row() {
        assert_eq!(sanitize("x\ny"), "x y");
        assert_eq!(sanitize("a\tb\r"), "a b ");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn style_tags() {
        assert_eq!(open_tag("red"), "[red]");
        assert_eq!(open_tag("[bold red]"), "[bold red]");
        assert_eq!(normalize_style(Some("  green ")), Some("green"));
        assert_eq!(normalize_style(Some("   ")), None);
        assert_eq!(normalize_style(None), None);
    }

    #[test]
    fn chunk_chars_splits_long_lines() {
        assert_eq!(chunk_chars("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(chunk_chars("abc", 3), vec!["abc"]);
        assert_eq!(chunk_chars("", 3), vec![""]);
        assert_eq!(chunk_chars("abc", 0), vec!["abc"]);
        assert_eq!(chunk_chars("漢字a", 3), vec!["漢", "字a"]);
    }
}
