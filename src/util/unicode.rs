//! Terminal-cell text helpers for labels and the line editor.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: &str = "\u{2026}";

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_cells` cells, ending in `…` when shortened.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in s.graphemes(true) {
        let w = display_width(g);
        if used + w > max_cells - 1 {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Greedy word wrap into at most `max_lines` lines of `width` cells. The
/// last line is truncated with `…` when text remains.
pub fn wrap_to_width(s: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let words: Vec<&str> = s.split_whitespace().collect();

    for (i, word) in words.iter().enumerate() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if display_width(&candidate) <= width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if lines.len() == max_lines {
            break;
        }
        if lines.len() + 1 == max_lines {
            // last line gets whatever is left
            let rest = words[i..].join(" ");
            lines.push(truncate_to_width(&rest, width));
            return lines;
        }
        current = truncate_to_width(word, width);
    }
    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

/// Byte offset of the grapheme boundary after `at`, if any
pub fn next_grapheme_boundary(s: &str, at: usize) -> Option<usize> {
    let g = s.get(at..)?.graphemes(true).next()?;
    Some(at + g.len())
}

/// Byte offset of the grapheme boundary before `at`, if any
pub fn prev_grapheme_boundary(s: &str, at: usize) -> Option<usize> {
    let g = s.get(..at)?.graphemes(true).next_back()?;
    Some(at - g.len())
}

/// Cells occupied by `s[..at]`
pub fn cursor_column(s: &str, at: usize) -> usize {
    s.get(..at).map_or_else(|| display_width(s), display_width)
}
