use ratatui::text::Span;

use crate::util::unicode;

/// Completion marker shown before titles
pub(super) fn check_marker(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Pad `spans` with `fill` so `right` ends at column `width`. `right` is
/// dropped when it does not fit.
pub(super) fn push_right_aligned<'a>(
    spans: &mut Vec<Span<'a>>,
    right: Span<'a>,
    width: usize,
    fill: ratatui::style::Style,
) {
    let used = spans_width(spans);
    let right_width = unicode::display_width(&right.content);
    if used + right_width < width {
        spans.push(Span::styled(" ".repeat(width - used - right_width), fill));
        spans.push(right);
    }
}
