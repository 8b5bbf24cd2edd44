//! Plain-text bar charts for Markdown reports.

/// Render a horizontal bar of `value` scaled against `max`.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    let len = if max > 0.0 {
        ((value / max) * width as f64).round() as usize
    } else {
        0
    };
    "█".repeat(len.min(width))
}

/// Render a stacked bar from `(glyph, fraction)` segments.
///
/// Segment boundaries are rounded on the running total so the filled
/// length never drifts from the overall sum. Unfilled width is padded
/// with spaces, so every bar is exactly `width` characters.
pub fn stacked_bar(segments: &[(char, f64)], width: usize) -> String {
    let mut out = String::with_capacity(width * 3);
    let mut running = 0.0;
    let mut drawn = 0usize;

    for &(glyph, fraction) in segments {
        running += fraction.clamp(0.0, 1.0);
        let end = ((running * width as f64).round() as usize).min(width);
        if end > drawn {
            out.extend(std::iter::repeat(glyph).take(end - drawn));
            drawn = end;
        }
    }

    out.extend(std::iter::repeat(' ').take(width - drawn));
    out
}
