// ABOUTME: Text helpers for detail-page cells: whitespace normalisation and per-text-node segmentation.
// ABOUTME: A segment is one trimmed, non-empty text node, so `<br>`-separated lines become separate entries.

use scraper::ElementRef;

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits an element's rendered text into segments.
///
/// Every descendant text node is trimmed; empty nodes are dropped. Line
/// breaks (`<br>`) and inline element boundaries both start a new segment,
/// while whitespace inside a single text node is kept as-is.
pub fn text_segments(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
