// ABOUTME: DOM traversal helpers for walking scraper's HTML tree.
// ABOUTME: Provides text segmentation and whitespace normalisation used by the section extractors.

//! DOM utilities for the detail page.
//!
//! The detail page is a nest of layout tables, so the helpers here work on
//! `scraper::ElementRef` values and descend through every level rather than
//! only looking at direct children.

pub mod text;

pub use text::{normalize_whitespace, text_segments};
