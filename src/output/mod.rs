//! Output formatting for CLI display
//!
//! This module provides utilities for formatting output in the CLI:
//! item lines, page summaries and byte sizes.

use crate::source::ImageItem;
use byte_unit::{Byte, UnitType};
use colored::Colorize;

/// Human readable file size
#[must_use]
pub fn format_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

/// Format an item for display
///
/// Quiet mode prints only the id so the output can be piped.
#[must_use]
pub fn item_line(item: &ImageItem, selected: bool, quiet: bool) -> String {
    if quiet {
        return item.id.clone();
    }

    let marker = if selected { "*".green().to_string() } else { " ".to_string() };
    let mut line = format!(
        "{marker} {}  {}x{}  {}",
        item.id.bold(),
        item.width,
        item.height,
        format_size(item.file_size)
    );
    if !item.name.is_empty() {
        line.push_str(&format!("  {}", item.name.dimmed()));
    }
    if !item.tags.is_empty() {
        line.push_str(&format!("  [{}]", item.tags.join(", ").cyan()));
    }
    line
}

/// One-line summary of what is loaded
#[must_use]
pub fn summary(shown: usize, total: Option<u64>, pages: usize, has_more: bool) -> String {
    let total = total.map_or_else(|| "?".to_string(), |t| t.to_string());
    let pages_word = if pages == 1 { "page" } else { "pages" };
    let mut line = format!("Showing {shown} of {total} image(s) ({pages} {pages_word} loaded)");
    if has_more {
        line.push_str(", more available");
    }
    line
}

/// Selection count line
#[must_use]
pub fn selection_summary(selected: usize) -> String {
    format!("{selected} image(s) selected")
}
