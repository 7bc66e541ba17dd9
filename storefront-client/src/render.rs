// storefront-client/src/render.rs
use serde_json::Value;
use storefront_common::rating::{MAX_RATING, MIN_RATING};
use storefront_common::{CallToolResult, ContentItem, RatingSummary};

const BAR_WIDTH: usize = 20;

/// Render a rating summary as a star histogram, five stars first.
pub fn render_histogram(summary: &RatingSummary) -> String {
    let mut out = format!(
        "{} review{}, average {:.1}\n",
        summary.total_reviews,
        if summary.total_reviews == 1 { "" } else { "s" },
        summary.average_rating
    );

    let max = summary.rating_breakdown.values().copied().max().unwrap_or(0);
    for stars in (MIN_RATING..=MAX_RATING).rev() {
        let count = summary.rating_breakdown.get(&stars).copied().unwrap_or(0);
        let filled = if max == 0 { 0 } else { (count * BAR_WIDTH).div_ceil(max) };
        out.push_str(&format!(
            "{} star |{}{}| {}\n",
            stars,
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH - filled),
            count
        ));
    }
    out
}

/// Text items are pretty-printed when they hold JSON.
pub fn render_tool_result(result: &CallToolResult) -> String {
    let mut out = String::new();
    if result.is_error {
        out.push_str("ERROR\n");
    }
    for item in &result.content {
        let ContentItem::Text { text } = item;
        match serde_json::from_str::<Value>(text) {
            Ok(json) => out.push_str(&serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.clone())),
            Err(_) => out.push_str(text),
        }
        out.push('\n');
    }
    out
}
