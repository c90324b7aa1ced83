//! Plain-text digest body and subject line.
//!
//! ```text
//! India Daily Digest - October 17, 2026
//! ----------------------------------------
//!
//! 1. Budget announced
//! Link: https://thehindu.com/a
//! Summary:
//! The Finance Minister presented the budget.
//! - Income tax slabs were revised.
//!
//! ```

use crate::models::DigestItem;
use chrono::NaiveDate;

const SEPARATOR_WIDTH: usize = 40;

/// Render the digest body. Pure: the same items, title and date give the same text.
///
/// # Arguments
///
/// * `items` - Accepted items in digest order; numbering starts at 1.
/// * `title` - Digest title, e.g. `"India Daily Digest"`.
/// * `date` - Local date shown in the header as `October 17, 2026`.
///
/// # Returns
///
/// The lines joined with `\n`. An empty `items` slice still yields the header.
pub fn render_body(items: &[DigestItem], title: &str, date: NaiveDate) -> String {
    let mut lines = vec![
        format!("{title} - {}", date.format("%B %d, %Y")),
        "-".repeat(SEPARATOR_WIDTH),
        String::new(),
    ];
    for (i, item) in items.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, item.title));
        lines.push(format!("Link: {}", item.url));
        lines.push("Summary:".to_string());
        lines.push(item.summary.clone());
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Build the mail subject line.
///
/// # Examples
///
/// ```ignore
/// let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
/// assert_eq!(
///     render_subject(5, "India Daily Digest", date),
///     "India Daily Digest: Top 5 - 2026-10-17"
/// );
/// ```
pub fn render_subject(item_count: usize, title: &str, date: NaiveDate) -> String {
    format!("{title}: Top {item_count} - {}", date.format("%Y-%m-%d"))
}
