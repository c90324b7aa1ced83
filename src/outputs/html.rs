//! HTML alternative of the digest body for mail clients that prefer it.
//!
//! Summary lines starting with `- ` or `* ` become list items; any other line
//! becomes a paragraph. All feed- and model-supplied text is escaped.

use crate::models::DigestItem;
use chrono::NaiveDate;
use std::fmt::Write;

/// Escape text for use in HTML element content and quoted attributes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(escape("R&D <\"lab\">"), "R&amp;D &lt;&quot;lab&quot;&gt;");
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn render_summary(out: &mut String, summary: &str) {
    let mut in_list = false;
    for line in summary.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match bullet(line) {
            Some(text) => {
                if !in_list {
                    out.push_str("<ul>\n");
                    in_list = true;
                }
                let _ = writeln!(out, "<li>{}</li>", escape(text.trim()));
            }
            None => {
                if in_list {
                    out.push_str("</ul>\n");
                    in_list = false;
                }
                let _ = writeln!(out, "<p>{}</p>", escape(line));
            }
        }
    }
    if in_list {
        out.push_str("</ul>\n");
    }
}

/// Render the digest as a standalone HTML document.
pub fn render_body(items: &[DigestItem], title: &str, date: NaiveDate) -> String {
    let heading = format!("{} - {}", title, date.format("%B %d, %Y"));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{0}</title></head>\n<body>\n<h1>{0}</h1>",
        escape(&heading)
    );
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "<h2>{}. {}</h2>", i + 1, escape(&item.title));
        let _ = writeln!(
            out,
            "<p><a href=\"{}\">Read full article</a></p>",
            escape(&item.url)
        );
        render_summary(&mut out, &item.summary);
    }
    out.push_str("</body>\n</html>\n");
    out
}
