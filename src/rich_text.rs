//! Inline rich text to HTML.

use crate::blocks::TextRun;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Render text runs in order. Linked runs become anchors; all text is escaped.
pub fn format(runs: &[TextRun]) -> String {
    let mut html = String::new();
    for run in runs {
        match &run.href {
            Some(href) => {
                html.push_str("<a href=\"");
                html.push_str(&encode_double_quoted_attribute(href));
                html.push_str("\">");
                html.push_str(&encode_text(&run.text));
                html.push_str("</a>");
            }
            None => html.push_str(&encode_text(&run.text)),
        }
    }
    html
}
