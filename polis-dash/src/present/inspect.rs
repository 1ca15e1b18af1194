//! Collapsible inspection panel: statement metadata preview and a raw dump
//! of the label hierarchy.

use std::fmt::Write;

use super::escape_html;
use crate::dataset::AnalysedDataset;

/// Rows shown in the metadata preview
pub const PREVIEW_ROWS: usize = 50;

pub fn render_inspection(analysed: &AnalysedDataset) -> String {
    let mut html = String::from("<details class=\"inspect\">\n<summary>Inspect derived variables</summary>\n");

    html.push_str("<p><code>statements</code></p>\n<table>\n<thead><tr>");
    for column in ["id", "content", "moderation", "agrees", "disagrees", "top group", "x", "y"] {
        let _ = write!(html, "<th>{}</th>", column);
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (i, statement) in analysed.dataset.statements.iter().take(PREVIEW_ROWS).enumerate() {
        let moderation = analysed
            .moderation
            .get(i)
            .map(|m| m.as_str())
            .unwrap_or("");
        let top_group = analysed
            .label_layers
            .top_group(i)
            .map(|g| g.to_string())
            .unwrap_or_default();
        let [x, y] = analysed.embedding.get(i).copied().unwrap_or([f64::NAN, f64::NAN]);

        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td><td>{:.4}</td></tr>",
            statement.id,
            escape_html(&statement.content),
            moderation,
            statement.agrees,
            statement.disagrees,
            top_group,
            x,
            y
        );
    }
    html.push_str("</tbody>\n</table>\n");

    let dump = serde_json::to_string_pretty(&analysed.label_layers)
        .unwrap_or_else(|e| format!("<unavailable: {}>", e));
    let _ = write!(
        html,
        "<p><code>label_layers</code> ({} layers, finest first)</p>\n<pre>{}</pre>\n</details>\n",
        analysed.label_layers.len(),
        escape_html(&dump)
    );

    html
}
