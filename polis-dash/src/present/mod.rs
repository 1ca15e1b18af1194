//! Presentation layer
//!
//! Turns an [`AnalysedDataset`] into HTML fragments for the dashboard page:
//! the statement map (interactive, static, or placeholder image, depending
//! on the configured [`PlotBackend`]) and the inspection panel.

use base64::Engine;
use polis_common::config::PlotBackend;

use crate::dataset::AnalysedDataset;

pub mod inspect;
pub mod interactive;
pub mod labels;
pub mod static_plot;

pub use inspect::render_inspection;
pub use interactive::{render_interactive, InteractiveOptions};
pub use labels::humanize_layers;
pub use static_plot::render_static;

/// Outer iframe height for the interactive map
pub const EMBED_HEIGHT: u32 = 620;

/// HTML fragments produced for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub backend: PlotBackend,
    pub plot_html: String,
    pub inspection_html: String,
}

/// Renders analysed datasets with the configured backend
#[derive(Debug, Clone)]
pub struct Presenter {
    backend: PlotBackend,
    placeholder_image_url: String,
}

impl Presenter {
    pub fn new(backend: PlotBackend, placeholder_image_url: impl Into<String>) -> Self {
        Self {
            backend,
            placeholder_image_url: placeholder_image_url.into(),
        }
    }

    pub fn backend(&self) -> PlotBackend {
        self.backend
    }

    pub fn render(&self, analysed: &AnalysedDataset) -> RenderedOutput {
        let plot_html = match self.backend {
            PlotBackend::Interactive => {
                let options = InteractiveOptions::for_report(analysed.statement_count());
                let document = render_interactive(analysed, &options);
                format!(
                    r#"<iframe class="statement-map" srcdoc="{}" height="{}" style="width:100%;border:0" scrolling="yes"></iframe>"#,
                    escape_html(&document),
                    EMBED_HEIGHT
                )
            }
            PlotBackend::Static => {
                let svg = render_static(analysed);
                let encoded = base64::engine::general_purpose::STANDARD.encode(svg.as_bytes());
                format!(
                    r#"<img class="statement-map" src="data:image/svg+xml;base64,{}" style="width:100%" alt="Statement map">"#,
                    encoded
                )
            }
            PlotBackend::Placeholder => format!(
                r#"<img class="statement-map" src="{}" style="width:100%" alt="Example statement map">"#,
                escape_html(&self.placeholder_image_url)
            ),
        };

        RenderedOutput {
            backend: self.backend,
            plot_html,
            inspection_html: render_inspection(analysed),
        }
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
