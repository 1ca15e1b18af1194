//! Static statement scatter (SVG)
//!
//! Points are colored by the combined "top group / moderation" category,
//! with a legend on the right.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::escape_html;
use crate::dataset::AnalysedDataset;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 600.0;
const PLOT_WIDTH: f64 = 700.0;
const MARGIN: f64 = 30.0;
const POINT_RADIUS: f64 = 5.0;

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Render the scatter as an SVG document
pub fn render_static(analysed: &AnalysedDataset) -> String {
    let n = analysed.statement_count().min(analysed.embedding.len());
    let categories: Vec<String> = (0..n).map(|i| analysed.color_category(i)).collect();

    // Sorted so legend order and colors are stable
    let palette: BTreeMap<&str, &str> = {
        let mut unique: Vec<&str> = categories.iter().map(String::as_str).collect();
        unique.sort_unstable();
        unique.dedup();
        unique
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c, PALETTE[i % PALETTE.len()]))
            .collect()
    };

    let (min_x, max_x, min_y, max_y) = analysed.embedding.iter().take(n).fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(a, b, c, d), [x, y]| (a.min(*x), b.max(*x), c.min(*y), d.max(*y)),
    );
    let span_x = if max_x > min_x { max_x - min_x } else { 1.0 };
    let span_y = if max_y > min_y { max_y - min_y } else { 1.0 };
    let sx = |x: f64| MARGIN + (x - min_x) / span_x * (PLOT_WIDTH - 2.0 * MARGIN);
    let sy = |y: f64| HEIGHT - MARGIN - (y - min_y) / span_y * (HEIGHT - 2.0 * MARGIN);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(svg, r#"<rect width="{}" height="{}" fill="white"/>"#, WIDTH, HEIGHT);
    let _ = write!(
        svg,
        "<rect x=\"{m}\" y=\"{m}\" width=\"{pw}\" height=\"{ph}\" fill=\"none\" stroke=\"#ddd\"/>",
        m = MARGIN / 2.0,
        pw = PLOT_WIDTH - MARGIN,
        ph = HEIGHT - MARGIN
    );

    for (i, category) in categories.iter().enumerate() {
        let [x, y] = analysed.embedding[i];
        let color = palette.get(category.as_str()).copied().unwrap_or(PALETTE[0]);
        let _ = write!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}" fill-opacity="0.8"><title>{}</title></circle>"#,
            sx(x),
            sy(y),
            POINT_RADIUS,
            color,
            escape_html(&analysed.dataset.statements[i].content)
        );
    }

    let legend_x = PLOT_WIDTH + 10.0;
    for (row, (category, color)) in palette.iter().enumerate() {
        let y = MARGIN + row as f64 * 22.0;
        let _ = write!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="6" fill="{}"/><text x="{:.1}" y="{:.1}" font-size="13">{}</text>"#,
            legend_x + 6.0,
            y,
            color,
            legend_x + 18.0,
            y + 4.0,
            escape_html(category)
        );
    }

    svg.push_str("</svg>");
    svg
}
