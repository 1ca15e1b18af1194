//! Interactive statement map
//!
//! Renders a self-contained HTML document: a canvas map with pan (drag),
//! zoom (wheel), hover text, search-by-text, and group labels that get
//! finer as the user zooms in. Everything is inline so the document can be
//! embedded through an iframe `srcdoc`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use super::escape_html;
use super::labels::humanize_layers;
use crate::dataset::AnalysedDataset;

/// Styling options for the interactive map
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveOptions {
    pub title: String,
    pub sub_title: String,
    pub enable_search: bool,
    pub darkmode: bool,
    /// Inner plot height in pixels
    pub height: u32,
    /// Hue spread (radians) of finer groups around their top group's hue
    pub palette_theta_range: f64,
    pub point_radius_min_pixels: f64,
}

impl InteractiveOptions {
    /// Standard options for a report with `statements` statements
    pub fn for_report(statements: usize) -> Self {
        Self {
            title: "Polis Report".to_string(),
            sub_title: format!("{} statements", statements),
            enable_search: true,
            darkmode: true,
            height: 600,
            palette_theta_range: PI / 8.0,
            point_radius_min_pixels: 8.0,
        }
    }
}

#[derive(Serialize)]
struct MapPoint<'a> {
    x: f64,
    y: f64,
    hover: &'a str,
    color: String,
}

#[derive(Serialize)]
struct MapData<'a> {
    points: Vec<MapPoint<'a>>,
    /// Display label per zoom level (coarsest first) per point
    layers: Vec<Vec<String>>,
    enable_search: bool,
    darkmode: bool,
    radius: f64,
}

/// Base hue (degrees) per top group, jittered for the finest group
fn point_colors(analysed: &AnalysedDataset, theta_range: f64, darkmode: bool) -> Vec<String> {
    let layers = analysed.label_layers.layers();
    let n = analysed.statement_count();
    let top = layers.last();
    let finest = layers.first();

    let top_count = top.and_then(|t| t.iter().max()).map_or(1, |m| m + 1);
    let spread_degrees = theta_range.to_degrees();
    let lightness = if darkmode { 62 } else { 45 };

    // Sorted distinct finest groups under each top group
    let mut siblings: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    if let (Some(top), Some(finest)) = (top, finest) {
        for (&top_group, &group) in top.iter().zip(finest) {
            siblings.entry(top_group).or_default().push(group);
        }
        for groups in siblings.values_mut() {
            groups.sort_unstable();
            groups.dedup();
        }
    }

    (0..n)
        .map(|i| {
            let top_group = top.and_then(|t| t.get(i)).copied().unwrap_or(0);
            let base = 360.0 * top_group as f64 / top_count as f64;

            // Rank of the finest group among its siblings, mapped into
            // [-spread/2, spread/2]
            let jitter = match (finest.and_then(|f| f.get(i)), siblings.get(&top_group)) {
                (Some(group), Some(groups)) if groups.len() > 1 => {
                    let pos = groups.binary_search(group).unwrap_or(0);
                    spread_degrees * (pos as f64 / (groups.len() - 1) as f64 - 0.5)
                }
                _ => 0.0,
            };

            let hue = (base + jitter).rem_euclid(360.0);
            format!("hsl({:.1}, 70%, {}%)", hue, lightness)
        })
        .collect()
}

/// Render the interactive map document
pub fn render_interactive(analysed: &AnalysedDataset, options: &InteractiveOptions) -> String {
    let colors = point_colors(analysed, options.palette_theta_range, options.darkmode);
    let points = analysed
        .embedding
        .iter()
        .zip(&analysed.dataset.statements)
        .zip(colors)
        .map(|(([x, y], statement), color)| MapPoint {
            x: *x,
            y: *y,
            hover: &statement.content,
            color,
        })
        .collect();

    let data = MapData {
        points,
        layers: humanize_layers(&analysed.label_layers),
        enable_search: options.enable_search,
        darkmode: options.darkmode,
        radius: options.point_radius_min_pixels,
    };
    // Serializing plain strings and numbers cannot fail
    let data_json = serde_json::to_string(&data)
        .unwrap_or_else(|_| "{\"points\":[],\"layers\":[]}".to_string())
        .replace("</", "<\\/");

    let (background, foreground) = if options.darkmode {
        ("#111418", "#e8e8e8")
    } else {
        ("#ffffff", "#222222")
    };
    let search = if options.enable_search {
        r#"<input id="search" type="search" placeholder="Search statements…">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
  html, body {{ margin: 0; background: {background}; color: {foreground}; font-family: system-ui, -apple-system, sans-serif; }}
  header {{ padding: 8px 12px; }}
  header h1 {{ margin: 0; font-size: 20px; }}
  header h2 {{ margin: 2px 0 0; font-size: 13px; font-weight: normal; opacity: 0.7; }}
  #search {{ position: absolute; top: 10px; right: 12px; padding: 4px 8px; width: 240px; }}
  #map {{ display: block; width: 100%; height: {height}px; cursor: grab; }}
  #tooltip {{ position: absolute; pointer-events: none; max-width: 320px; padding: 6px 8px;
             background: rgba(0,0,0,0.8); color: #fff; border-radius: 4px; font-size: 13px; display: none; }}
</style>
</head>
<body>
<header><h1>{title}</h1><h2>{sub_title}</h2></header>
{search}
<canvas id="map"></canvas>
<div id="tooltip"></div>
<script>
const DATA = {data_json};
{script}
</script>
</body>
</html>"#,
        title = escape_html(&options.title),
        sub_title = escape_html(&options.sub_title),
        background = background,
        foreground = foreground,
        height = options.height,
        search = search,
        data_json = data_json,
        script = MAP_SCRIPT,
    )
}

const MAP_SCRIPT: &str = r#"
(function () {
  const canvas = document.getElementById('map');
  const tooltip = document.getElementById('tooltip');
  const search = document.getElementById('search');
  const ctx = canvas.getContext('2d');
  const pts = DATA.points;
  let query = '';

  const xs = pts.map(p => p.x), ys = pts.map(p => p.y);
  const minX = Math.min(...xs, 0), maxX = Math.max(...xs, 0);
  const minY = Math.min(...ys, 0), maxY = Math.max(...ys, 0);
  const spanX = (maxX - minX) || 1, spanY = (maxY - minY) || 1;
  let scale = 1, offX = 0, offY = 0;

  function resize() {
    canvas.width = canvas.clientWidth * devicePixelRatio;
    canvas.height = canvas.clientHeight * devicePixelRatio;
    draw();
  }

  function toScreen(p) {
    const pad = 40;
    const w = canvas.clientWidth - 2 * pad, h = canvas.clientHeight - 2 * pad;
    const base = Math.min(w / spanX, h / spanY);
    const sx = pad + (p.x - minX) * base + (w - spanX * base) / 2;
    const sy = pad + (maxY - p.y) * base + (h - spanY * base) / 2;
    return [sx * scale + offX, sy * scale + offY];
  }

  function zoomLayer() {
    if (!DATA.layers.length) return -1;
    return Math.min(DATA.layers.length - 1, Math.max(0, Math.floor(Math.log2(scale))));
  }

  function draw() {
    ctx.setTransform(devicePixelRatio, 0, 0, devicePixelRatio, 0, 0);
    ctx.clearRect(0, 0, canvas.clientWidth, canvas.clientHeight);
    const radius = Math.max(DATA.radius, 2 * Math.sqrt(scale));
    pts.forEach(p => {
      const [sx, sy] = toScreen(p);
      const hit = !query || p.hover.toLowerCase().includes(query);
      ctx.globalAlpha = hit ? 0.9 : 0.12;
      ctx.fillStyle = p.color;
      ctx.beginPath();
      ctx.arc(sx, sy, radius, 0, 2 * Math.PI);
      ctx.fill();
    });
    ctx.globalAlpha = 1;

    const layer = zoomLayer();
    if (layer < 0) return;
    const groups = {};
    pts.forEach((p, i) => {
      const label = DATA.layers[layer][i];
      const [sx, sy] = toScreen(p);
      const g = groups[label] || (groups[label] = { x: 0, y: 0, n: 0 });
      g.x += sx; g.y += sy; g.n += 1;
    });
    ctx.font = '600 13px system-ui, sans-serif';
    ctx.textAlign = 'center';
    ctx.fillStyle = DATA.darkmode ? '#ffffff' : '#000000';
    Object.entries(groups).forEach(([label, g]) => ctx.fillText(label, g.x / g.n, g.y / g.n - 12));
  }

  function nearest(mx, my) {
    let best = null, bestD = Infinity;
    pts.forEach(p => {
      const [sx, sy] = toScreen(p);
      const d = (sx - mx) ** 2 + (sy - my) ** 2;
      if (d < bestD) { bestD = d; best = p; }
    });
    const reach = Math.max(DATA.radius, 6);
    return bestD <= reach * reach ? best : null;
  }

  let drag = null;
  canvas.addEventListener('mousedown', e => { drag = [e.offsetX - offX, e.offsetY - offY]; canvas.style.cursor = 'grabbing'; });
  window.addEventListener('mouseup', () => { drag = null; canvas.style.cursor = 'grab'; });
  canvas.addEventListener('mousemove', e => {
    if (drag) { offX = e.offsetX - drag[0]; offY = e.offsetY - drag[1]; draw(); return; }
    const p = nearest(e.offsetX, e.offsetY);
    if (p) {
      tooltip.textContent = p.hover;
      tooltip.style.left = (e.pageX + 12) + 'px';
      tooltip.style.top = (e.pageY + 12) + 'px';
      tooltip.style.display = 'block';
    } else {
      tooltip.style.display = 'none';
    }
  });
  canvas.addEventListener('wheel', e => {
    e.preventDefault();
    const factor = e.deltaY < 0 ? 1.2 : 1 / 1.2;
    const next = Math.min(64, Math.max(0.5, scale * factor));
    const k = next / scale;
    offX = e.offsetX - (e.offsetX - offX) * k;
    offY = e.offsetY - (e.offsetY - offY) * k;
    scale = next;
    draw();
  }, { passive: false });
  if (search && DATA.enable_search) {
    search.addEventListener('input', () => { query = search.value.trim().toLowerCase(); draw(); });
  }
  window.addEventListener('resize', resize);
  resize();
})();
"#;
