// SVG Chart Rendering
//
// Thin drawing layer over the core's geometry. Every function takes plain
// data (bands, points, entities) and returns a complete SVG document string;
// nothing here computes chart values.

use std::collections::BTreeSet;

use chart_engine::{Entity, GroupResult, Point, SeriesPoint, StackedBand};

const WIDTH: u32 = 680;
const HEIGHT: u32 = 420;
const MARGIN: u32 = 50;

// Category colors, assigned in first-seen order
const PALETTE: [&str; 8] = [
    "#2563eb", "#059669", "#d97706", "#dc2626",
    "#7c3aed", "#0891b2", "#be185d", "#4d7c0f",
];

fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn svg_open() -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif">"##,
        WIDTH, HEIGHT, WIDTH, HEIGHT
    )
}

fn axis_lines() -> String {
    let left = MARGIN;
    let bottom = HEIGHT - MARGIN;
    format!(
        r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#111" stroke-width="1"/><line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#111" stroke-width="1"/>"##,
        left, MARGIN, left, bottom,
        left, bottom, WIDTH - MARGIN, bottom,
    )
}

fn legend(categories: &[String]) -> String {
    let mut out = String::new();
    for (i, cat) in categories.iter().enumerate() {
        let y = MARGIN + 16 * i as u32;
        out.push_str(&format!(
            r##"<rect x="{}" y="{}" width="10" height="10" fill="{}"/><text x="{}" y="{}" font-size="11">{}</text>"##,
            WIDTH - MARGIN - 110, y, color_for(i),
            WIDTH - MARGIN - 96, y + 9, cat,
        ));
    }
    out
}

/// Stacked bar chart: one bar per bucket, one segment per band
pub fn stacked_bar_svg(bands: &[StackedBand]) -> String {
    let buckets: Vec<String> = {
        let mut seen = Vec::new();
        for b in bands {
            let label = b.bucket.as_label();
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen
    };
    let categories: Vec<String> = {
        let mut seen = Vec::new();
        for b in bands {
            if !seen.contains(&b.category) {
                seen.push(b.category.clone());
            }
        }
        seen
    };
    let max_high = bands.iter().map(|b| b.high).fold(0.0_f64, f64::max).max(1.0);

    let chart_w = (WIDTH - 2 * MARGIN) as f64;
    let chart_h = (HEIGHT - 2 * MARGIN) as f64;
    let band_w = chart_w / buckets.len().max(1) as f64;

    let mut body = String::new();
    for band in bands {
        if band.value() == 0.0 {
            continue;
        }
        let label = band.bucket.as_label();
        let bi = buckets.iter().position(|b| *b == label).unwrap_or(0);
        let ci = categories.iter().position(|c| *c == band.category).unwrap_or(0);
        let x = MARGIN as f64 + bi as f64 * band_w + band_w * 0.1;
        let y_high = MARGIN as f64 + chart_h * (1.0 - band.high / max_high);
        let seg_h = chart_h * band.value() / max_high;
        body.push_str(&format!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" opacity="0.9"/>"##,
            x, y_high, band_w * 0.8, seg_h, color_for(ci),
        ));
    }

    // bucket labels along the x-axis
    for (bi, bucket) in buckets.iter().enumerate() {
        let x = MARGIN as f64 + (bi as f64 + 0.5) * band_w;
        body.push_str(&format!(
            r##"<text x="{:.1}" y="{}" font-size="11" text-anchor="middle">{}</text>"##,
            x, HEIGHT - MARGIN + 16, bucket,
        ));
    }

    format!("{}{}{}{}</svg>", svg_open(), axis_lines(), body, legend(&categories))
}

/// Multi-series line chart from flattened aggregation points
pub fn line_svg(points: &[SeriesPoint]) -> String {
    let buckets: Vec<String> = {
        let set: BTreeSet<_> = points.iter().map(|p| p.bucket.clone()).collect();
        set.into_iter().map(|b| b.as_label()).collect()
    };
    let categories: Vec<String> = {
        let mut seen = Vec::new();
        for p in points {
            if !seen.contains(&p.category) {
                seen.push(p.category.clone());
            }
        }
        seen
    };
    let max_value = points
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let chart_w = (WIDTH - 2 * MARGIN) as f64;
    let chart_h = (HEIGHT - 2 * MARGIN) as f64;
    let step = chart_w / buckets.len().max(2).saturating_sub(1) as f64;

    let mut body = String::new();
    for (ci, cat) in categories.iter().enumerate() {
        let mut coords = Vec::new();
        for (bi, bucket) in buckets.iter().enumerate() {
            let found = points
                .iter()
                .find(|p| p.category == *cat && p.bucket.as_label() == *bucket);
            if let Some(p) = found {
                if p.value.is_finite() {
                    let x = MARGIN as f64 + bi as f64 * step;
                    let y = MARGIN as f64 + chart_h * (1.0 - p.value / max_value);
                    coords.push(format!("{:.1},{:.1}", x, y));
                }
            }
        }
        if coords.len() > 1 {
            body.push_str(&format!(
                r##"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"##,
                coords.join(" "),
                color_for(ci),
            ));
        }
    }

    for (bi, bucket) in buckets.iter().enumerate() {
        let x = MARGIN as f64 + bi as f64 * step;
        body.push_str(&format!(
            r##"<text x="{:.1}" y="{}" font-size="11" text-anchor="middle">{}</text>"##,
            x, HEIGHT - MARGIN + 16, bucket,
        ));
    }

    format!("{}{}{}{}</svg>", svg_open(), axis_lines(), body, legend(&categories))
}

/// Heatmap from a 2-level aggregation: first key level on y, second on x
pub fn heatmap_svg(result: &GroupResult) -> String {
    let mut row_labels = Vec::new();
    let mut col_labels = Vec::new();
    for (key, _) in result.iter() {
        let row = key.parts()[0].as_label();
        let col = key.parts()[1].as_label();
        if !row_labels.contains(&row) {
            row_labels.push(row);
        }
        if !col_labels.contains(&col) {
            col_labels.push(col);
        }
    }
    let max_value = result
        .iter()
        .map(|(_, v)| v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let chart_w = (WIDTH - 2 * MARGIN) as f64;
    let chart_h = (HEIGHT - 2 * MARGIN) as f64;
    let cell_w = chart_w / col_labels.len().max(1) as f64;
    let cell_h = chart_h / row_labels.len().max(1) as f64;

    let mut body = String::new();
    for (key, value) in result.iter() {
        if !value.is_finite() {
            continue;
        }
        let ri = row_labels.iter().position(|l| *l == key.parts()[0].as_label());
        let ci = col_labels.iter().position(|l| *l == key.parts()[1].as_label());
        if let (Some(ri), Some(ci)) = (ri, ci) {
            let x = MARGIN as f64 + ci as f64 * cell_w;
            let y = MARGIN as f64 + ri as f64 * cell_h;
            // single-hue ramp, light to saturated
            let t = value / max_value;
            let alpha = 0.15 + 0.85 * t;
            body.push_str(&format!(
                r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#2563eb" opacity="{:.3}" stroke="#fff"/>"##,
                x, y, cell_w, cell_h, alpha,
            ));
            body.push_str(&format!(
                r##"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="middle" fill="#111">{:.0}</text>"##,
                x + cell_w / 2.0, y + cell_h / 2.0 + 3.0, value,
            ));
        }
    }

    for (ri, label) in row_labels.iter().enumerate() {
        body.push_str(&format!(
            r##"<text x="{}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"##,
            MARGIN - 6,
            MARGIN as f64 + (ri as f64 + 0.5) * cell_h + 4.0,
            label,
        ));
    }
    for (ci, label) in col_labels.iter().enumerate() {
        body.push_str(&format!(
            r##"<text x="{:.1}" y="{}" font-size="11" text-anchor="middle">{}</text>"##,
            MARGIN as f64 + (ci as f64 + 0.5) * cell_w,
            HEIGHT - MARGIN + 16,
            label,
        ));
    }

    format!("{}{}</svg>", svg_open(), body)
}

/// Radar chart: spokes with labels plus one polygon per projected record
pub fn radar_svg(
    spokes: &[Point],
    labels: &[(Point, String)],
    center: Point,
    polygons: &[(String, Vec<Point>)],
) -> String {
    let mut body = String::new();
    for spoke in spokes {
        body.push_str(&format!(
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#999" stroke-width="1"/>"##,
            center.x, center.y, spoke.x, spoke.y,
        ));
    }
    for (anchor, text) in labels {
        body.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"##,
            anchor.x, anchor.y, text,
        ));
    }
    for (i, (name, points)) in polygons.iter().enumerate() {
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect();
        body.push_str(&format!(
            r##"<polygon points="{}" fill="{}" fill-opacity="0.25" stroke="{}" stroke-width="2"><title>{}</title></polygon>"##,
            coords.join(" "),
            color_for(i),
            color_for(i),
            name,
        ));
    }
    format!("{}{}</svg>", svg_open(), body)
}

/// Scatter: one circle per entity at its settled position
pub fn scatter_svg(entities: &[Entity], labels: &[String], highlighted: &[usize]) -> String {
    let mut body = String::new();
    for (e, label) in entities.iter().zip(labels.iter()) {
        let stroke = if highlighted.contains(&e.id) { "#dc2626" } else { "#111" };
        let stroke_width = if highlighted.contains(&e.id) { 2.5 } else { 1.0 };
        body.push_str(&format!(
            r##"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" fill-opacity="0.8" stroke="{}" stroke-width="{}"><title>{}</title></circle>"##,
            e.x,
            e.y,
            e.radius,
            color_for(e.id),
            stroke,
            stroke_width,
            label,
        ));
    }
    format!("{}{}{}</svg>", svg_open(), axis_lines(), body)
}
