// Chart Generator CLI
//
// Loads a delimited hardware dataset, runs it through the aggregation/layout
// core and writes an SVG chart plus a JSON summary manifest.

mod dataset;
mod svg;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use chart_engine::{
    aggregate, linear_scale, stack, CollisionSimulator, Entity, FeatureVector, KeySpec,
    NeighborQuery, PolarProjector, Reducer, Row,
};

/// CLI arguments for the chart generator
#[derive(Parser, Debug)]
#[command(name = "chartgen")]
#[command(about = "Aggregate a delimited dataset and render an SVG chart", long_about = None)]
struct Args {
    /// Path to the delimited dataset (header row required)
    #[arg(short, long)]
    input: PathBuf,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Chart to render
    #[arg(short, long, value_enum)]
    chart: ChartKind,

    /// Output directory for the SVG and summary
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Bucket column (x axis for bars/lines)
    #[arg(long, default_value = "release_year")]
    bucket_column: String,

    /// Category column (series/stack segments)
    #[arg(long, default_value = "brand")]
    category_column: String,

    /// Value column for mean/sum reducers
    #[arg(long, default_value = "price")]
    value_column: String,

    /// Second grouping column for the heatmap
    #[arg(long, default_value = "form_factor")]
    facet_column: String,

    /// Scatter x coordinate column
    #[arg(long, default_value = "dim_x")]
    x_column: String,

    /// Scatter y coordinate column
    #[arg(long, default_value = "dim_y")]
    y_column: String,

    /// Label column for scatter tooltips and radar polygons
    #[arg(long, default_value = "label")]
    label_column: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartKind {
    Bars,
    Lines,
    Heatmap,
    Radar,
    Scatter,
}

impl ChartKind {
    fn name(self) -> &'static str {
        match self {
            Self::Bars => "bars",
            Self::Lines => "lines",
            Self::Heatmap => "heatmap",
            Self::Radar => "radar",
            Self::Scatter => "scatter",
        }
    }
}

/// Run manifest written next to the chart
#[derive(Debug, Serialize)]
struct Summary {
    chart: String,
    input: String,
    rows: usize,
    groups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    simulation_steps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparable: Option<Vec<String>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("\n📊 Chart Generator");
    println!("==================");
    println!("  Input: {}", args.input.display());
    println!("  Chart: {}", args.chart.name());

    let rows = dataset::load(&args.input, args.delimiter)?;
    println!("  Rows:  {}\n", rows.len());

    fs::create_dir_all(&args.output)?;

    let mut summary = Summary {
        chart: args.chart.name().to_string(),
        input: args.input.display().to_string(),
        rows: rows.len(),
        groups: 0,
        simulation_steps: None,
        comparable: None,
    };

    let document = match args.chart {
        ChartKind::Bars => render_bars(&args, &rows, &mut summary)?,
        ChartKind::Lines => render_lines(&args, &rows, &mut summary)?,
        ChartKind::Heatmap => render_heatmap(&args, &rows, &mut summary)?,
        ChartKind::Radar => render_radar(&args, &rows, &mut summary)?,
        ChartKind::Scatter => render_scatter(&args, &rows, &mut summary)?,
    };

    let svg_path = args.output.join(format!("{}.svg", args.chart.name()));
    fs::write(&svg_path, &document)?;

    let summary_path = args.output.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;

    println!("✨ Chart written");
    println!("📄 {}", svg_path.display());
    println!("📄 {}\n", summary_path.display());

    Ok(())
}

// Count per (category, bucket), stacked into cumulative bands
fn render_bars(
    args: &Args,
    rows: &[Row],
    summary: &mut Summary,
) -> Result<String, Box<dyn std::error::Error>> {
    let keys = [
        KeySpec::text(&args.category_column),
        KeySpec::numeric(&args.bucket_column),
    ];
    let result = aggregate(rows, &keys, Reducer::Count, None)?;
    summary.groups = result.len();

    let points = result.flatten()?;
    let order = result.categories();
    let bands = stack(&points, &order);
    Ok(svg::stacked_bar_svg(&bands))
}

// Mean value per (category, bucket), one line per category
fn render_lines(
    args: &Args,
    rows: &[Row],
    summary: &mut Summary,
) -> Result<String, Box<dyn std::error::Error>> {
    let keys = [
        KeySpec::text(&args.category_column),
        KeySpec::numeric(&args.bucket_column),
    ];
    let result = aggregate(rows, &keys, Reducer::Mean, Some(args.value_column.as_str()))?;
    summary.groups = result.len();

    let points = result.flatten()?;
    Ok(svg::line_svg(&points))
}

// Mean value per (category, facet) grid
fn render_heatmap(
    args: &Args,
    rows: &[Row],
    summary: &mut Summary,
) -> Result<String, Box<dyn std::error::Error>> {
    let keys = [
        KeySpec::text(&args.category_column),
        KeySpec::text(&args.facet_column),
    ];
    let result = aggregate(rows, &keys, Reducer::Mean, Some(args.value_column.as_str()))?;
    summary.groups = result.len();
    Ok(svg::heatmap_svg(&result))
}

// Radar chart feature columns, in spoke order
const RADAR_FEATURES: [&str; 3] = ["price", "gpu_score", "cpu_score"];

// Each row becomes a polygon over min-max normalized feature values
fn render_radar(
    args: &Args,
    rows: &[Row],
    summary: &mut Summary,
) -> Result<String, Box<dyn std::error::Error>> {
    let feature_order: Vec<String> = RADAR_FEATURES.iter().map(|f| f.to_string()).collect();

    // per-feature min/max over parsable cells
    let mut ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); feature_order.len()];
    for row in rows {
        for (i, feature) in feature_order.iter().enumerate() {
            if let Some(v) = row.number(feature) {
                if v.is_finite() {
                    ranges[i].0 = ranges[i].0.min(v);
                    ranges[i].1 = ranges[i].1.max(v);
                }
            }
        }
    }

    let center = 340.0;
    let projector = PolarProjector::new(center, 210.0);
    let scale = linear_scale(160.0);

    let mut polygons = Vec::new();
    for (id, row) in rows.iter().enumerate() {
        let values: Vec<f64> = feature_order
            .iter()
            .enumerate()
            .map(|(i, feature)| {
                let v = row.number(feature).unwrap_or(f64::NAN);
                let (min, max) = ranges[i];
                if v.is_finite() && max > min {
                    (v - min) / (max - min)
                } else {
                    0.0
                }
            })
            .collect();
        let vector = FeatureVector::new(id, values);
        let points = projector.project_damped(&vector, &feature_order, 0.85, &scale)?;
        let label = row
            .get(&args.label_column)
            .map(|v| v.as_text())
            .unwrap_or_else(|| format!("row {}", id));
        polygons.push((label, points));
    }
    summary.groups = polygons.len();

    let spokes = projector.axis_endpoints(feature_order.len(), &scale);
    let labels: Vec<_> = projector
        .label_anchors(feature_order.len(), &scale)
        .into_iter()
        .zip(feature_order.iter().map(|f| f.to_string()))
        .collect();
    Ok(svg::radar_svg(
        &spokes,
        &labels,
        chart_engine::Point::new(projector.center_x, projector.center_y),
        &polygons,
    ))
}

// Circle radius from the price tier: 4px under $1200, +1px per $600, cap 10px
fn circle_size(price: f64) -> f64 {
    if !price.is_finite() {
        return 4.0;
    }
    let tier = 4.0 + ((price - 1200.0) / 600.0).floor() + 1.0;
    tier.clamp(4.0, 10.0)
}

// Entities anchored at scaled coordinates, relaxed by the collision solver,
// then a sample "comparable but cheaper" query against the first row
fn render_scatter(
    args: &Args,
    rows: &[Row],
    summary: &mut Summary,
) -> Result<String, Box<dyn std::error::Error>> {
    let xs: Vec<f64> = rows
        .iter()
        .map(|r| r.number(&args.x_column).unwrap_or(f64::NAN))
        .collect();
    let ys: Vec<f64> = rows
        .iter()
        .map(|r| r.number(&args.y_column).unwrap_or(f64::NAN))
        .collect();

    let x_max = xs.iter().copied().filter(|v| v.is_finite()).fold(1.0_f64, f64::max);
    let y_max = ys.iter().copied().filter(|v| v.is_finite()).fold(1.0_f64, f64::max);

    // chart area matches the SVG layer's margins
    let (left, top, width, height) = (50.0, 50.0, 580.0, 320.0);

    let mut entities = Vec::new();
    let mut labels = Vec::new();
    for (id, row) in rows.iter().enumerate() {
        let (x, y) = (xs[id], ys[id]);
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        let price = row.number(&args.value_column).unwrap_or(f64::NAN);
        entities.push(Entity::at_anchor(
            id,
            left + width * x / x_max,
            top + height * (1.0 - y / y_max),
            circle_size(price),
        ));
        labels.push(
            row.get(&args.label_column)
                .map(|v| v.as_text())
                .unwrap_or_else(|| format!("row {}", id)),
        );
    }
    summary.groups = entities.len();

    let mut sim = CollisionSimulator::new(0.1, 1.0);
    let pb = ProgressBar::new(300);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓▒░ "),
    );
    pb.set_message("Relaxing layout...");
    while !sim.settled() {
        sim.step(&mut entities);
        pb.inc(1);
    }
    pb.finish_with_message(format!("✓ Settled in {} steps", sim.steps_taken()));
    summary.simulation_steps = Some(sim.steps_taken());

    // highlight comparable-but-cheaper alternatives to the first row
    let mut highlighted = Vec::new();
    if !rows.is_empty() {
        let query = NeighborQuery::new("cpu_score", args.value_column.clone(), 0.1, 3);
        if let Some(selection) = query.select(Some(&rows[0]), rows.iter().enumerate())? {
            println!("\n🔎 Comparable but cheaper than '{}':", labels.first().map(String::as_str).unwrap_or("row 0"));
            let mut names = Vec::new();
            for &index in selection.iter().skip(1) {
                let name = rows[index]
                    .get(&args.label_column)
                    .map(|v| v.as_text())
                    .unwrap_or_else(|| format!("row {}", index));
                let price = rows[index].number(&args.value_column).unwrap_or(f64::NAN);
                println!("  {} (${:.0})", name, price);
                names.push(name);
            }
            if names.is_empty() {
                println!("  (none)");
            }
            summary.comparable = Some(names);
            highlighted = selection;
        }
    }

    Ok(svg::scatter_svg(&entities, &labels, &highlighted))
}
