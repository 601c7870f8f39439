// kernels/chart_engine/src/lib.rs

// Tabular Aggregation & Spatial Layout Core
//
// This library turns raw tabular rows into chart-ready geometry: grouped
// aggregates, stacked bands, polar projections, collision-relaxed layouts and
// neighbor selections. It does no parsing and no drawing; callers feed it
// typed rows and scale functions and draw what comes back. All computation
// uses f64.

pub mod aggregate;
pub mod error;
pub mod neighbor;
pub mod polar;
pub mod simulate;
pub mod stack;
pub mod types;

pub use aggregate::{aggregate, aggregate_points, GroupResult, KeySpec, Reducer};
pub use error::EngineError;
pub use neighbor::NeighborQuery;
pub use polar::{linear_scale, PolarProjector};
pub use simulate::CollisionSimulator;
pub use stack::{bucket_totals, stack};
pub use types::{
    Entity, FeatureVector, Key, KeyPart, Point, Row, SeriesPoint, StackedBand, Value,
};
