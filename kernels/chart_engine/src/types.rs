// Type definitions for the aggregation/layout core

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

// ============================================================================
// RAW CELL VALUES
// ============================================================================

// A raw cell value as delivered by the data-loading collaborator
//
// Delimited datasets arrive as text; numeric columns are coerced on demand.
// A failed coercion yields NaN rather than an error, so a malformed cell
// forms its own group instead of aborting a whole aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    // Numeric coercion: numbers pass through, text is parsed.
    // Unparsable text becomes NaN (the `+d.col` behavior of the source data).
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format!("{}", n),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

// ============================================================================
// ROWS
// ============================================================================

// One record of the input table: an ordered mapping column name -> value
//
// Rows are owned by the caller and borrowed by the core. Column lookup is a
// linear scan; the datasets here have a handful of columns, so a map would
// buy nothing.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }

    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        Self { columns: pairs }
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.columns.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    // Numeric read of a column; None if the column is absent entirely.
    // Present-but-unparsable cells come back as NaN, per Value::as_number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).map(Value::as_number)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// GROUPING KEYS
// ============================================================================

// One component of a composite grouping key
//
// Numeric parts compare by value (via total_cmp, so NaN is a single bucket
// that sorts last); text parts compare lexicographically. Numbers sort
// before text so mixed-key output stays deterministic.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum KeyPart {
    Num(f64),
    Text(String),
}

impl KeyPart {
    // Build a key part from a cell, coercing when the column is numeric
    pub fn from_value(value: &Value, numeric: bool) -> Self {
        if numeric {
            Self::Num(value.as_number())
        } else {
            Self::Text(value.as_text())
        }
    }

    pub fn as_label(&self) -> String {
        match self {
            Self::Num(n) => format!("{}", n),
            Self::Text(s) => s.clone(),
        }
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // total_cmp gives NaN a fixed position, so NaN keys collapse
            // into one bucket instead of poisoning the ordering
            (Self::Num(a), Self::Num(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Num(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Num(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

// A composite key: the values of the key columns, read in order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Key(pub Vec<KeyPart>);

impl Key {
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

// ============================================================================
// FLATTENED SERIES
// ============================================================================

// A flattened aggregate ready for stacking or line plotting
//
// Invariant: at most one point per (category, bucket) pair. Aggregation
// guarantees this; callers constructing points by hand must too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub category: String,
    pub bucket: KeyPart,
    pub value: f64,
}

// One category's contribution within a cumulative total at a given bucket
//
// high - low == the category's value; bands for a bucket partition
// [0, bucket total] with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBand {
    pub bucket: KeyPart,
    pub category: String,
    pub low: f64,
    pub high: f64,
}

impl StackedBand {
    #[inline]
    pub fn value(&self) -> f64 {
        self.high - self.low
    }
}

// ============================================================================
// SPATIAL ENTITIES
// ============================================================================

// A positioned item in the collision layout
//
// (anchor_x, anchor_y) is the data-driven target derived from the caller's
// scales; (x, y, vx, vy) is simulation state mutated only by the simulator.
// Entities are created once per render pass and keep their state across
// steps, keyed by the stable external id.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub id: usize,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Entity {
    // New entity starting at rest on its anchor
    pub fn at_anchor(id: usize, anchor_x: f64, anchor_y: f64, radius: f64) -> Self {
        Self {
            id,
            anchor_x,
            anchor_y,
            radius,
            x: anchor_x,
            y: anchor_y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    #[inline]
    pub fn distance_to(&self, other: &Entity) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ============================================================================
// FEATURE VECTORS
// ============================================================================

// A normalized feature vector for polar (radar) projection
//
// values[i] belongs to the i-th name of the chart's fixed feature order and
// must already be scaled into [0, 1] by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    pub entity_id: usize,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(entity_id: usize, values: Vec<f64>) -> Self {
        Self { entity_id, values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// A projected 2D point (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_coercion() {
        assert_eq!(Value::text("42.5").as_number(), 42.5);
        assert_eq!(Value::text(" 7 ").as_number(), 7.0);
        assert!(Value::text("N/A").as_number().is_nan());
        assert_eq!(Value::number(3.0).as_number(), 3.0);
    }

    #[test]
    fn test_nan_key_parts_collapse() {
        let a = KeyPart::Num(f64::NAN);
        let b = KeyPart::Num(f64::NAN);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_key_part_ordering() {
        let mut parts = vec![
            KeyPart::Text("b".into()),
            KeyPart::Num(2.0),
            KeyPart::Num(f64::NAN),
            KeyPart::Text("a".into()),
            KeyPart::Num(1.0),
        ];
        parts.sort();
        // numbers first (NaN last among numbers), then text
        assert_eq!(parts[0], KeyPart::Num(1.0));
        assert_eq!(parts[1], KeyPart::Num(2.0));
        assert!(matches!(parts[2], KeyPart::Num(n) if n.is_nan()));
        assert_eq!(parts[3], KeyPart::Text("a".into()));
        assert_eq!(parts[4], KeyPart::Text("b".into()));
    }

    #[test]
    fn test_row_lookup() {
        let mut row = Row::new();
        row.push("brand", Value::text("Apple"));
        row.push("price", Value::text("1999"));
        assert_eq!(row.number("price"), Some(1999.0));
        assert_eq!(row.number("missing"), None);
        assert_eq!(row.get("brand").unwrap().as_text(), "Apple");
    }
}
