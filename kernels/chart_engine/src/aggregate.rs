// Grouped aggregation over raw tabular rows
//
// This is the entry point of every chart pipeline: raw rows come in, a
// grouped reduction (count / mean / sum) comes out, keyed by one or two
// key columns. Output order is sorted by key so repeated runs render
// identically regardless of row order.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::EngineError;
use crate::types::{Key, KeyPart, Row, SeriesPoint};

// ============================================================================
// AGGREGATION SPEC
// ============================================================================

// How to reduce the rows of one group to a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    // Number of rows in the group
    Count,
    // Arithmetic mean of the value column (rows that fail numeric parse
    // are excluded from the mean, not treated as zero)
    Mean,
    // Total of the value column (same exclusion rule)
    Sum,
}

impl Reducer {
    #[inline]
    fn needs_value(self) -> bool {
        matches!(self, Self::Mean | Self::Sum)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Mean => "mean",
            Self::Sum => "sum",
        }
    }
}

// One key column and how to read it
//
// Numeric key columns are coerced with a numeric parse; a cell that fails
// the parse becomes a NaN key part and all such rows share one bucket.
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub column: String,
    pub numeric: bool,
}

impl KeySpec {
    pub fn text(column: impl Into<String>) -> Self {
        Self { column: column.into(), numeric: false }
    }

    pub fn numeric(column: impl Into<String>) -> Self {
        Self { column: column.into(), numeric: true }
    }
}

// ============================================================================
// GROUP RESULT
// ============================================================================

// The reduced value of every group, keyed by composite key
//
// Stored in a BTreeMap so iteration is always sorted by key: numeric keys
// ascending, text keys lexicographic, level by level. Two-level results use
// composite keys (category, bucket) rather than nested maps; flatten()
// recovers the per-category series view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupResult {
    levels: usize,
    groups: BTreeMap<Key, f64>,
}

impl GroupResult {
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<f64> {
        self.groups.get(key).copied()
    }

    // Sorted iteration over (key, reduced value)
    pub fn iter(&self) -> impl Iterator<Item = (&Key, f64)> {
        self.groups.iter().map(|(k, v)| (k, *v))
    }

    // Sum of all reduced values (for Count this is the total row count)
    pub fn total(&self) -> f64 {
        self.groups.values().sum()
    }

    // Flatten a 2-level (category -> bucket) result into series points,
    // sorted by category then bucket ascending
    pub fn flatten(&self) -> Result<Vec<SeriesPoint>, EngineError> {
        if self.levels != 2 {
            return Err(EngineError::missing_column(
                "<second key column>",
                "flatten (requires 2-level grouping)",
            ));
        }
        Ok(self
            .groups
            .iter()
            .map(|(key, value)| SeriesPoint {
                category: key.parts()[0].as_label(),
                bucket: key.parts()[1].clone(),
                value: *value,
            })
            .collect())
    }

    // Distinct first-level key labels, in sorted order
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for key in self.groups.keys() {
            let label = key.parts()[0].as_label();
            if out.last() != Some(&label) {
                out.push(label);
            }
        }
        out
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

// Per-group accumulator while scanning rows
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    rows: usize,
    sum: f64,
    numeric_rows: usize,
}

// Group rows by the key columns and reduce each group
//
// - Count needs no value column; Mean/Sum require one (ConfigurationError
//   if absent from the spec or from a row).
// - Empty input is an empty result, not an error.
// - 1-level and 2-level grouping are supported; no chart needs deeper
//   nesting.
pub fn aggregate(
    rows: &[Row],
    keys: &[KeySpec],
    reducer: Reducer,
    value_column: Option<&str>,
) -> Result<GroupResult, EngineError> {
    assert!(
        keys.len() == 1 || keys.len() == 2,
        "aggregate supports 1- or 2-level grouping"
    );

    let value_column = if reducer.needs_value() {
        Some(value_column.ok_or_else(|| {
            EngineError::missing_column("<value column>", reducer.name())
        })?)
    } else {
        None
    };

    let mut acc: BTreeMap<Key, Accumulator> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let mut parts = Vec::with_capacity(keys.len());
        for spec in keys {
            let value = row.get(&spec.column).ok_or_else(|| {
                EngineError::missing_column(&spec.column, "grouping key")
            })?;
            parts.push(KeyPart::from_value(value, spec.numeric));
        }
        let entry = acc.entry(Key(parts)).or_default();
        entry.rows += 1;

        if let Some(col) = value_column {
            let v = row
                .number(col)
                .ok_or_else(|| EngineError::missing_column(col, reducer.name()))?;
            if v.is_nan() {
                // row excluded from the reduction, group membership kept
                skipped += 1;
            } else {
                entry.sum += v;
                entry.numeric_rows += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(
            skipped,
            reducer = reducer.name(),
            "rows excluded from reduction: value failed numeric parse"
        );
    }

    let groups = acc
        .into_iter()
        .map(|(key, a)| {
            let reduced = match reducer {
                Reducer::Count => a.rows as f64,
                Reducer::Sum => a.sum,
                Reducer::Mean => {
                    if a.numeric_rows == 0 {
                        f64::NAN
                    } else {
                        a.sum / a.numeric_rows as f64
                    }
                }
            };
            (key, reduced)
        })
        .collect();

    Ok(GroupResult { levels: keys.len(), groups })
}

// Re-aggregate flattened series points by (category, bucket), summing values
//
// Used by the round-trip property: flatten(aggregate(..)) fed back through
// this reproduces the original 2-level result.
pub fn aggregate_points(points: &[SeriesPoint]) -> GroupResult {
    let mut groups: BTreeMap<Key, f64> = BTreeMap::new();
    for p in points {
        let key = Key(vec![KeyPart::Text(p.category.clone()), p.bucket.clone()]);
        *groups.entry(key).or_insert(0.0) += p.value;
    }
    GroupResult { levels: 2, groups }
}
