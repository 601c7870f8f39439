// "Comparable but cheaper" neighbor selection
//
// Given a highlighted record, surface up to `limit` other records whose
// similarity field is within a relative tolerance of the anchor's while their
// constraint field is strictly lower. Drives the hover panel on the scatter
// chart: similar performance, lower price.

use tracing::warn;

use crate::error::EngineError;
use crate::types::Row;

#[derive(Debug, Clone)]
pub struct NeighborQuery {
    // column compared for closeness, e.g. a benchmark score
    pub similarity_field: String,
    // column that must be strictly lower than the anchor's, e.g. price
    pub constraint_field: String,
    // relative tolerance on the similarity field
    pub threshold: f64,
    // at most this many neighbors are returned
    pub limit: usize,
}

impl NeighborQuery {
    pub fn new(
        similarity_field: impl Into<String>,
        constraint_field: impl Into<String>,
        threshold: f64,
        limit: usize,
    ) -> Self {
        assert!(threshold > 0.0, "similarity threshold must be positive");
        assert!(limit > 0, "neighbor limit must be positive");
        Self {
            similarity_field: similarity_field.into(),
            constraint_field: constraint_field.into(),
            threshold,
            limit,
        }
    }

    // Relative difference between two similarity values, symmetric in its
    // arguments: |a - b| scaled by their mean
    #[inline]
    fn relative_difference(a: f64, b: f64) -> f64 {
        (a - b).abs() / ((a + b) / 2.0)
    }

    /// Select the anchor's neighborhood from `candidates`.
    ///
    /// Returns `None` when there is no anchor (a cleared highlight). With an
    /// anchor, returns the anchor's index first, followed by the indices of
    /// the first matches in candidate order, up to the limit. Candidates with
    /// missing or unparsable fields never match; an anchor with missing
    /// fields is a configuration error.
    pub fn select<'a>(
        &self,
        anchor: Option<&Row>,
        candidates: impl IntoIterator<Item = (usize, &'a Row)>,
    ) -> Result<Option<Vec<usize>>, EngineError> {
        let anchor = match anchor {
            Some(row) => row,
            None => return Ok(None),
        };

        let anchor_score = self.field(anchor, &self.similarity_field, "anchor")?;
        let anchor_constraint = self.field(anchor, &self.constraint_field, "anchor")?;

        let mut selected = vec![usize::MAX];
        let mut anchor_index = None;
        for (index, row) in candidates {
            if std::ptr::eq(row, anchor) {
                anchor_index = Some(index);
                continue;
            }
            if selected.len() > self.limit {
                if anchor_index.is_some() {
                    break;
                }
                continue;
            }
            let score = match row.number(&self.similarity_field) {
                Some(v) if v.is_finite() => v,
                _ => continue,
            };
            let constraint = match row.number(&self.constraint_field) {
                Some(v) if v.is_finite() => v,
                _ => continue,
            };
            if Self::relative_difference(score, anchor_score) < self.threshold
                && constraint < anchor_constraint
            {
                selected.push(index);
            }
        }

        match anchor_index {
            Some(i) => selected[0] = i,
            None => {
                warn!(
                    similarity = %self.similarity_field,
                    "anchor row not present among candidates"
                );
                selected.remove(0);
            }
        }
        Ok(Some(selected))
    }

    fn field(&self, row: &Row, column: &str, operation: &str) -> Result<f64, EngineError> {
        match row.number(column) {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(EngineError::Configuration {
                column: column.to_string(),
                operation: format!("{} of neighbor query", operation),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Row, Value};

    fn record(score: f64, price: f64) -> Row {
        Row::from_pairs(vec![
            ("cpu_score".to_string(), Value::Number(score)),
            ("price".to_string(), Value::Number(price)),
        ])
    }

    fn indices(rows: &[Row], query: &NeighborQuery, anchor: usize) -> Vec<usize> {
        query
            .select(Some(&rows[anchor]), rows.iter().enumerate())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_similar_and_cheaper_selected() {
        let rows = vec![
            record(100.0, 1000.0),
            record(95.0, 900.0),
            record(200.0, 50.0),
            record(98.0, 950.0),
        ];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        // row 2 is far cheaper but nowhere near in score
        assert_eq!(indices(&rows, &query, 0), vec![0, 1, 3]);
    }

    #[test]
    fn test_anchor_always_first() {
        let rows = vec![record(95.0, 900.0), record(100.0, 1000.0)];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        assert_eq!(indices(&rows, &query, 1), vec![1, 0]);
    }

    #[test]
    fn test_limit_caps_matches_in_scan_order() {
        let rows = vec![
            record(100.0, 1000.0),
            record(99.0, 990.0),
            record(98.0, 980.0),
            record(97.0, 970.0),
            record(96.0, 960.0),
        ];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 2);
        assert_eq!(indices(&rows, &query, 0), vec![0, 1, 2]);
    }

    #[test]
    fn test_equal_constraint_is_not_cheaper() {
        let rows = vec![record(100.0, 1000.0), record(100.0, 1000.0)];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        assert_eq!(indices(&rows, &query, 0), vec![0]);
    }

    #[test]
    fn test_no_anchor_clears_selection() {
        let rows = vec![record(100.0, 1000.0)];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        let result = query.select(None, rows.iter().enumerate()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unparsable_candidate_skipped() {
        let rows = vec![
            record(100.0, 1000.0),
            Row::from_pairs(vec![
                ("cpu_score".to_string(), Value::Text("n/a".to_string())),
                ("price".to_string(), Value::Number(10.0)),
            ]),
            record(99.0, 900.0),
        ];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        assert_eq!(indices(&rows, &query, 0), vec![0, 2]);
    }

    #[test]
    fn test_missing_anchor_field_is_configuration_error() {
        let anchor = Row::from_pairs(vec![("price".to_string(), Value::Number(10.0))]);
        let rows = vec![record(100.0, 1000.0)];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        let err = query
            .select(Some(&anchor), rows.iter().enumerate())
            .unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }

    #[test]
    fn test_symmetric_difference() {
        // |95 - 100| / 97.5 and |100 - 95| / 97.5 are the same test either way
        let rows_a = vec![record(100.0, 1000.0), record(95.0, 900.0)];
        let rows_b = vec![record(95.0, 1000.0), record(100.0, 900.0)];
        let query = NeighborQuery::new("cpu_score", "price", 0.1, 3);
        assert_eq!(indices(&rows_a, &query, 0), vec![0, 1]);
        assert_eq!(indices(&rows_b, &query, 0), vec![0, 1]);
    }
}
