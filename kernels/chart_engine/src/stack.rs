// Cumulative stacking of per-category series values
//
// Turns flat (category, bucket, value) points into [low, high) bands where
// the bands of one bucket partition [0, bucket total]. The caller's category
// order fully determines layering; the engine never reorders it.

use std::collections::BTreeMap;

use tracing::warn;

use crate::types::{KeyPart, SeriesPoint, StackedBand};

// Stack series points into cumulative bands, one per (bucket, category)
//
// - Buckets are emitted in ascending natural order; within a bucket, bands
//   follow category_order.
// - A category absent from a bucket contributes a zero-width band
//   (low == high), never a gap.
// - A point whose category is missing from category_order is skipped with a
//   warning; it would otherwise layer at an unspecified position.
// - Pure function of its inputs: identical input gives bit-identical output.
pub fn stack(points: &[SeriesPoint], category_order: &[String]) -> Vec<StackedBand> {
    // bucket -> (category -> value), both levels sorted/deterministic
    let mut buckets: BTreeMap<KeyPart, BTreeMap<&str, f64>> = BTreeMap::new();

    for point in points {
        if !category_order.iter().any(|c| c == &point.category) {
            warn!(
                category = %point.category,
                bucket = %point.bucket,
                "series point ignored: category not in stacking order"
            );
            continue;
        }
        buckets
            .entry(point.bucket.clone())
            .or_default()
            .insert(point.category.as_str(), point.value);
    }

    let mut bands = Vec::with_capacity(buckets.len() * category_order.len());
    for (bucket, values) in &buckets {
        let mut running = 0.0;
        for category in category_order {
            let value = values.get(category.as_str()).copied().unwrap_or(0.0);
            let low = running;
            running += value;
            bands.push(StackedBand {
                bucket: bucket.clone(),
                category: category.clone(),
                low,
                high: running,
            });
        }
    }
    bands
}

// Total stacked height per bucket, in bucket order (for y-axis domains)
pub fn bucket_totals(bands: &[StackedBand]) -> Vec<(KeyPart, f64)> {
    let mut totals: BTreeMap<KeyPart, f64> = BTreeMap::new();
    for band in bands {
        let t = totals.entry(band.bucket.clone()).or_insert(0.0);
        *t = t.max(band.high);
    }
    totals.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(category: &str, bucket: f64, value: f64) -> SeriesPoint {
        SeriesPoint {
            category: category.into(),
            bucket: KeyPart::Num(bucket),
            value,
        }
    }

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bands_partition_bucket_total() {
        let points = vec![
            point("Apple", 2020.0, 3.0),
            point("Dell", 2020.0, 2.0),
            point("Lenovo", 2020.0, 5.0),
        ];
        let bands = stack(&points, &order(&["Apple", "Dell", "Lenovo"]));
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].low, 0.0);
        assert_eq!(bands[0].high, 3.0);
        assert_eq!(bands[1].low, 3.0);
        assert_eq!(bands[1].high, 5.0);
        assert_eq!(bands[2].low, 5.0);
        assert_eq!(bands[2].high, 10.0);
        // stack total invariant: min low 0, max high = sum of values
        let total: f64 = points.iter().map(|p| p.value).sum();
        assert_eq!(bands.last().unwrap().high, total);
    }

    #[test]
    fn test_absent_category_gets_zero_width_band() {
        let points = vec![point("Apple", 2020.0, 4.0)];
        let bands = stack(&points, &order(&["Dell", "Apple"]));
        assert_eq!(bands.len(), 2);
        // Dell contributes nothing but still gets a band, no gap below Apple
        assert_eq!(bands[0].category, "Dell");
        assert_eq!(bands[0].low, 0.0);
        assert_eq!(bands[0].high, 0.0);
        assert_eq!(bands[1].low, 0.0);
        assert_eq!(bands[1].high, 4.0);
    }

    #[test]
    fn test_unknown_category_skipped() {
        let points = vec![
            point("Apple", 2020.0, 4.0),
            point("Acme", 2020.0, 9.0), // not in the order
        ];
        let bands = stack(&points, &order(&["Apple"]));
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].high, 4.0);
    }

    #[test]
    fn test_category_order_controls_layering() {
        let points = vec![point("A", 1.0, 1.0), point("B", 1.0, 2.0)];
        let ab = stack(&points, &order(&["A", "B"]));
        let ba = stack(&points, &order(&["B", "A"]));
        assert_eq!(ab[0].category, "A");
        assert_eq!(ab[0].high, 1.0);
        assert_eq!(ba[0].category, "B");
        assert_eq!(ba[0].high, 2.0);
        // both orders reach the same total
        assert_eq!(ab[1].high, 3.0);
        assert_eq!(ba[1].high, 3.0);
    }

    #[test]
    fn test_buckets_ascending() {
        let points = vec![
            point("A", 2021.0, 1.0),
            point("A", 2019.0, 1.0),
            point("A", 2020.0, 1.0),
        ];
        let bands = stack(&points, &order(&["A"]));
        let buckets: Vec<_> = bands.iter().map(|b| b.bucket.clone()).collect();
        assert_eq!(
            buckets,
            vec![KeyPart::Num(2019.0), KeyPart::Num(2020.0), KeyPart::Num(2021.0)]
        );
    }

    #[test]
    fn test_stack_is_idempotent() {
        let points = vec![
            point("Apple", 2020.0, 3.0),
            point("Dell", 2020.0, 2.0),
            point("Apple", 2021.0, 1.0),
        ];
        let ord = order(&["Apple", "Dell"]);
        let first = stack(&points, &ord);
        let second = stack(&points, &ord);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_points_give_empty_stack() {
        let bands = stack(&[], &order(&["Apple"]));
        assert!(bands.is_empty());
    }

    #[test]
    fn test_bucket_totals() {
        let points = vec![
            point("A", 1.0, 2.0),
            point("B", 1.0, 3.0),
            point("A", 2.0, 7.0),
        ];
        let bands = stack(&points, &order(&["A", "B"]));
        let totals = bucket_totals(&bands);
        assert_eq!(totals, vec![(KeyPart::Num(1.0), 5.0), (KeyPart::Num(2.0), 7.0)]);
    }
}
