// Polar projection of feature vectors onto evenly spaced radial axes
//
// Radar charts draw one spoke per feature; a record's normalized values are
// placed along the spokes and joined to a polygon. Everything here is a pure
// function of the inputs, cheap enough to re-run per frame while a highlight
// changes.

use std::f64::consts::PI;

use crate::error::EngineError;
use crate::types::{FeatureVector, Point};

// Fixed chart center; the radial scale stays with the caller (it owns axis
// domains), passed in per call like every other scale in the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PolarProjector {
    pub center_x: f64,
    pub center_y: f64,
}

impl PolarProjector {
    pub fn new(center_x: f64, center_y: f64) -> Self {
        Self { center_x, center_y }
    }

    // Angle of the i-th of n axes: first axis points straight up, the rest
    // follow counter-clockwise in math coordinates (clockwise on screen,
    // since screen y grows downward)
    #[inline]
    fn axis_angle(i: usize, n: usize) -> f64 {
        PI / 2.0 + 2.0 * PI * i as f64 / n as f64
    }

    // Place one value at a given radius along axis i of n
    #[inline]
    fn at_radius(&self, i: usize, n: usize, radius: f64) -> Point {
        let angle = Self::axis_angle(i, n);
        Point::new(
            self.center_x + angle.cos() * radius,
            self.center_y - angle.sin() * radius,
        )
    }

    // Project a feature vector onto the axes named by feature_order
    //
    // scale maps a normalized value in [0,1] to a radius in [0, max radius].
    // The vector must carry exactly one value per named feature, in the same
    // order; anything else is a shape mismatch.
    pub fn project(
        &self,
        vector: &FeatureVector,
        feature_order: &[String],
        scale: impl Fn(f64) -> f64,
    ) -> Result<Vec<Point>, EngineError> {
        if vector.len() != feature_order.len() {
            return Err(EngineError::ShapeMismatch {
                expected: feature_order.len(),
                got: vector.len(),
            });
        }
        let n = feature_order.len();
        Ok(vector
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| self.at_radius(i, n, scale(v)))
            .collect())
    }

    // Like project, but damps every value by a shrink factor first so the
    // polygon stays clear of the axis labels (the charts use 0.85)
    pub fn project_damped(
        &self,
        vector: &FeatureVector,
        feature_order: &[String],
        shrink: f64,
        scale: impl Fn(f64) -> f64,
    ) -> Result<Vec<Point>, EngineError> {
        if vector.len() != feature_order.len() {
            return Err(EngineError::ShapeMismatch {
                expected: feature_order.len(),
                got: vector.len(),
            });
        }
        let n = feature_order.len();
        Ok(vector
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| self.at_radius(i, n, scale(v * shrink)))
            .collect())
    }

    // Outer endpoint of each axis spoke (the radius of value 1.0)
    pub fn axis_endpoints(
        &self,
        feature_count: usize,
        scale: impl Fn(f64) -> f64,
    ) -> Vec<Point> {
        let r = scale(1.0);
        (0..feature_count)
            .map(|i| self.at_radius(i, feature_count, r))
            .collect()
    }

    // Text anchor per axis, slightly beyond the spoke end
    pub fn label_anchors(
        &self,
        feature_count: usize,
        scale: impl Fn(f64) -> f64,
    ) -> Vec<Point> {
        let r = scale(1.0) * 1.05;
        (0..feature_count)
            .map(|i| self.at_radius(i, feature_count, r))
            .collect()
    }
}

// Linear radial scale [0,1] -> [0, max_radius], the usual collaborator scale
pub fn linear_scale(max_radius: f64) -> impl Fn(f64) -> f64 {
    move |v| v * max_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn order(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_zero_vector_projects_to_center() {
        let proj = PolarProjector::new(100.0, 100.0);
        let v = FeatureVector::new(0, vec![0.0, 0.0, 0.0]);
        let points = proj.project(&v, &order(3), linear_scale(50.0)).unwrap();
        for p in points {
            assert!((p.x - 100.0).abs() < EPS);
            assert!((p.y - 100.0).abs() < EPS);
        }
    }

    #[test]
    fn test_ones_vector_reaches_max_radius() {
        let proj = PolarProjector::new(100.0, 100.0);
        let v = FeatureVector::new(0, vec![1.0, 1.0, 1.0, 1.0]);
        let points = proj.project(&v, &order(4), linear_scale(50.0)).unwrap();
        for p in points {
            let dx = p.x - 100.0;
            let dy = p.y - 100.0;
            assert!(((dx * dx + dy * dy).sqrt() - 50.0).abs() < EPS);
        }
    }

    #[test]
    fn test_first_axis_points_up() {
        let proj = PolarProjector::new(0.0, 0.0);
        let v = FeatureVector::new(0, vec![1.0, 1.0, 1.0]);
        let points = proj.project(&v, &order(3), linear_scale(10.0)).unwrap();
        // screen y grows downward, so "up" is negative y
        assert!(points[0].x.abs() < EPS);
        assert!((points[0].y + 10.0).abs() < EPS);
    }

    #[test]
    fn test_shape_mismatch() {
        let proj = PolarProjector::new(0.0, 0.0);
        let v = FeatureVector::new(0, vec![0.5, 0.5]);
        let err = proj.project(&v, &order(3), linear_scale(10.0)).unwrap_err();
        assert_eq!(err, EngineError::ShapeMismatch { expected: 3, got: 2 });
    }

    #[test]
    fn test_axis_endpoints_evenly_spaced() {
        let proj = PolarProjector::new(0.0, 0.0);
        let ends = proj.axis_endpoints(4, linear_scale(10.0));
        assert_eq!(ends.len(), 4);
        // four axes: up, left, down, right (screen coordinates)
        assert!((ends[0].y + 10.0).abs() < EPS);
        assert!((ends[1].x + 10.0).abs() < EPS);
        assert!((ends[2].y - 10.0).abs() < EPS);
        assert!((ends[3].x - 10.0).abs() < EPS);
    }

    #[test]
    fn test_label_anchors_beyond_spokes() {
        let proj = PolarProjector::new(0.0, 0.0);
        let labels = proj.label_anchors(3, linear_scale(100.0));
        for p in labels {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 105.0).abs() < EPS);
        }
    }

    #[test]
    fn test_damped_projection_shrinks_radius() {
        let proj = PolarProjector::new(0.0, 0.0);
        let v = FeatureVector::new(0, vec![1.0, 1.0, 1.0]);
        let points = proj
            .project_damped(&v, &order(3), 0.85, linear_scale(100.0))
            .unwrap();
        for p in points {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 85.0).abs() < EPS);
        }
    }
}
