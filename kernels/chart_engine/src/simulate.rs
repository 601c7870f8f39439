// Force-directed collision layout
//
// Beeswarm-style scatter plots pin every entity to an anchor (its nominal
// chart position) and then relax the layout so overlapping circles push each
// other apart. The solver is a cooling loop: the anchor pull is modulated by
// a temperature `alpha` that decays geometrically, while overlap is resolved
// positionally each step, so the layout converges to a non-overlapping rest
// state instead of oscillating. Pairwise collision checks are O(N^2) per
// step, which is fine for the few hundred entities a chart carries.

use tracing::debug;

use crate::types::Entity;

// Cooling schedule: alpha decays from 1.0 toward zero, the layout counts as
// settled once it crosses ALPHA_MIN. DECAY is tuned so that happens after
// about MAX_STEPS steps.
const ALPHA_START: f64 = 1.0;
const ALPHA_MIN: f64 = 0.001;
const MAX_STEPS: usize = 300;

// Velocities keep this fraction of their magnitude each step; the rest is
// lost to friction
const VELOCITY_RETAIN: f64 = 0.6;

// Centers closer than this are treated as coincident and nudged apart
const MIN_DISTANCE: f64 = 1e-6;

// Fraction of the remaining overlap resolved per step. Overlap is corrected
// positionally rather than through velocities so the anchor pull can never
// hold two circles overlapped at rest.
const COLLIDE_STRENGTH: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct CollisionSimulator {
    // per-step pull toward the anchor, scaled by alpha
    pub attraction: f64,
    // extra clearance required between circle edges
    pub padding: f64,
    alpha: f64,
    alpha_decay: f64,
    steps_taken: usize,
}

impl Default for CollisionSimulator {
    fn default() -> Self {
        Self::new(0.1, 1.0)
    }
}

impl CollisionSimulator {
    pub fn new(attraction: f64, padding: f64) -> Self {
        assert!(attraction > 0.0, "attraction strength must be positive");
        assert!(padding >= 0.0, "padding must be non-negative");
        Self {
            attraction,
            padding,
            alpha: ALPHA_START,
            // geometric decay reaching ALPHA_MIN in MAX_STEPS steps
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / MAX_STEPS as f64),
            steps_taken: 0,
        }
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    // The layout is at rest once the temperature has cooled past the floor
    #[inline]
    pub fn settled(&self) -> bool {
        self.alpha < ALPHA_MIN
    }

    // Restore temperature so a changed layout can relax again. Positions and
    // velocities are untouched; the next step picks up from wherever the
    // entities currently sit.
    pub fn reheat(&mut self, target: f64) {
        assert!(target > 0.0 && target <= 1.0, "reheat target must be in (0, 1]");
        self.alpha = target;
        self.steps_taken = 0;
    }

    // Force the layout to rest immediately, freezing entities in place
    pub fn cool(&mut self) {
        self.alpha = 0.0;
    }

    // Advance the layout one step: accumulate forces into velocities, apply
    // friction, integrate, then cool
    pub fn step(&mut self, entities: &mut [Entity]) {
        if self.settled() {
            return;
        }

        // anchor attraction
        for e in entities.iter_mut() {
            e.vx += (e.anchor_x - e.x) * self.attraction * self.alpha;
            e.vy += (e.anchor_y - e.y) * self.attraction * self.alpha;
        }

        // pairwise collision repulsion
        for i in 0..entities.len() {
            for j in (i + 1)..entities.len() {
                let (head, tail) = entities.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                let mut dx = b.x - a.x;
                let mut dy = b.y - a.y;
                let mut dist = (dx * dx + dy * dy).sqrt();

                // coincident centers have no direction to push along; nudge
                // them apart with a jitter derived from the indices so the
                // same input always relaxes to the same layout
                if dist < MIN_DISTANCE {
                    dx = jitter(i, j);
                    dy = jitter(j, i);
                    dist = (dx * dx + dy * dy).sqrt();
                }

                let clearance = a.radius + b.radius + self.padding;
                if dist < clearance {
                    let overlap = (clearance - dist) / dist * COLLIDE_STRENGTH;
                    // heavier (larger) circles move less
                    let mass_a = a.radius * a.radius;
                    let mass_b = b.radius * b.radius;
                    let share_b = mass_a / (mass_a + mass_b);
                    let px = dx * overlap;
                    let py = dy * overlap;
                    b.x += px * share_b;
                    b.y += py * share_b;
                    a.x -= px * (1.0 - share_b);
                    a.y -= py * (1.0 - share_b);
                }
            }
        }

        // friction + integration
        for e in entities.iter_mut() {
            e.vx *= VELOCITY_RETAIN;
            e.vy *= VELOCITY_RETAIN;
            e.x += e.vx;
            e.y += e.vy;
        }

        self.alpha *= 1.0 - self.alpha_decay;
        self.steps_taken += 1;
    }

    // Step until the layout settles or the step cap is reached; returns the
    // number of steps run
    pub fn run(&mut self, entities: &mut [Entity]) -> usize {
        let start = self.steps_taken;
        while !self.settled() && self.steps_taken < MAX_STEPS {
            self.step(entities);
        }
        let ran = self.steps_taken - start;
        debug!(
            steps = ran,
            alpha = self.alpha,
            entities = entities.len(),
            "collision layout settled"
        );
        ran
    }
}

// Small deterministic displacement for coincident centers. The constants are
// arbitrary mixing primes; only determinism and non-zero output matter.
#[inline]
fn jitter(i: usize, j: usize) -> f64 {
    let h = i.wrapping_mul(2654435761).wrapping_add(j.wrapping_mul(40503)) % 1000;
    MIN_DISTANCE * (h as f64 - 499.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_pair() -> Vec<Entity> {
        vec![
            Entity::at_anchor(0, 50.0, 50.0, 10.0),
            Entity::at_anchor(1, 50.0, 50.0, 10.0),
        ]
    }

    #[test]
    fn test_coincident_pair_separates() {
        let mut sim = CollisionSimulator::new(0.1, 1.0);
        let mut entities = overlapping_pair();
        sim.run(&mut entities);
        assert!(sim.settled());
        let dist = entities[0].distance_to(&entities[1]);
        assert!(
            dist >= entities[0].radius + entities[1].radius,
            "circles still overlap after settling: dist = {}",
            dist
        );
    }

    #[test]
    fn test_settles_within_step_cap() {
        let mut sim = CollisionSimulator::default();
        let mut entities = overlapping_pair();
        let steps = sim.run(&mut entities);
        assert!(steps <= MAX_STEPS);
        assert!(sim.settled());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let mut first = overlapping_pair();
        let mut second = overlapping_pair();
        CollisionSimulator::default().run(&mut first);
        CollisionSimulator::default().run(&mut second);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn test_entities_stay_near_anchors() {
        let mut sim = CollisionSimulator::default();
        let mut entities: Vec<Entity> = (0..20)
            .map(|i| Entity::at_anchor(i, 100.0 + (i % 3) as f64, 100.0, 5.0))
            .collect();
        sim.run(&mut entities);
        for e in &entities {
            let dx = e.x - e.anchor_x;
            let dy = e.y - e.anchor_y;
            // a cluster of 20 circles of radius 5 fits well inside r = 100
            assert!((dx * dx + dy * dy).sqrt() < 100.0, "entity {} drifted too far", e.id);
        }
    }

    #[test]
    fn test_reheat_restores_temperature_only() {
        let mut sim = CollisionSimulator::default();
        let mut entities = overlapping_pair();
        sim.run(&mut entities);
        let frozen: Vec<(f64, f64)> = entities.iter().map(|e| (e.x, e.y)).collect();

        sim.reheat(0.5);
        assert!(!sim.settled());
        assert_eq!(sim.alpha(), 0.5);
        for (e, &(x, y)) in entities.iter().zip(frozen.iter()) {
            assert_eq!(e.x, x);
            assert_eq!(e.y, y);
        }
    }

    #[test]
    fn test_cool_freezes_layout() {
        let mut sim = CollisionSimulator::default();
        let mut entities = overlapping_pair();
        sim.step(&mut entities);
        sim.cool();
        assert!(sim.settled());
        let before: Vec<(f64, f64)> = entities.iter().map(|e| (e.x, e.y)).collect();
        sim.step(&mut entities);
        for (e, &(x, y)) in entities.iter().zip(before.iter()) {
            assert_eq!(e.x, x);
            assert_eq!(e.y, y);
        }
    }

    #[test]
    fn test_non_overlapping_entities_barely_move() {
        let mut sim = CollisionSimulator::new(0.1, 0.0);
        let mut entities = vec![
            Entity::at_anchor(0, 0.0, 0.0, 5.0),
            Entity::at_anchor(1, 100.0, 0.0, 5.0),
        ];
        sim.run(&mut entities);
        assert!((entities[0].x - 0.0).abs() < 1.0);
        assert!((entities[1].x - 100.0).abs() < 1.0);
    }
}
