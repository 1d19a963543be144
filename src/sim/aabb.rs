//! Axis-aligned boxes for walls, paddles and the ball
//!
//! A box is stored as center + half-extent so that the same value can be fed
//! straight into the renderer as an instance offset/scale.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    /// Half-width, half-height (both >= 0)
    pub extent: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, extent: Vec2) -> Self {
        debug_assert!(
            extent.x >= 0.0 && extent.y >= 0.0,
            "negative extent {extent:?}"
        );
        Self { center, extent }
    }

    /// Separating-axis overlap test
    ///
    /// Touching edges do not count: the comparison is strict on both axes.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.extent + other.extent;
        delta.x < reach.x && delta.y < reach.y
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.extent
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn boxed(cx: f32, cy: f32, ex: f32, ey: f32) -> Aabb {
        Aabb::new(Vec2::new(cx, cy), Vec2::new(ex, ey))
    }

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = boxed(0.0, 0.0, 0.5, 0.5);
        let b = boxed(0.4, 0.4, 0.2, 0.2);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        // Exactly representable values so |dx| == extent sum holds exactly
        let a = boxed(0.0, 0.0, 0.25, 0.25);
        let b = boxed(0.5, 0.0, 0.25, 0.25);
        assert!(!a.intersects(&b));

        let c = boxed(0.0, -0.75, 0.25, 0.25);
        let d = boxed(0.0, -0.25, 0.25, 0.25);
        assert!(!c.intersects(&d));
    }

    #[test]
    fn test_separated_on_one_axis_misses() {
        let a = boxed(0.0, 0.0, 0.1, 1.0);
        let b = boxed(0.5, 0.0, 0.1, 1.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_point_inside_box() {
        let a = boxed(0.0, 0.0, 0.1, 0.1);
        let point = boxed(0.05, -0.05, 0.0, 0.0);
        assert!(a.intersects(&point));
        assert_eq!(point.min(), point.max());
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(
            ax in -2.0f32..2.0, ay in -2.0f32..2.0, aex in 0.0f32..1.0, aey in 0.0f32..1.0,
            bx in -2.0f32..2.0, by in -2.0f32..2.0, bex in 0.0f32..1.0, bey in 0.0f32..1.0,
        ) {
            let a = boxed(ax, ay, aex, aey);
            let b = boxed(bx, by, bex, bey);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_edge_contact_is_exclusive(
            // Multiples of 1/8 keep center - center exact in f32
            i in -8i32..8, ea in 1i32..8, eb in 1i32..8, ey in 1i32..8,
        ) {
            let step = 0.125f32;
            let a = boxed(i as f32 * step, 0.0, ea as f32 * step, ey as f32 * step);
            let b = boxed((i + ea + eb) as f32 * step, 0.0, eb as f32 * step, ey as f32 * step);
            prop_assert!(!a.intersects(&b));
        }
    }
}
