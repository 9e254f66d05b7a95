//! Axis-aligned bounding volumes.
//!
//! [`Aabb`] serves two roles:
//! - the running min/max tracker rebuilt from all particle positions at the
//!   start of every step (the root extent of the octree), and
//! - the box owned by each octree node, split into 8 octants on subdivision.
//!
//! Octant indices use 3 bits:
//!
//! - Bit 0 (value 1): X axis, 0 for `x < mid.x`, 1 for `x >= mid.x`
//! - Bit 1 (value 2): Y axis, 0 for `y < mid.y`, 1 for `y >= mid.y`
//! - Bit 2 (value 4): Z axis, 0 for `z < mid.z`, 1 for `z >= mid.z`
//!
//! So a point lying on a split plane always belongs to the upper child.

use crate::simulation::states::NVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: NVec3,
    pub max: NVec3,
}

impl Aabb {
    pub fn new(min: NVec3, max: NVec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any call to [`Aabb::extend`] will overwrite.
    pub fn empty() -> Self {
        Self {
            min: NVec3::repeat(f32::INFINITY),
            max: NVec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Reset to the inverted state before a new scan.
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Grow the box to include `p`.
    pub fn extend(&mut self, p: &NVec3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing every point. Non-finite points are ignored.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a NVec3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            if p.iter().all(|c| c.is_finite()) {
                bbox.extend(p);
            }
        }
        bbox
    }

    /// True until at least one point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand to a cube around the same centre so every node's side length
    /// is the same on all three axes.
    pub fn to_cube(&self) -> Self {
        if self.is_empty() {
            return *self;
        }
        let center = self.center();
        let half = self.extent() * 0.5;
        let max_half = half.x.max(half.y).max(half.z);
        let half = NVec3::repeat(max_half);
        // rounding in center +/- half must not cut off the extreme points
        Self::new((center - half).inf(&self.min), (center + half).sup(&self.max))
    }

    pub fn center(&self) -> NVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> NVec3 {
        self.max - self.min
    }

    /// Longest edge of the box.
    pub fn side(&self) -> f32 {
        let e = self.extent();
        e.x.max(e.y).max(e.z)
    }

    pub fn volume(&self) -> f32 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    /// Inclusive containment on every axis.
    pub fn contains(&self, p: &NVec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Octant index (0..8) of `p` relative to the box midpoint.
    pub fn octant_of(&self, p: &NVec3) -> usize {
        let mid = self.center();
        let mut idx = 0;

        if p.x >= mid.x { idx |= 1; } // bit 0
        if p.y >= mid.y { idx |= 2; } // bit 1
        if p.z >= mid.z { idx |= 4; } // bit 2

        idx
    }

    /// Box of child octant `idx`, using the same bit layout as [`Aabb::octant_of`].
    pub fn child(&self, idx: usize) -> Self {
        let mid = self.center();
        let mut min = self.min;
        let mut max = self.max;

        if (idx & 1) == 0 { max.x = mid.x; } else { min.x = mid.x; }
        if (idx & 2) == 0 { max.y = mid.y; } else { min.y = mid.y; }
        if (idx & 4) == 0 { max.z = mid.z; } else { min.z = mid.z; }

        Self::new(min, max)
    }

    /// Euclidean distance from `p` to the nearest point of the box (0 inside).
    pub fn distance_to(&self, p: &NVec3) -> f32 {
        let clamped = p.sup(&self.min).inf(&self.max);
        (p - clamped).norm()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Aabb {
        Aabb::new(NVec3::new(-1.0, -1.0, -1.0), NVec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn tracker_follows_points() {
        let pts = [NVec3::new(0.5, -2.0, 1.0), NVec3::new(-1.0, 3.0, 0.0)];
        let b = Aabb::from_points(pts.iter());
        assert_eq!(b.min, NVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, NVec3::new(0.5, 3.0, 1.0));
    }

    #[test]
    fn reset_empties_box() {
        let mut b = unit();
        b.reset();
        assert!(b.is_empty());
        b.extend(&NVec3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn cube_keeps_center_and_uses_longest_edge() {
        let b = Aabb::new(NVec3::new(0.0, 0.0, 0.0), NVec3::new(4.0, 2.0, 1.0)).to_cube();
        assert_eq!(b.center(), NVec3::new(2.0, 1.0, 0.5));
        assert_eq!(b.extent(), NVec3::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn octants_tile_parent() {
        let parent = Aabb::new(NVec3::new(-1.0, 0.0, 2.0), NVec3::new(3.0, 2.0, 6.0));
        let mut total = 0.0;
        for i in 0..8 {
            let c = parent.child(i);
            assert!((c.volume() - parent.volume() / 8.0).abs() < 1e-5);
            assert!(parent.contains(&c.min) && parent.contains(&c.max));
            // the child's own centre maps back to its index
            assert_eq!(parent.octant_of(&c.center()), i);
            total += c.volume();
        }
        assert!((total - parent.volume()).abs() < 1e-4);
    }

    #[test]
    fn split_plane_goes_to_upper_child() {
        let b = unit();
        assert_eq!(b.octant_of(&NVec3::new(0.0, 0.0, 0.0)), 7);
        assert_eq!(b.octant_of(&NVec3::new(-0.5, 0.0, -0.5)), 2);
    }

    #[test]
    fn distance_to_box() {
        let b = unit();
        assert_eq!(b.distance_to(&NVec3::new(0.2, 0.3, 0.0)), 0.0);
        assert!((b.distance_to(&NVec3::new(4.0, 0.0, 0.0)) - 3.0).abs() < 1e-6);
    }
}
