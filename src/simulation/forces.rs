//! Gravitational acceleration for the particle system.
//!
//! Convention: `a_i = G * sum_j m_j * (p_j - p_i) / |p_j - p_i|^3`, so the
//! receiving particle's own mass never enters its acceleration.
//!
//! Pairs closer than the cutoff (the collision distance) exert no gravity on
//! each other; the collision pass handles them instead. The same rule is
//! used by the direct sum and by the tree, so a tree walk with `theta == 0`
//! reproduces the direct sum pair for pair.

use rayon::prelude::*;

use crate::simulation::barnes_hut::Octree;
use crate::simulation::bounds::Aabb;
use crate::simulation::states::{NVec3, Particles};

/// Floor for the gravity cutoff; below this the direction between two points
/// is numerically meaningless.
pub const MIN_DISTANCE: f32 = 1e-6;

/// `G / |r|^3` for a separation with squared length `r2`, or `None` when the
/// pair is inside the cutoff.
#[inline]
fn pair_coefficient(r2: f32, g: f32, cutoff: f32) -> Option<f32> {
    let cutoff = cutoff.max(MIN_DISTANCE);
    if !(r2 > cutoff * cutoff) {
        return None;
    }
    let inv_r = r2.sqrt().recip();
    Some(g * inv_r * inv_r * inv_r)
}

/// Acceleration at `position` due to a point `mass` at `source`.
#[inline]
pub fn point_mass_acceleration(position: &NVec3, source: &NVec3, mass: f32, g: f32, cutoff: f32) -> NVec3 {
    let r = source - position;
    match pair_coefficient(r.norm_squared(), g, cutoff) {
        Some(coef) => r * (coef * mass),
        None => NVec3::zeros(),
    }
}

/// Source of per-particle acceleration.
/// Implementations overwrite `out[i]` for every particle.
pub trait Acceleration {
    fn acceleration(&self, particles: &Particles, out: &mut [NVec3]);
}

/// Exact pairwise gravity, `O(N²)`. Serves as the reference the tree is
/// checked against.
#[derive(Debug, Clone, Copy)]
pub struct DirectGravity {
    pub g: f32,
    pub cutoff: f32,
}

impl Acceleration for DirectGravity {
    fn acceleration(&self, particles: &Particles, out: &mut [NVec3]) {
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }

        let xs = &particles.position;
        let ms = &particles.mass;
        let n = xs.len();

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            for j in (i + 1)..n {
                // r points from i to j: i is pulled along +r, j along -r
                let r = xs[j] - xs[i];
                if let Some(coef) = pair_coefficient(r.norm_squared(), self.g, self.cutoff) {
                    out[i] += r * (coef * ms[j]);
                    out[j] -= r * (coef * ms[i]);
                }
            }
        }
    }
}

/// Barnes–Hut gravity. Each particle walks a frozen [`Octree`] on its own,
/// so the walk runs in parallel with rayon.
#[derive(Debug, Clone, Copy)]
pub struct TreeGravity {
    pub g: f32,
    pub cutoff: f32,
    pub theta: f32,
    pub leaf_capacity: usize,
}

impl TreeGravity {
    /// Evaluate against an already built tree whose point indices match the
    /// particle indices.
    pub fn acceleration_with(&self, tree: &Octree, positions: &[NVec3], out: &mut [NVec3]) {
        out.par_iter_mut()
            .zip(positions.par_iter())
            .enumerate()
            .for_each(|(i, (a, p))| {
                *a = tree.acceleration_on(i, p, self.theta, self.g, self.cutoff);
            });
    }
}

impl Acceleration for TreeGravity {
    /// Builds a throwaway tree over `particles` and walks it.
    fn acceleration(&self, particles: &Particles, out: &mut [NVec3]) {
        let bounds = Aabb::from_points(particles.position.iter()).to_cube();
        let tree = Octree::build(bounds, self.leaf_capacity, &particles.position, &particles.mass);
        self.acceleration_with(&tree, &particles.position, out);
    }
}
