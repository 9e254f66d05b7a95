//! Pairwise collision detection and elastic response.
//!
//! Two particles collide when `|p_i - p_j| <= collision_distance`. The 1-D
//! elastic formula
//!
//! `u_i' = (m_i - m_j)/(m_i + m_j) * u_i + 2 m_j/(m_i + m_j) * u_j`
//!
//! is applied to the velocity components along the line of centres; the
//! tangential components are left alone. Every pair reads velocities from
//! the snapshot taken at the start of the pass and adds its change to the
//! output buffer, so a particle touching several neighbours gets the sum of
//! the changes and each pair conserves momentum on its own.
//!
//! A pair only responds while its centres are closing. Detection is by
//! distance alone, so a pair that is still overlapping after it bounced is
//! found again on the next step; without the closing test its velocities
//! would swap back and it would stay stuck together.

use rayon::prelude::*;

use crate::simulation::barnes_hut::Octree;
use crate::simulation::forces::MIN_DISTANCE;
use crate::simulation::states::NVec3;

/// An unordered colliding pair, always stored with `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Contact {
    pub i: usize,
    pub j: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    pub collision_distance: f32,
}

impl CollisionResolver {
    pub fn new(collision_distance: f32) -> Self {
        Self { collision_distance }
    }

    fn touching(&self, a: &NVec3, b: &NVec3) -> bool {
        let d = (a - b).norm();
        d <= self.collision_distance && d >= MIN_DISTANCE
    }

    /// All colliding pairs by brute force, sorted by `(i, j)`.
    pub fn detect_direct(&self, positions: &[NVec3]) -> Vec<Contact> {
        let n = positions.len();
        let mut contacts = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.touching(&positions[i], &positions[j]) {
                    contacts.push(Contact { i, j });
                }
            }
        }
        contacts
    }

    /// All colliding pairs found with range queries on `tree`, sorted by
    /// `(i, j)`. Particles missing from the tree are not found as partners.
    pub fn detect_with_tree(&self, tree: &Octree, positions: &[NVec3]) -> Vec<Contact> {
        positions
            .par_iter()
            .enumerate()
            .flat_map_iter(|(i, p)| {
                let mut near = Vec::new();
                tree.for_each_within(p, self.collision_distance, |q| {
                    if q.index > i && self.touching(p, &positions[q.index]) {
                        near.push(q.index);
                    }
                });
                near.sort_unstable();
                near.into_iter().map(move |j| Contact { i, j })
            })
            .collect()
    }

    /// Apply the elastic response for every contact. `velocity` is read as
    /// the pre-collision snapshot and overwritten with the result.
    pub fn resolve(&self, contacts: &[Contact], positions: &[NVec3], masses: &[f32], velocity: &mut [NVec3]) {
        if contacts.is_empty() {
            return;
        }
        let snapshot = velocity.to_vec();

        for c in contacts {
            if let Some((dv_i, dv_j)) = elastic_delta(
                &positions[c.i],
                &positions[c.j],
                &snapshot[c.i],
                &snapshot[c.j],
                masses[c.i],
                masses[c.j],
            ) {
                velocity[c.i] += dv_i;
                velocity[c.j] += dv_j;
            }
        }
    }
}

/// Velocity changes `(dv_i, dv_j)` for one elastic contact along the line of
/// centres. `None` when the centres coincide, the masses sum to zero or the
/// pair is not closing.
pub fn elastic_delta(
    p_i: &NVec3,
    p_j: &NVec3,
    v_i: &NVec3,
    v_j: &NVec3,
    m_i: f32,
    m_j: f32,
) -> Option<(NVec3, NVec3)> {
    let offset = p_i - p_j;
    let dist = offset.norm();
    let m_sum = m_i + m_j;
    if dist < MIN_DISTANCE || m_sum <= 0.0 {
        return None;
    }
    let n = offset / dist;

    let u_i = v_i.dot(&n);
    let u_j = v_j.dot(&n);

    // n points from j to i, so a closing pair has u_i < u_j
    if u_i - u_j >= 0.0 {
        return None;
    }

    let u_i_new = (m_i - m_j) / m_sum * u_i + 2.0 * m_j / m_sum * u_j;
    let u_j_new = (m_j - m_i) / m_sum * u_j + 2.0 * m_i / m_sum * u_i;

    Some((n * (u_i_new - u_i), n * (u_j_new - u_j)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_masses_swap_velocities() {
        let positions = [NVec3::new(0.0, 0.0, 0.0), NVec3::new(0.01, 0.0, 0.0)];
        let masses = [1.0, 1.0];
        let mut velocity = [NVec3::new(1.0, 0.0, 0.0), NVec3::new(-0.5, 0.0, 0.0)];

        let resolver = CollisionResolver::new(0.02);
        let contacts = resolver.detect_direct(&positions);
        assert_eq!(contacts, vec![Contact { i: 0, j: 1 }]);

        resolver.resolve(&contacts, &positions, &masses, &mut velocity);
        assert!((velocity[0] - NVec3::new(-0.5, 0.0, 0.0)).norm() < 1e-6);
        assert!((velocity[1] - NVec3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn momentum_is_conserved() {
        let p_i = NVec3::new(0.0, 0.0, 0.0);
        let p_j = NVec3::new(0.01, 0.005, -0.003);
        let v_i = NVec3::new(0.3, -1.2, 0.7);
        let v_j = NVec3::new(-0.9, 0.4, 0.1);
        let (m_i, m_j) = (1.5, 4.0);

        let (dv_i, dv_j) = elastic_delta(&p_i, &p_j, &v_i, &v_j, m_i, m_j).unwrap();
        let before = v_i * m_i + v_j * m_j;
        let after = (v_i + dv_i) * m_i + (v_j + dv_j) * m_j;
        assert!((before - after).norm() < 1e-5);

        let ke = |a: NVec3, b: NVec3| 0.5 * m_i * a.norm_squared() + 0.5 * m_j * b.norm_squared();
        assert!((ke(v_i, v_j) - ke(v_i + dv_i, v_j + dv_j)).abs() < 1e-4);
    }

    #[test]
    fn tangential_motion_is_untouched() {
        let (dv_i, dv_j) = elastic_delta(
            &NVec3::zeros(),
            &NVec3::new(0.01, 0.0, 0.0),
            &NVec3::new(1.0, 2.0, 0.0),
            &NVec3::new(0.0, 0.0, -1.0),
            1.0,
            1.0,
        )
        .unwrap();
        // only the x components trade places
        assert!((dv_i - NVec3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((dv_j - NVec3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn separating_pair_is_left_alone() {
        let p_i = NVec3::zeros();
        let p_j = NVec3::new(0.01, 0.0, 0.0);
        // moving apart
        assert!(elastic_delta(&p_i, &p_j, &NVec3::new(-1.0, 0.0, 0.0), &NVec3::new(0.5, 0.0, 0.0), 1.0, 1.0).is_none());
        // no relative motion along the line of centres
        assert!(elastic_delta(&p_i, &p_j, &NVec3::new(0.0, 3.0, 0.0), &NVec3::zeros(), 1.0, 1.0).is_none());
    }

    #[test]
    fn coincident_pair_is_skipped() {
        let resolver = CollisionResolver::new(0.02);
        let positions = [NVec3::zeros(), NVec3::zeros()];
        assert!(resolver.detect_direct(&positions).is_empty());
        assert!(elastic_delta(&positions[0], &positions[1], &NVec3::x(), &NVec3::zeros(), 1.0, 1.0).is_none());
    }

    #[test]
    fn snapshot_is_used_for_both_sides() {
        // three in a row, middle one touches both neighbours
        let positions = [NVec3::new(-0.015, 0.0, 0.0), NVec3::zeros(), NVec3::new(0.015, 0.0, 0.0)];
        let masses = [1.0, 1.0, 1.0];
        let mut velocity = [NVec3::new(1.0, 0.0, 0.0), NVec3::zeros(), NVec3::new(-1.0, 0.0, 0.0)];
        let before: NVec3 = velocity.iter().sum();

        let resolver = CollisionResolver::new(0.02);
        let contacts = resolver.detect_direct(&positions);
        assert_eq!(contacts.len(), 2);
        resolver.resolve(&contacts, &positions, &masses, &mut velocity);

        let after: NVec3 = velocity.iter().sum();
        assert!((before - after).norm() < 1e-6);
        assert!((velocity[0] - NVec3::zeros()).norm() < 1e-6);
        assert!((velocity[1] - NVec3::zeros()).norm() < 1e-6);
        assert!((velocity[2] - NVec3::zeros()).norm() < 1e-6);
    }
}
