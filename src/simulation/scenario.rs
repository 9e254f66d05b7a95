//! Build the initial particle set from configuration
//!
//! Each group is a sphere ("planet") filled by rejection sampling: a position
//! is drawn in spherical coordinates and thrown away if it lies within the
//! collision distance of any particle already placed, in this group or an
//! earlier one. The whole initial set is therefore overlap-free.
//!
//! Draws use `phi` uniform in `[-pi/2, pi/2)`, `theta` uniform in
//! `[0, 2pi)` and `r` uniform in `[0, R)`, which concentrates particles
//! toward the centre. Dense requests can make rejection sampling stall, so
//! after `max_seed_attempts` consecutive rejections seeding fails with
//! [`SimError::SeedingDensity`] instead of looping forever.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{GroupConfig, SimulationConfig};
use crate::error::{Result, SimError};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, Particles};

/// Uniform hash grid with cell size equal to the exclusion distance, so an
/// overlap check only has to look at the 27 cells around a candidate.
#[derive(Debug, Default)]
pub struct SeedGrid {
    cell: f32,
    cells: HashMap<[i32; 3], Vec<usize>>,
}

impl SeedGrid {
    pub fn new(cell: f32) -> Self {
        Self {
            cell,
            cells: HashMap::new(),
        }
    }

    fn key(&self, p: &NVec3) -> [i32; 3] {
        [
            (p.x / self.cell).floor() as i32,
            (p.y / self.cell).floor() as i32,
            (p.z / self.cell).floor() as i32,
        ]
    }

    pub fn insert(&mut self, p: &NVec3, index: usize) {
        if self.cell > 0.0 {
            let key = self.key(p);
            self.cells.entry(key).or_default().push(index);
        }
    }

    /// True if any indexed position lies within `self.cell` of `p`.
    pub fn overlaps(&self, p: &NVec3, positions: &[NVec3]) -> bool {
        if self.cell <= 0.0 {
            return false;
        }
        let [kx, ky, kz] = self.key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&[kx + dx, ky + dy, kz + dz]) else {
                        continue;
                    };
                    if bucket.iter().any(|&j| (positions[j] - p).norm() <= self.cell) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// One draw inside the sphere of `radius` around `center`.
pub fn sample_in_sphere<R: Rng>(rng: &mut R, center: &NVec3, radius: f32) -> NVec3 {
    let phi: f32 = rng.random_range(-FRAC_PI_2..FRAC_PI_2);
    let theta: f32 = rng.random_range(0.0..TAU);
    let r: f32 = rng.random_range(0.0..radius);

    center
        + NVec3::new(
            r * phi.cos() * theta.cos(),
            r * phi.sin(),
            r * phi.cos() * theta.sin(),
        )
}

/// Fill one group, appending to `particles`.
pub fn seed_group<R: Rng>(
    rng: &mut R,
    group_idx: usize,
    group: &GroupConfig,
    params: &Parameters,
    particles: &mut Particles,
    grid: &mut SeedGrid,
) -> Result<()> {
    let center = group.center();
    let velocity = group.velocity();
    let color = group.color(group_idx);

    let mut placed = 0;
    let mut rejected = 0usize;
    let mut total_rejected = 0usize;

    while placed < group.particle_count {
        let pos = sample_in_sphere(rng, &center, group.planet_radius);

        if grid.overlaps(&pos, &particles.position) {
            rejected += 1;
            total_rejected += 1;
            if rejected >= params.max_seed_attempts {
                return Err(SimError::SeedingDensity {
                    group: group_idx,
                    placed,
                    requested: group.particle_count,
                    attempts: rejected,
                });
            }
            continue;
        }

        grid.insert(&pos, particles.len());
        particles.push(pos, velocity, params.mass, color);
        placed += 1;
        rejected = 0;
    }

    debug!("group {group_idx}: placed {placed} particles, {total_rejected} draws rejected");
    Ok(())
}

/// Validate `cfg` and seed every group.
pub fn seed_particles(cfg: &SimulationConfig) -> Result<Particles> {
    cfg.validate()?;
    let params = cfg.parameters();
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut particles = Particles::with_capacity(cfg.total_particles());
    let mut grid = SeedGrid::new(params.collision_distance());

    for (i, group) in cfg.groups.iter().enumerate() {
        seed_group(&mut rng, i, group, &params, &mut particles, &mut grid)?;
    }

    info!(
        "seeded {} particles in {} groups (collision distance {})",
        particles.len(),
        cfg.groups.len(),
        params.collision_distance()
    );
    Ok(particles)
}
