//! Timing sweeps comparing the direct and Barnes–Hut paths.
//!
//! Output is CSV on stdout so it can be pasted straight into a spreadsheet.

use std::time::Instant;

use crate::error::Result;
use crate::simulation::engine::{CollisionMethod, Engine, ForceMethod};
use crate::simulation::forces::{Acceleration, DirectGravity, TreeGravity};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, Particles};
use crate::simulation::system::ParticleSystem;

/// Deterministic particle cloud of size `n`, no rand needed.
pub fn make_particles(n: usize) -> Particles {
    let mut particles = Particles::with_capacity(n);
    for i in 0..n {
        let i_f = i as f32;
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0,
        );
        particles.push(x, NVec3::zeros(), 1.0, NVec3::repeat(1.0));
    }
    particles
}

fn bench_params() -> Parameters {
    Parameters {
        g: 0.1,
        particle_radius: 0.005,
        theta: 0.7,
        ..Parameters::default()
    }
}

/// Time one gravity evaluation, direct vs tree, for growing N.
pub fn bench_gravity() {
    let params = bench_params();
    let direct = DirectGravity { g: params.g, cutoff: params.collision_distance() };
    let tree = TreeGravity {
        g: params.g,
        cutoff: params.collision_distance(),
        theta: params.theta,
        leaf_capacity: params.leaf_capacity,
    };

    println!("N,direct_s,tree_s");
    for n in [200, 400, 800, 1600, 3200, 6400] {
        let particles = make_particles(n);
        let mut out = vec![NVec3::zeros(); n];

        // Warm up
        direct.acceleration(&particles, &mut out);
        tree.acceleration(&particles, &mut out);

        let t0 = Instant::now();
        direct.acceleration(&particles, &mut out);
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        tree.acceleration(&particles, &mut out);
        let dt_tree = t1.elapsed().as_secs_f64();

        println!("{n},{dt_direct:.6},{dt_tree:.6}");
    }
}

/// Time full simulation steps (tree rebuild, gravity, collisions,
/// integration) with the direct and tree engines.
pub fn bench_step(threads: usize) -> Result<()> {
    let steps = 3;
    let dt = 0.001;

    println!("N,direct_ms,tree_ms");
    for n in [200, 400, 800, 1600, 3200, 6400, 12800] {
        let mut timings = [0.0; 2];
        for (slot, (force, collisions)) in [
            (ForceMethod::Direct, CollisionMethod::Direct),
            (ForceMethod::BarnesHut, CollisionMethod::Tree),
        ]
        .into_iter()
        .enumerate()
        {
            let engine = Engine { force, collisions, threads };
            let mut sys = ParticleSystem::from_particles(make_particles(n), bench_params(), engine)?;

            // Warm-up
            sys.step(dt);

            let t0 = Instant::now();
            for _ in 0..steps {
                sys.step(dt);
            }
            timings[slot] = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;
        }
        println!("{},{:.6},{:.6}", n, timings[0], timings[1]);
    }
    Ok(())
}
