//! The particle system: owns the particle arrays and advances them.
//!
//! One call to [`ParticleSystem::step`] runs, in order:
//!
//! 1. rebuild the bounding volume from every current position,
//! 2. clear the octree arena and insert all particles,
//! 3. evaluate accelerations (tree walk or direct sum),
//! 4. detect and resolve collisions against a velocity snapshot,
//! 5. integrate with symplectic Euler.
//!
//! The tree is rebuilt from scratch every step; only its allocation survives
//! between steps.

use log::{debug, info, warn};

use crate::configuration::config::SimulationConfig;
use crate::error::Result;
use crate::simulation::barnes_hut::Octree;
use crate::simulation::bounds::Aabb;
use crate::simulation::collisions::CollisionResolver;
use crate::simulation::engine::{CollisionMethod, Engine, ForceMethod};
use crate::simulation::forces::{Acceleration, DirectGravity, TreeGravity};
use crate::simulation::integrator::euler_step;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::seed_particles;
use crate::simulation::states::{NVec3, Particles};

/// Counters from the most recent step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub tree_nodes: usize,
    pub dropped: usize,  // particles outside the root box this step
    pub contacts: usize, // colliding pairs resolved
}

pub struct ParticleSystem {
    particles: Particles,
    params: Parameters,
    engine: Engine,
    tree: Octree,
    bounds: Aabb,
    accel: Vec<NVec3>,
    pool: Option<rayon::ThreadPool>,
    time: f64,
    steps: u64,
    last: StepStats,
}

impl ParticleSystem {
    /// Seed every group of `cfg` (validating it first) and set up the worker pool.
    pub fn new(cfg: &SimulationConfig) -> Result<Self> {
        let particles = seed_particles(cfg)?;
        Self::from_particles(particles, cfg.parameters(), cfg.engine())
    }

    /// Wrap an existing particle set.
    pub fn from_particles(particles: Particles, params: Parameters, engine: Engine) -> Result<Self> {
        params.validate()?;
        if !particles.is_consistent() {
            return Err(crate::error::SimError::InvalidConfig(
                "particle columns have different lengths".into(),
            ));
        }

        let pool = if engine.threads > 0 {
            Some(rayon::ThreadPoolBuilder::new().num_threads(engine.threads).build()?)
        } else {
            None
        };

        let bounds = Aabb::from_points(particles.position.iter()).to_cube();
        let n = particles.len();

        info!(
            "particle system ready: {} particles, force {:?}, collisions {:?}, theta {}, threads {}",
            n,
            engine.force,
            engine.collisions,
            params.theta,
            if engine.threads == 0 { rayon::current_num_threads() } else { engine.threads }
        );

        Ok(Self {
            particles,
            tree: Octree::new(bounds, params.leaf_capacity),
            bounds,
            accel: vec![NVec3::zeros(); n],
            params,
            engine,
            pool,
            time: 0.0,
            steps: 0,
            last: StepStats::default(),
        })
    }

    /// Advance the simulation by `dt` seconds. Non-finite or negative `dt` is ignored.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            warn!("ignoring step with dt = {dt}");
            return;
        }
        match self.pool.take() {
            Some(pool) => {
                pool.install(|| self.advance(dt));
                self.pool = Some(pool);
            }
            None => self.advance(dt),
        }
    }

    fn advance(&mut self, dt: f32) {
        let cutoff = self.params.collision_distance();

        // Bounding volume and tree
        self.bounds = Aabb::from_points(self.particles.position.iter()).to_cube();
        self.tree.clear(self.bounds);
        let dropped = self.tree.insert_all(&self.particles.position, &self.particles.mass);
        if dropped > 0 {
            debug!("{dropped} particles fell outside the root box and were left out of this step's tree");
        }

        // Gravity
        self.accel.resize(self.particles.len(), NVec3::zeros());
        match self.engine.force {
            ForceMethod::BarnesHut => {
                let gravity = TreeGravity {
                    g: self.params.g,
                    cutoff,
                    theta: self.params.theta,
                    leaf_capacity: self.params.leaf_capacity,
                };
                gravity.acceleration_with(&self.tree, &self.particles.position, &mut self.accel);
            }
            ForceMethod::Direct => {
                DirectGravity { g: self.params.g, cutoff }.acceleration(&self.particles, &mut self.accel);
            }
        }

        // Collisions
        let resolver = CollisionResolver::new(cutoff);
        let contacts = match self.engine.collisions {
            CollisionMethod::Tree => resolver.detect_with_tree(&self.tree, &self.particles.position),
            CollisionMethod::Direct => resolver.detect_direct(&self.particles.position),
        };
        resolver.resolve(
            &contacts,
            &self.particles.position,
            &self.particles.mass,
            &mut self.particles.velocity,
        );

        // Integrate
        euler_step(&mut self.particles.position, &mut self.particles.velocity, &self.accel, dt);

        self.time += f64::from(dt);
        self.steps += 1;
        self.last = StepStats {
            tree_nodes: self.tree.len(),
            dropped,
            contacts: contacts.len(),
        };
        debug!(
            "step {}: t = {:.4}, {} nodes, {} contacts",
            self.steps, self.time, self.last.tree_nodes, self.last.contacts
        );
    }

    /// Positions for the renderer, one per particle.
    pub fn positions(&self) -> &[NVec3] {
        &self.particles.position
    }

    /// Colours for the renderer, parallel to [`ParticleSystem::positions`].
    pub fn colors(&self) -> &[NVec3] {
        &self.particles.color
    }

    pub fn velocities(&self) -> &[NVec3] {
        &self.particles.velocity
    }

    pub fn masses(&self) -> &[f32] {
        &self.particles.mass
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    /// Accelerations computed during the last step.
    pub fn accelerations(&self) -> &[NVec3] {
        &self.accel
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The tree built during the last step.
    pub fn tree(&self) -> &Octree {
        &self.tree
    }

    /// Root box used during the last step.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn last_step(&self) -> StepStats {
        self.last
    }

    pub fn total_mass(&self) -> f32 {
        self.particles.total_mass()
    }

    pub fn total_momentum(&self) -> NVec3 {
        self.particles.total_momentum()
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.particles.kinetic_energy()
    }
}
