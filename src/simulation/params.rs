//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - gravitational constant and particle geometry,
//! - Barnes–Hut opening angle and leaf capacity,
//! - retry cap for overlap-free seeding

use crate::error::{Result, SimError};
use crate::simulation::barnes_hut::DEFAULT_LEAF_CAPACITY;

pub const DEFAULT_THETA: f32 = 0.5;
pub const DEFAULT_MAX_SEED_ATTEMPTS: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub g: f32,                    // gravitational constant
    pub mass: f32,                 // mass given to every seeded particle
    pub particle_radius: f32,      // physical radius of one particle
    pub theta: f32,                // opening angle, 0 = exact
    pub leaf_capacity: usize,      // points per leaf before it splits
    pub max_seed_attempts: usize,  // consecutive rejected draws before seeding gives up
    pub seed: Option<u64>,         // deterministic seeding when set
}

impl Parameters {
    /// Two particles closer than this overlap.
    pub fn collision_distance(&self) -> f32 {
        2.0 * self.particle_radius
    }

    /// Reject values the force walk, collision pass or seeding cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.particle_radius >= 0.0) || !self.particle_radius.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "particle_radius must be a finite non-negative number, got {}",
                self.particle_radius
            )));
        }
        if !(self.mass > 0.0) || !self.mass.is_finite() {
            return Err(SimError::InvalidConfig(format!("mass must be positive, got {}", self.mass)));
        }
        if !self.g.is_finite() {
            return Err(SimError::InvalidConfig(format!("G must be finite, got {}", self.g)));
        }
        if !(self.theta >= 0.0) || !self.theta.is_finite() {
            return Err(SimError::InvalidConfig(format!("theta must be >= 0, got {}", self.theta)));
        }
        if self.leaf_capacity == 0 {
            return Err(SimError::InvalidConfig("leaf_capacity must be at least 1".into()));
        }
        if self.max_seed_attempts == 0 {
            return Err(SimError::InvalidConfig("max_seed_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: 1.0,
            mass: 1.0,
            particle_radius: 0.02,
            theta: DEFAULT_THETA,
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            max_seed_attempts: DEFAULT_MAX_SEED_ATTEMPTS,
            seed: None,
        }
    }
}
