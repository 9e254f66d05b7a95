//! Configuration types for loading simulation scenarios from YAML.
//!
//! A thin, `serde`-deserializable representation of a run:
//!
//! - [`EngineConfig`]     – force/collision methods, opening angle, threads
//! - [`ParametersConfig`] – physical constants and seeding controls
//! - [`RunConfig`]        – step size and step count for the headless driver
//! - [`GroupConfig`]      – one spherical clump of particles ("planet")
//! - [`SimulationConfig`] – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   force: "barnes_hut"     # or "direct"
//!   collisions: "tree"      # or "direct"
//!   theta: 0.5
//!   leaf_capacity: 1
//!   threads: 0              # 0 -> rayon global pool
//!
//! parameters:
//!   G: 1.0
//!   mass: 1.0
//!   particle_radius: 0.02
//!   max_seed_attempts: 100000
//!   seed: 42
//!
//! run:
//!   dt: 0.001
//!   steps: 100
//!
//! groups:
//!   - center: [0.0, 0.0, 0.0]
//!     planet_radius: 0.7
//!     particle_count: 2000
//!     velocity: [0.25, 0.25, 0.25]
//! ```
//!
//! Only `groups` is required; everything else falls back to defaults.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::simulation::barnes_hut::DEFAULT_LEAF_CAPACITY;
use crate::simulation::engine::{CollisionMethod, Engine, ForceMethod};
use crate::simulation::params::{Parameters, DEFAULT_MAX_SEED_ATTEMPTS, DEFAULT_THETA};
use crate::simulation::states::NVec3;

/// Tints handed out to groups that don't set one.
pub const DEFAULT_PALETTE: [[f32; 3]; 4] = [
    [1.0, 0.55, 0.2],
    [0.3, 0.6, 1.0],
    [0.45, 0.9, 0.45],
    [0.9, 0.4, 0.8],
];

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub force: ForceMethod,
    pub collisions: CollisionMethod,
    pub theta: f32,
    pub leaf_capacity: usize,
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            force: ForceMethod::default(),
            collisions: CollisionMethod::default(),
            theta: DEFAULT_THETA,
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            threads: 0,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f32,                   // gravitational constant
    pub mass: f32,                // per-particle mass
    pub particle_radius: f32,     // collision distance is twice this
    pub max_seed_attempts: usize, // consecutive rejected draws before giving up
    pub seed: Option<u64>,        // deterministic seeding
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            g: 1.0,
            mass: 1.0,
            particle_radius: 0.02,
            max_seed_attempts: DEFAULT_MAX_SEED_ATTEMPTS,
            seed: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub dt: f32,
    pub steps: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { dt: 0.001, steps: 100 }
    }
}

/// One spherical group of particles.
#[derive(Deserialize, Debug, Clone)]
pub struct GroupConfig {
    pub center: [f32; 3],
    pub planet_radius: f32,
    pub particle_count: usize,
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default)]
    pub color: Option<[f32; 3]>,
}

impl GroupConfig {
    pub fn center(&self) -> NVec3 {
        NVec3::from(self.center)
    }

    pub fn velocity(&self) -> NVec3 {
        NVec3::from(self.velocity)
    }

    /// The group's tint, or the palette entry for position `group`.
    pub fn color(&self, group: usize) -> NVec3 {
        NVec3::from(self.color.unwrap_or(DEFAULT_PALETTE[group % DEFAULT_PALETTE.len()]))
    }
}

/// Top-level configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct SimulationConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub run: RunConfig,
    pub groups: Vec<GroupConfig>,
}

impl SimulationConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(SimError::InvalidConfig("at least one particle group is required".into()));
        }
        self.parameters().validate()?;
        for (i, g) in self.groups.iter().enumerate() {
            if !(g.planet_radius > 0.0) || !g.planet_radius.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "group {i}: planet_radius must be positive, got {}",
                    g.planet_radius
                )));
            }
            let finite = g.center.iter().chain(g.velocity.iter()).all(|c| c.is_finite());
            if !finite {
                return Err(SimError::InvalidConfig(format!("group {i}: center and velocity must be finite")));
            }
        }
        Ok(())
    }

    /// Runtime parameters derived from this configuration.
    pub fn parameters(&self) -> Parameters {
        Parameters {
            g: self.parameters.g,
            mass: self.parameters.mass,
            particle_radius: self.parameters.particle_radius,
            theta: self.engine.theta,
            leaf_capacity: self.engine.leaf_capacity,
            max_seed_attempts: self.parameters.max_seed_attempts,
            seed: self.parameters.seed,
        }
    }

    pub fn engine(&self) -> Engine {
        Engine {
            force: self.engine.force,
            collisions: self.engine.collisions,
            threads: self.engine.threads,
        }
    }

    pub fn total_particles(&self) -> usize {
        self.groups.iter().map(|g| g.particle_count).sum()
    }
}
