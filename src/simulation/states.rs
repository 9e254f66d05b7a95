//! Core state types for the particle simulation.
//!
//! Particles are stored columnar (one `Vec` per attribute) rather than as a
//! `Vec` of structs, so the force and integration passes stream through
//! contiguous memory and the position/colour arrays can be handed to a
//! renderer without repacking.
//!
//! Index `i` denotes the same logical particle in every column.

use nalgebra::Vector3;

pub type NVec3 = Vector3<f32>;

#[derive(Debug, Clone, Default)]
pub struct Particles {
    pub position: Vec<NVec3>, // world-space position
    pub velocity: Vec<NVec3>, // velocity
    pub mass: Vec<f32>,       // scalar mass
    pub color: Vec<NVec3>,    // rgb tint, rendering pass-through
}

impl Particles {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            position: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
            mass: Vec::with_capacity(n),
            color: Vec::with_capacity(n),
        }
    }

    /// Append one particle to every column.
    pub fn push(&mut self, position: NVec3, velocity: NVec3, mass: f32, color: NVec3) {
        self.position.push(position);
        self.velocity.push(velocity);
        self.mass.push(mass);
        self.color.push(color);
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// True when all columns have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.position.len();
        self.velocity.len() == n && self.mass.len() == n && self.color.len() == n
    }

    pub fn total_mass(&self) -> f32 {
        self.mass.iter().sum()
    }

    /// Total linear momentum `sum(m_i * v_i)`.
    pub fn total_momentum(&self) -> NVec3 {
        self.velocity
            .iter()
            .zip(self.mass.iter())
            .fold(NVec3::zeros(), |acc, (v, m)| acc + v * *m)
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.velocity
            .iter()
            .zip(self.mass.iter())
            .map(|(v, m)| 0.5 * m * v.norm_squared())
            .sum()
    }
}
