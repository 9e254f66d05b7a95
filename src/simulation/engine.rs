//! High-level runtime engine settings
//!
//! Selects how gravity and collisions are evaluated and how many worker
//! threads the parallel passes use.

use serde::Deserialize;

/// How accelerations are computed each step.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceMethod {
    #[serde(rename = "direct")] // exact O(N^2) pairwise sum
    Direct,

    #[default]
    #[serde(rename = "barnes_hut")] // octree walk with opening angle theta
    BarnesHut,
}

/// How colliding pairs are found each step.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionMethod {
    #[serde(rename = "direct")] // O(N^2) scan
    Direct,

    #[default]
    #[serde(rename = "tree")] // range queries on the step's octree
    Tree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Engine {
    pub force: ForceMethod,
    pub collisions: CollisionMethod,
    pub threads: usize, // 0 = rayon global pool
}
