pub mod states;
pub mod params;
pub mod engine;
pub mod bounds;
pub mod forces;
pub mod collisions;
pub mod integrator;
pub mod scenario;
pub mod barnes_hut;
pub mod system;
