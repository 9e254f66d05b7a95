pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{NVec3, Particles};
pub use simulation::bounds::Aabb;
pub use simulation::barnes_hut::{LeafPoint, Node, NodeKind, Octree, MAX_DEPTH};
pub use simulation::forces::{point_mass_acceleration, Acceleration, DirectGravity, TreeGravity};
pub use simulation::collisions::{elastic_delta, CollisionResolver, Contact};
pub use simulation::integrator::euler_step;
pub use simulation::engine::{CollisionMethod, Engine, ForceMethod};
pub use simulation::params::Parameters;
pub use simulation::scenario::{seed_particles, SeedGrid};
pub use simulation::system::{ParticleSystem, StepStats};

pub use configuration::config::{EngineConfig, GroupConfig, ParametersConfig, RunConfig, SimulationConfig};

pub use error::{Result, SimError};

pub use benchmark::benchmark::{bench_gravity, bench_step};
