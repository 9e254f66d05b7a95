//! Fixed-step time integration.
//!
//! The particle system advances with symplectic (semi-implicit) Euler: the
//! velocity is kicked first, then the position drifts with the new velocity.
//!
//! `v_n+1 = v_n + dt * a_n`
//! `x_n+1 = x_n + dt * v_n+1`

use rayon::prelude::*;

use crate::simulation::states::NVec3;

/// Advance every particle by `dt` using the accelerations in `accel`.
pub fn euler_step(position: &mut [NVec3], velocity: &mut [NVec3], accel: &[NVec3], dt: f32) {
    position
        .par_iter_mut()
        .zip(velocity.par_iter_mut())
        .zip(accel.par_iter())
        .for_each(|((x, v), a)| {
            // Kick, then drift with the updated velocity
            *v += a * dt;
            *x += *v * dt;
        });
}
