//! Deterministic lattice noise: scalar value noise, vector noise and curl noise.
//!
//! All functions are pure in position (and time, which callers fold into the
//! position). Value noise hashes the eight surrounding lattice corners and
//! blends them with a quintic fade, so the field is C2 and its finite
//! differences are well behaved.

use crate::rand::hash_u32;
use glam::Vec3;

/// Central-difference step used when taking the curl.
pub const CURL_EPSILON: f32 = 0.1;

// Decorrelating seeds for the three components of the vector potential.
const SEED_X: u32 = 0x68E3_1DA4;
const SEED_Y: u32 = 0xB529_7A4D;
const SEED_Z: u32 = 0x1B56_C4E9;

// Turbulence samples the scalar field three times, far apart from each other.
const TURBULENCE_OFFSET_Y: Vec3 = Vec3::new(31.7, 0.0, 0.0);
const TURBULENCE_OFFSET_Z: Vec3 = Vec3::new(0.0, 47.3, 0.0);

fn lattice(ix: i32, iy: i32, iz: i32, seed: u32) -> f32 {
    let h = hash_u32(ix as u32 ^ hash_u32(iy as u32 ^ hash_u32(iz as u32 ^ seed)));
    (h >> 8) as f32 * (1.0 / 16_777_215.0)
}

fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smooth value noise in [0, 1].
pub fn value_noise(p: Vec3) -> f32 {
    value_noise_seeded(p, 0)
}

/// Value noise with an explicit channel seed.
pub fn value_noise_seeded(p: Vec3, seed: u32) -> f32 {
    let base = p.floor();
    let f = p - base;
    let (ix, iy, iz) = (base.x as i32, base.y as i32, base.z as i32);
    let (u, v, w) = (fade(f.x), fade(f.y), fade(f.z));

    let c = |dx: i32, dy: i32, dz: i32| lattice(ix + dx, iy + dy, iz + dz, seed);

    let x00 = lerp(c(0, 0, 0), c(1, 0, 0), u);
    let x10 = lerp(c(0, 1, 0), c(1, 1, 0), u);
    let x01 = lerp(c(0, 0, 1), c(1, 0, 1), u);
    let x11 = lerp(c(0, 1, 1), c(1, 1, 1), u);
    let y0 = lerp(x00, x10, v);
    let y1 = lerp(x01, x11, v);
    lerp(y0, y1, w)
}

/// Three decorrelated value-noise channels, each in [0, 1].
pub fn vector_noise(p: Vec3) -> Vec3 {
    Vec3::new(
        value_noise_seeded(p, SEED_X),
        value_noise_seeded(p, SEED_Y),
        value_noise_seeded(p, SEED_Z),
    )
}

/// Turbulence vector in [-1, 1]^3.
///
/// Each axis samples the scalar field at its own offset, advanced along that
/// axis by `phase`.
pub fn turbulence(p: Vec3, phase: f32) -> Vec3 {
    let x = value_noise(p + Vec3::new(phase, 0.0, 0.0));
    let y = value_noise(p + TURBULENCE_OFFSET_Y + Vec3::new(0.0, phase, 0.0));
    let z = value_noise(p + TURBULENCE_OFFSET_Z + Vec3::new(0.0, 0.0, phase));
    Vec3::new(x, y, z) * 2.0 - Vec3::ONE
}

/// Divergence-free field: the curl of [`vector_noise`].
pub fn curl_noise(p: Vec3) -> Vec3 {
    curl_noise_with_epsilon(p, CURL_EPSILON)
}

pub fn curl_noise_with_epsilon(p: Vec3, eps: f32) -> Vec3 {
    let dx = Vec3::new(eps, 0.0, 0.0);
    let dy = Vec3::new(0.0, eps, 0.0);
    let dz = Vec3::new(0.0, 0.0, eps);

    let (px, mx) = (vector_noise(p + dx), vector_noise(p - dx));
    let (py, my) = (vector_noise(p + dy), vector_noise(p - dy));
    let (pz, mz) = (vector_noise(p + dz), vector_noise(p - dz));

    let inv = 1.0 / (2.0 * eps);
    Vec3::new(
        ((py.z - my.z) - (pz.y - mz.y)) * inv,
        ((pz.x - mz.x) - (px.z - mx.z)) * inv,
        ((px.y - mx.y) - (py.x - my.x)) * inv,
    )
}
