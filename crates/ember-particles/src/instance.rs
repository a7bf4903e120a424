//! Render-attribute packing for the external rasterizer.
//!
//! Each live particle becomes one [`ParticleInstance`]: 17 consecutive `f32`
//! values in a fixed order. The rasterizer binds the buffer by this layout, so
//! field order must not change without updating it.

use crate::emitter::{ColorMode, EmitterConfig};
use crate::particle::Particle;
use crate::pool::{ParticlePool, SlotIndex};
use bytemuck::{Pod, Zeroable};
use ember_core::{Color, Curve, Gradient};
use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Scalars per packed particle.
pub const FLOATS_PER_INSTANCE: usize = 17;

/// One packed particle. 68 bytes, tightly packed `f32`s.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    /// Size multiplier times the size curve
    pub size: f32,
    /// `age / life`
    pub life_t: f32,
    pub seed: f32,
    pub spin_axis: [f32; 3],
    pub spin_rate: f32,
    pub velocity: [f32; 3],
    pub opacity: f32,
    pub color: [f32; 3],
}

/// Camera pose used for back-to-front ordering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSort {
    pub camera_position: Vec3,
    pub camera_forward: Vec3,
}

/// Read-only render curves, supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Size over life; empty means 1
    pub size_curve: Curve,
    /// Opacity over life; empty means 1
    pub opacity_curve: Curve,
    /// Color over life for `ColorMode::Gradient`; empty means white
    pub gradient: Gradient,
    /// Far-to-near ordering, needed only for order-dependent blending
    pub sort: Option<DepthSort>,
}

/// How a particle's color is resolved at pack time.
#[derive(Debug, Clone, Copy)]
pub struct ColorSource {
    pub mode: ColorMode,
    pub solid: Color,
}

impl ColorSource {
    pub fn from_emitter(emitter: &EmitterConfig) -> Self {
        Self {
            mode: emitter.color_mode,
            solid: emitter.color,
        }
    }
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle, render: &RenderConfig, colors: ColorSource) -> Self {
        let life_t = p.life_fraction();
        let size = (p.size * render.size_curve.evaluate(life_t, 1.0)).max(0.0);
        let opacity = render.opacity_curve.evaluate(life_t, 1.0).clamp(0.0, 1.0);
        let color = match colors.mode {
            ColorMode::Solid => colors.solid,
            ColorMode::Random => p.color,
            ColorMode::Gradient => render.gradient.sample(life_t),
        };
        Self {
            position: p.position.to_array(),
            size,
            life_t,
            seed: p.seed,
            spin_axis: p.spin_axis.to_array(),
            spin_rate: p.spin_rate,
            velocity: p.velocity.to_array(),
            opacity,
            color: color.to_array(),
        }
    }
}

/// Walks live slots and writes the instance buffer.
#[derive(Default)]
pub struct InstanceBuilder {
    order: Vec<SlotIndex>,
    depths: Vec<f32>,
    instances: Vec<ParticleInstance>,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack every live particle, in slot order or depth order.
    pub fn build(
        &mut self,
        pool: &ParticlePool,
        render: &RenderConfig,
        colors: ColorSource,
    ) -> &[ParticleInstance] {
        self.collect_order(pool, render.sort.as_ref());
        self.instances.clear();
        self.instances.reserve(self.order.len());
        for &slot in &self.order {
            let p = &pool.slots()[slot.index()];
            self.instances
                .push(ParticleInstance::from_particle(p, render, colors));
        }
        &self.instances
    }

    /// Same output as [`InstanceBuilder::build`], packed on the rayon pool.
    pub fn build_parallel(
        &mut self,
        pool: &ParticlePool,
        render: &RenderConfig,
        colors: ColorSource,
    ) -> &[ParticleInstance] {
        self.collect_order(pool, render.sort.as_ref());
        let slots = pool.slots();
        self.order
            .par_iter()
            .map(|slot| ParticleInstance::from_particle(&slots[slot.index()], render, colors))
            .collect_into_vec(&mut self.instances);
        &self.instances
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// The packed buffer as `live_count * 17` floats
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    fn collect_order(&mut self, pool: &ParticlePool, sort: Option<&DepthSort>) {
        self.order.clear();
        self.order.extend(pool.iter_alive().map(|(slot, _)| slot));

        let Some(sort) = sort else {
            return;
        };
        let forward = sort.camera_forward.try_normalize().unwrap_or(Vec3::NEG_Z);
        let slots = pool.slots();
        self.depths.clear();
        self.depths.resize(slots.len(), 0.0);
        for &slot in &self.order {
            self.depths[slot.index()] =
                (slots[slot.index()].position - sort.camera_position).dot(forward);
        }
        let depths = &self.depths;
        // Stable, so equal depths keep slot order
        self.order
            .sort_by(|a, b| depths[b.index()].total_cmp(&depths[a.index()]));
    }
}
