//! Headless simulation command

use crate::preset::Preset;
use anyhow::{Context, Result};
use ember_particles::{ExecutionMode, FrameInput, SimulationContext, StepReport, FLOATS_PER_INSTANCE};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

pub struct RunArgs {
    pub preset: Option<String>,
    pub frames: Option<u32>,
    pub dt: Option<f32>,
    pub seed: Option<u32>,
    pub parallel: bool,
    pub burst: Option<u32>,
    pub every: u32,
    pub dump: Option<String>,
}

/// Totals accumulated over a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u32,
    pub spawned: u64,
    pub released: u64,
    pub clipped_frames: u32,
    pub peak_live: usize,
    pub final_live: usize,
    pub capacity: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, report: &StepReport) {
        self.frames += 1;
        self.spawned += report.spawned as u64;
        self.released += report.released as u64;
        if report.clipped {
            self.clipped_frames += 1;
        }
        self.peak_live = self.peak_live.max(report.live);
        self.final_live = report.live;
        self.capacity = report.capacity;
    }
}

#[derive(Serialize)]
struct InstanceDump<'a> {
    frames: u64,
    live: usize,
    floats_per_instance: usize,
    data: &'a [f32],
}

/// Apply command-line overrides on top of the preset's settings.
pub fn apply_overrides(preset: &mut Preset, args: &RunArgs) {
    let sim = &mut preset.simulation;
    if let Some(frames) = args.frames {
        sim.frames = frames;
    }
    if let Some(dt) = args.dt {
        sim.dt = dt;
    }
    if let Some(seed) = args.seed {
        sim.seed = seed;
    }
    if let Some(burst) = args.burst {
        sim.burst = burst;
    }
    if args.parallel {
        sim.mode = ExecutionMode::Parallel;
    }
}

/// Step `ctx` through the preset's frames, calling `on_frame` after each.
pub fn simulate(
    ctx: &mut SimulationContext,
    preset: &Preset,
    mut on_frame: impl FnMut(u32, &StepReport),
) -> RunSummary {
    let sim = &preset.simulation;
    if sim.burst > 0 {
        ctx.queue_burst(sim.burst);
    }

    let mut summary = RunSummary::default();
    let started = Instant::now();
    for frame in 0..sim.frames {
        let report = ctx.step(&FrameInput::new(&preset.emitter, &preset.forces, sim.dt));
        summary.record(&report);
        on_frame(frame + 1, &report);
    }
    summary.elapsed = started.elapsed();
    summary.final_live = ctx.live_count();
    summary.capacity = ctx.capacity();
    summary
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut preset = match &args.preset {
        Some(path) => Preset::load(Path::new(path))
            .with_context(|| format!("failed to load preset '{}'", path))?,
        None => Preset::default(),
    };
    apply_overrides(&mut preset, &args);
    preset.validate()?;

    for field in preset.clamped_fields() {
        log::warn!("{field} is out of range and will be clamped");
    }

    let sim = preset.simulation.clone();
    log::info!(
        "running {} frame(s) at dt={} with capacity {} ({:?})",
        sim.frames,
        sim.dt,
        sim.capacity,
        sim.mode
    );

    let mut ctx = SimulationContext::new(sim.capacity, sim.seed).with_mode(sim.mode);
    let every = args.every;
    let summary = simulate(&mut ctx, &preset, |frame, report| {
        if every > 0 && frame % every == 0 {
            println!(
                "  frame {:>6}: live {:>8}  spawned {:>6}  released {:>6}{}",
                frame,
                report.live,
                report.spawned,
                report.released,
                if report.clipped { "  (clipped)" } else { "" }
            );
        }
    });

    let frames = ctx.frame();
    let floats = ctx.build_instances(&preset.render, &preset.emitter);
    let float_count = floats.len();

    print_summary(&summary, float_count);

    if let Some(path) = &args.dump {
        let dump = InstanceDump {
            frames,
            live: float_count / FLOATS_PER_INSTANCE,
            floats_per_instance: FLOATS_PER_INSTANCE,
            data: floats,
        };
        let json = serde_json::to_string_pretty(&dump)?;
        std::fs::write(path, json).with_context(|| format!("failed to write '{}'", path))?;
        println!("Instance buffer written to {}", path);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, float_count: usize) {
    let ms = summary.elapsed.as_secs_f64() * 1000.0;
    let per_frame = if summary.frames > 0 {
        ms / summary.frames as f64
    } else {
        0.0
    };

    println!("Simulated {} frame(s) in {:.2} ms ({:.3} ms/frame)", summary.frames, ms, per_frame);
    println!("  Spawned:        {}", summary.spawned);
    println!("  Released:       {}", summary.released);
    println!("  Clipped frames: {}", summary.clipped_frames);
    println!("  Peak live:      {}", summary.peak_live);
    println!("  Final live:     {} / {}", summary.final_live, summary.capacity);
    println!("  Instance data:  {} floats", float_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            preset: None,
            frames: None,
            dt: None,
            seed: None,
            parallel: false,
            burst: None,
            every: 0,
            dump: None,
        }
    }

    #[test]
    fn overrides_replace_preset_values() {
        let mut preset = Preset::default();
        let args = RunArgs {
            frames: Some(12),
            dt: Some(0.05),
            seed: Some(99),
            parallel: true,
            burst: Some(3),
            ..args()
        };
        apply_overrides(&mut preset, &args);
        assert_eq!(preset.simulation.frames, 12);
        assert_eq!(preset.simulation.dt, 0.05);
        assert_eq!(preset.simulation.seed, 99);
        assert_eq!(preset.simulation.burst, 3);
        assert_eq!(preset.simulation.mode, ExecutionMode::Parallel);
    }

    #[test]
    fn missing_overrides_keep_preset() {
        let mut preset = Preset::default();
        apply_overrides(&mut preset, &args());
        assert_eq!(preset, Preset::default());
    }

    #[test]
    fn simulate_accounts_for_every_particle() {
        let mut preset = Preset::from_toml_str(
            r#"
[simulation]
capacity = 64
frames = 240
burst = 10

[emitter]
rate = 120.0
life_seconds = 0.5
"#,
        )
        .unwrap();
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            preset.simulation.mode = mode;
            let mut ctx = SimulationContext::new(64, 1).with_mode(mode);
            let mut calls = 0;
            let summary = simulate(&mut ctx, &preset, |_, _| calls += 1);
            assert_eq!(calls, 240);
            assert_eq!(summary.frames, 240);
            assert_eq!(summary.spawned - summary.released, summary.final_live as u64);
            assert!(summary.peak_live <= 64);
            assert!(summary.final_live > 0);
        }
    }

    #[test]
    fn clipped_frames_are_counted() {
        let preset = Preset::from_toml_str(
            r#"
[simulation]
capacity = 8
frames = 10

[emitter]
rate = 6000.0
life_seconds = 10.0
"#,
        )
        .unwrap();
        let mut ctx = SimulationContext::new(8, 1);
        let summary = simulate(&mut ctx, &preset, |_, _| {});
        assert_eq!(summary.spawned, 8);
        assert_eq!(summary.clipped_frames, 10);
        assert_eq!(summary.final_live, 8);
    }
}
