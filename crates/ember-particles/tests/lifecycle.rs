//! End-to-end lifecycle scenarios, run against both execution models.

use ember_particles::{
    DirectionMode, EmitterConfig, ExecutionMode, ForceConfig, FrameInput, GroundConfig,
    NoiseMode, SimulationContext, VortexConfig,
};
use glam::Vec3;

const MODES: [ExecutionMode; 2] = [ExecutionMode::Sequential, ExecutionMode::Parallel];

fn fountain() -> EmitterConfig {
    EmitterConfig {
        rate: 50.0,
        direction: DirectionMode::Directional,
        cone_angle: 0.0,
        initial_speed: 1.0,
        life_seconds: 2.0,
        ..Default::default()
    }
}

fn assert_invariants(ctx: &SimulationContext) {
    let pool = ctx.pool();
    assert!(pool.check_partition(), "free/alive partition broken");
    assert_eq!(pool.free_count() + pool.live_count(), pool.capacity());
    for (_, p) in pool.iter_alive() {
        assert!(p.age >= 0.0 && p.age < p.life, "age {} life {}", p.age, p.life);
    }
}

#[test]
fn scenario_a_steady_emission() {
    for mode in MODES {
        let emitter = fountain();
        let forces = ForceConfig::default();
        let mut ctx = SimulationContext::new(100, 7).with_mode(mode);

        for _ in 0..60 {
            ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
            assert_invariants(&ctx);
        }

        let live = ctx.live_count();
        assert!((49..=51).contains(&live), "{mode:?}: live {live}");
        for (_, p) in ctx.pool().iter_alive() {
            assert!((p.position.y - p.age).abs() < 1e-4, "{mode:?}: y {} age {}", p.position.y, p.age);
            assert!(p.position.x.abs() < 1e-5 && p.position.z.abs() < 1e-5);
        }
    }
}

#[test]
fn scenario_b_oversubscribed_single_step() {
    for mode in MODES {
        let emitter = EmitterConfig {
            rate: 1000.0,
            ..Default::default()
        };
        let forces = ForceConfig::default();
        let mut ctx = SimulationContext::new(10, 3).with_mode(mode);

        let report = ctx.step(&FrameInput::new(&emitter, &forces, 1.0));
        assert_eq!(report.spawned, 10, "{mode:?}");
        assert!(report.clipped);
        assert_eq!(ctx.emission().accumulator(), 0.0);
        assert_eq!(ctx.live_count(), 10);
        assert_eq!(ctx.pool().free_count(), 0);
        assert_invariants(&ctx);

        // Once slots free up, no backlog is waiting to burst out
        let follow = ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
        assert!(follow.requested <= 17, "{mode:?}: requested {}", follow.requested);
    }
}

#[test]
fn scenario_c_ground_bounce_halves_and_flips() {
    for mode in MODES {
        let emitter = EmitterConfig {
            rate: 0.0,
            position: Vec3::new(0.0, 1.0, 0.0),
            initial_speed: 0.0,
            life_seconds: 100.0,
            ..Default::default()
        };
        let forces = ForceConfig {
            gravity: -9.8,
            ground: GroundConfig {
                enabled: true,
                level: 0.0,
                bounce: 0.5,
            },
            ..Default::default()
        };
        let dt = 1.0 / 60.0;
        let mut ctx = SimulationContext::new(4, 11).with_mode(mode);
        ctx.queue_burst(1);

        let mut previous_vy = 0.0;
        let mut bounced = false;
        for _ in 0..120 {
            ctx.step(&FrameInput::new(&emitter, &forces, dt));
            let (_, p) = ctx.pool().iter_alive().next().expect("particle alive");
            if p.velocity.y > 0.0 {
                let impact = previous_vy - 9.8 * dt;
                assert!((p.velocity.y + impact * 0.5).abs() < 1e-4, "{mode:?}");
                assert_eq!(p.position.y, 0.0);
                bounced = true;
                break;
            }
            previous_vy = p.velocity.y;
        }
        assert!(bounced, "{mode:?}: particle never reached the ground");
    }
}

#[test]
fn repeated_bounces_lose_height() {
    let emitter = EmitterConfig {
        rate: 0.0,
        position: Vec3::new(0.0, 2.0, 0.0),
        initial_speed: 0.0,
        life_seconds: 100.0,
        ..Default::default()
    };
    let forces = ForceConfig {
        gravity: -9.8,
        ground: GroundConfig {
            enabled: true,
            level: 0.0,
            bounce: 0.7,
        },
        ..Default::default()
    };
    let mut ctx = SimulationContext::new(1, 5);
    ctx.queue_burst(1);

    let mut apexes = Vec::new();
    let mut last_vy = 0.0f32;
    for _ in 0..2000 {
        ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 240.0));
        let (_, p) = ctx.pool().iter_alive().next().expect("particle alive");
        if last_vy > 0.0 && p.velocity.y <= 0.0 {
            apexes.push(p.position.y);
        }
        last_vy = p.velocity.y;
        if apexes.len() == 3 {
            break;
        }
    }
    assert_eq!(apexes.len(), 3);
    assert!(apexes[0] < 2.0);
    assert!(apexes[1] < apexes[0] && apexes[2] < apexes[1], "{apexes:?}");
}

#[test]
fn ground_is_ignored_when_emitter_is_below_it() {
    let emitter = EmitterConfig {
        rate: 0.0,
        position: Vec3::new(0.0, -1.0, 0.0),
        initial_speed: 0.0,
        life_seconds: 10.0,
        ..Default::default()
    };
    let forces = ForceConfig {
        gravity: -9.8,
        ground: GroundConfig {
            enabled: true,
            level: 0.0,
            bounce: 1.0,
        },
        ..Default::default()
    };
    let mut ctx = SimulationContext::new(1, 5);
    ctx.queue_burst(1);
    for _ in 0..30 {
        ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
    }
    let (_, p) = ctx.pool().iter_alive().next().unwrap();
    assert!(p.position.y < -1.0);
}

#[test]
fn expired_particles_are_released_in_the_same_step() {
    for mode in MODES {
        let emitter = EmitterConfig {
            rate: 120.0,
            life_seconds: 0.1,
            ..Default::default()
        };
        let forces = ForceConfig::default();
        let mut ctx = SimulationContext::new(64, 2).with_mode(mode);
        let mut released = 0;
        for _ in 0..120 {
            released += ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0)).released;
            assert_invariants(&ctx);
            for p in ctx.pool().slots() {
                assert!(!(p.alive && p.age >= p.life));
            }
        }
        assert!(released > 100, "{mode:?}: released {released}");
    }
}

#[test]
fn zero_and_huge_dt_are_safe() {
    for mode in MODES {
        let emitter = EmitterConfig {
            rate: 500.0,
            ..Default::default()
        };
        let forces = ForceConfig {
            gravity: -9.8,
            drag: 0.5,
            ..Default::default()
        };
        let mut ctx = SimulationContext::new(32, 8).with_mode(mode);
        for dt in [0.0, 1e6, 0.0, f32::NAN, -1.0, f32::INFINITY, 1.0 / 60.0] {
            ctx.step(&FrameInput::new(&emitter, &forces, dt));
            assert_invariants(&ctx);
            for (_, p) in ctx.pool().iter_alive() {
                assert!(p.position.is_finite() && p.velocity.is_finite());
            }
        }
    }
}

#[test]
fn nan_forces_never_reach_the_pool() {
    let emitter = EmitterConfig::default();
    let forces = ForceConfig {
        gravity: f32::NAN,
        turbulence_strength: f32::NAN,
        wind: Vec3::splat(f32::NAN),
        vortex: VortexConfig {
            enabled: true,
            radius: f32::NAN,
            strength: f32::INFINITY,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut ctx = SimulationContext::new(64, 1);
    for _ in 0..30 {
        ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
    }
    assert!(ctx.live_count() > 0);
    for (_, p) in ctx.pool().iter_alive() {
        assert!(p.position.is_finite() && p.velocity.is_finite());
    }
}

#[test]
fn execution_models_agree() {
    let emitter = EmitterConfig {
        rate: 300.0,
        direction: DirectionMode::Spherical,
        initial_speed: 2.0,
        speed_random: 0.3,
        life_seconds: 0.5,
        life_random: 0.2,
        ..Default::default()
    };
    let forces = ForceConfig {
        noise_mode: NoiseMode::Curl,
        curl_strength: 1.5,
        gravity: -2.0,
        drag: 0.1,
        vortex: VortexConfig {
            enabled: true,
            strength: 3.0,
            radius: 2.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut seq = SimulationContext::new(128, 99).with_mode(ExecutionMode::Sequential);
    let mut par = SimulationContext::new(128, 99).with_mode(ExecutionMode::Parallel);

    for _ in 0..90 {
        let a = seq.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
        let b = par.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
        assert_eq!(a.spawned, b.spawned);
        assert_eq!(a.released, b.released);
        assert_eq!(a.live, b.live);
    }

    let sorted = |ctx: &SimulationContext| {
        let mut v: Vec<(f32, f32)> = ctx
            .pool()
            .iter_alive()
            .map(|(_, p)| (p.age, p.position.length()))
            .collect();
        v.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        v
    };
    let (a, b) = (sorted(&seq), sorted(&par));
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert!((x.0 - y.0).abs() < 1e-5);
        assert!((x.1 - y.1).abs() < 1e-3);
    }
}

#[test]
fn moving_emitter_leaves_a_trail() {
    let forces = ForceConfig::default();
    let mut ctx = SimulationContext::new(256, 4);
    let mut emitter = EmitterConfig {
        rate: 600.0,
        initial_speed: 0.0,
        ..Default::default()
    };
    ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));
    let before = ctx.live_count();

    emitter.position = Vec3::new(5.0, 0.0, 0.0);
    ctx.step(&FrameInput::new(&emitter, &forces, 1.0 / 60.0));

    let xs: Vec<f32> = ctx
        .pool()
        .iter_alive()
        .map(|(_, p)| p.position.x)
        .filter(|&x| x > 0.0)
        .collect();
    assert_eq!(xs.len(), ctx.live_count() - before);
    let spread = xs.iter().cloned().fold(f32::MIN, f32::max) - xs.iter().cloned().fold(f32::MAX, f32::min);
    assert!(spread > 2.0, "spawns clustered: spread {spread}");
}
