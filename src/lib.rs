//! Polydice - physics dice roller core
//!
//! Core modules:
//! - `dice`: Die shape library (hulls, labelled meshes, top-face queries)
//! - `sim`: Rigid-body tray (spawner, stepping loop, settling detector)
//! - `luck`: Exact luck percentiles over landed dice
//! - `notation`: `2d6+1d8+3` parsing and formatting
//! - `renderer`: GPU vertex data and label atlases for an external renderer

pub mod dice;
pub mod error;
pub mod luck;
pub mod notation;
pub mod renderer;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use dice::{DieLibrary, DieType};
pub use error::DiceError;
pub use luck::{LuckReport, LuckTracker};
pub use notation::{DiceCounts, ParsedRoll};
pub use settings::TraySettings;
pub use sim::{DiceTray, Outcome, TickReport};

use glam::{Quat, Vec3};
use rand::Rng;

/// Simulation configuration constants
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 3;
    /// Frame deltas above this are clamped (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Gravity along -Y
    pub const GRAVITY: f32 = -9.82;
    /// Die-vs-anything contact material
    pub const CONTACT_FRICTION: f32 = 0.4;
    pub const CONTACT_RESTITUTION: f32 = 0.6;
    pub const DIE_MASS: f32 = 1.0;
    pub const DIE_DAMPING: f32 = 0.3;

    /// A die is at rest once both speeds drop to or below these
    pub const LINEAR_REST_EPSILON: f32 = 0.05;
    pub const ANGULAR_REST_EPSILON: f32 = 0.05;
    /// Dice below this height fell out of the tray
    pub const FLOOR_THRESHOLD: f32 = -10.0;

    /// Above this many dice, detection runs at `THROTTLE_INTERVAL` instead of every frame
    pub const THROTTLE_DIE_COUNT: usize = 100;
    /// Seconds of simulated time between throttled detections
    pub const THROTTLE_INTERVAL: f32 = 1.0;

    /// Tray walls
    pub const BASE_WALL_SIZE: f32 = 30.0;
    pub const WALL_HEIGHT: f32 = 10.0;
    pub const WALL_EXTRA_CAP: f32 = 1000.0;

    /// Spawn layout
    pub const ZONED_LAYOUT_MAX: u32 = 40;
    pub const BASE_SPAWN_RANGE: f32 = 12.0;
    pub const BASE_SPACING: f32 = 1.5;
    pub const SPAWN_JITTER: f32 = 0.4;
    pub const SPAWN_HEIGHT: f32 = 6.0;

    /// Hard cap on dice in a single roll
    pub const MAX_TOTAL_DICE: u32 = 1000;
}

/// Uniformly distributed random rotation (Shoemake's method)
pub fn random_unit_quat(rng: &mut impl Rng) -> Quat {
    use std::f32::consts::TAU;
    let u1: f32 = rng.random();
    let u2: f32 = rng.random();
    let u3: f32 = rng.random();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
        b * (TAU * u3).cos(),
    )
    .normalize()
}

/// Random direction on the unit sphere
pub fn random_unit_vec3(rng: &mut impl Rng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}
