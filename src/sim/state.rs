//! Tray state and core simulation types
//!
//! A [`DiceTray`] owns the physics world, the live dice and walls, and the
//! RNG for the current roll. Nothing here is global; two trays never share
//! state.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::physics::PhysicsWorld;
use crate::consts::*;
use crate::dice::{DieLibrary, DieType};
use crate::error::Result;
use crate::luck::{LuckReport, LuckTracker};
use crate::notation::DiceCounts;
use crate::settings::TraySettings;

/// Position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// A landed die: its value, type, and where it came to rest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub value: u32,
    #[serde(rename = "type")]
    pub kind: DieType,
    pub position: Vec3,
}

/// Settling status of one die
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DieStatus {
    /// Still moving (or never checked)
    #[default]
    Pending,
    /// At rest; the outcome is frozen until the die is relaunched
    Settled(Outcome),
}

impl DieStatus {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            DieStatus::Pending => None,
            DieStatus::Settled(outcome) => Some(*outcome),
        }
    }
}

/// One die in the tray
#[derive(Debug, Clone)]
pub struct DieInstance {
    pub kind: DieType,
    pub body: RigidBodyHandle,
    pub status: DieStatus,
    /// Last pose copied out of the physics world
    pub pose: Pose,
    /// Draw the collision hull wireframe over this die
    pub show_hull: bool,
}

impl DieInstance {
    pub fn new(kind: DieType, body: RigidBodyHandle, pose: Pose) -> Self {
        Self {
            kind,
            body,
            status: DieStatus::Pending,
            pose,
            show_hull: false,
        }
    }
}

/// A static box bounding the tray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallPiece {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Ceiling and front wall collide but are not drawn
    pub visible: bool,
}

/// Seed of one roll, enough to replay it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Snapshot published after every frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// One entry per die, in spawn order; `None` while still moving
    pub results: Vec<Option<Outcome>>,
    pub all_settled: bool,
    /// Whether detection ran this frame (false when throttled)
    pub detected: bool,
    pub luck: LuckReport,
}

impl TickReport {
    /// Everything pending
    pub fn pending(dice: usize) -> Self {
        Self {
            results: vec![None; dice],
            ..Self::default()
        }
    }
}

/// Simulation context for one tray
pub struct DiceTray {
    pub settings: TraySettings,
    pub(crate) library: DieLibrary,
    pub(crate) physics: PhysicsWorld,
    pub(crate) dice: Vec<DieInstance>,
    pub(crate) walls: Vec<WallPiece>,
    /// Request behind the current dice
    pub(crate) request: DiceCounts,
    /// Seeds each roll
    pub(crate) session_rng: Pcg32,
    /// Seed and RNG of the current roll
    pub(crate) rng_state: RngState,
    pub(crate) rng: Pcg32,
    /// Unsimulated frame time
    pub(crate) accumulator: f32,
    /// Simulated seconds since the roll started
    pub(crate) sim_time: f32,
    /// Fixed steps since the roll started
    pub(crate) time_ticks: u64,
    pub(crate) last_detection: Option<f32>,
    pub(crate) last_report: TickReport,
    pub(crate) luck: LuckTracker,
}

impl DiceTray {
    /// Empty tray; dice appear on the first [`roll`](Self::roll)
    pub fn new(settings: TraySettings, seed: u64) -> Result<Self> {
        let library = DieLibrary::build()?;
        let physics = PhysicsWorld::new(&settings.physics, &library, SIM_DT)?;
        let rng_state = RngState::new(seed);
        Ok(Self {
            settings,
            library,
            physics,
            dice: Vec::new(),
            walls: Vec::new(),
            request: DiceCounts::new(),
            session_rng: rng_state.to_rng(),
            rng: rng_state.to_rng(),
            rng_state,
            accumulator: 0.0,
            sim_time: 0.0,
            time_ticks: 0,
            last_detection: None,
            last_report: TickReport::default(),
            luck: LuckTracker::new(),
        })
    }

    pub fn library(&self) -> &DieLibrary {
        &self.library
    }

    pub fn dice(&self) -> &[DieInstance] {
        &self.dice
    }

    pub fn walls(&self) -> &[WallPiece] {
        &self.walls
    }

    pub fn request(&self) -> &DiceCounts {
        &self.request
    }

    /// Seed of the current roll
    pub fn rng_state(&self) -> RngState {
        self.rng_state
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Latest published results
    pub fn results(&self) -> &[Option<Outcome>] {
        &self.last_report.results
    }

    pub fn all_settled(&self) -> bool {
        self.last_report.all_settled
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    /// Toggle hull wireframes; applied to every die on the next frame
    pub fn set_debug_hulls(&mut self, show: bool) {
        self.settings.show_debug_hulls = show;
        for die in &mut self.dice {
            die.show_hull = show;
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }
}
