//! Dice tray simulation
//!
//! Everything that moves lives here:
//! - Fixed timestep only (`consts::SIM_DT`, at most `MAX_SUBSTEPS` per frame)
//! - One seeded RNG per roll, so a seed replays the whole roll
//! - Results are reported in spawn order
//! - No rendering or platform dependencies

pub mod physics;
pub mod settle;
pub mod spawn;
pub mod state;
pub mod tick;

pub use physics::{Launch, PhysicsWorld};
pub use settle::{SettleReport, SettleThresholds, detect_state};
pub use spawn::{Placement, SpawnPlan, plan_spawn, spawn, spawn_scale, wall_extra, wall_pieces};
pub use state::{
    DiceTray, DieInstance, DieStatus, Outcome, Pose, RngState, TickReport, WallPiece,
};
pub use tick::tick;
