//! Dice-set spawner
//!
//! Layout, tray walls and launch kicks for a roll. Planning is pure (it only
//! draws from the RNG it is handed); [`spawn`] then replaces the tray's bodies.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::physics::Launch;
use super::state::{DiceTray, DieInstance, Pose, RngState, TickReport, WallPiece};
use crate::consts::*;
use crate::dice::DieType;
use crate::error::{DiceError, Result};
use crate::notation::DiceCounts;
use crate::{random_unit_quat, random_unit_vec3};

/// Gap kept between the outermost spawn position and the walls
const WALL_CLEARANCE: f32 = 2.0;

/// Layout multiplier; 1 up to the zoned-layout limit, then logarithmic
pub fn spawn_scale(total: u64) -> f32 {
    if total <= u64::from(ZONED_LAYOUT_MAX) {
        1.0
    } else {
        (total as f32 / 20.0 + 1.0).log2() + 1.5
    }
}

/// Extra wall size on top of the base tray
pub fn wall_extra(total: u64) -> f32 {
    if total > u64::from(MAX_TOTAL_DICE) {
        return WALL_EXTRA_CAP;
    }
    ((spawn_scale(total) - 1.0) * 20.0).floor().max(0.0)
}

/// Centre spacing of the spawn grid
pub fn grid_spacing(total: u64) -> f32 {
    BASE_SPACING * (1.0 + (total as f32 + 1.0).log2() * 0.2)
}

/// Floor, ceiling and four walls around a square tray of side `30 + extra`
pub fn wall_pieces(extra: f32) -> Vec<WallPiece> {
    let size = BASE_WALL_SIZE + extra;
    let half = size / 2.0;
    let mid = WALL_HEIGHT / 2.0;
    let piece = |center: Vec3, size: Vec3, visible: bool| WallPiece {
        center,
        half_extents: size / 2.0,
        visible,
    };
    vec![
        piece(Vec3::new(0.0, -0.5, 0.0), Vec3::new(size, 1.0, size), true),
        piece(Vec3::new(0.0, WALL_HEIGHT, 0.0), Vec3::new(size, 1.0, size), false),
        piece(Vec3::new(-half, mid, 0.0), Vec3::new(1.0, WALL_HEIGHT, size), true),
        piece(Vec3::new(half, mid, 0.0), Vec3::new(1.0, WALL_HEIGHT, size), true),
        piece(Vec3::new(0.0, mid, -half), Vec3::new(size, WALL_HEIGHT, 1.0), true),
        // Front wall stays invisible so the camera can see in
        piece(Vec3::new(0.0, mid, half), Vec3::new(size, WALL_HEIGHT, 1.0), false),
    ]
}

/// Where one die starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub kind: DieType,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPlan {
    pub spawn_scale: f32,
    pub wall_extra: f32,
    /// Grouped by type in ascending face count
    pub placements: Vec<Placement>,
}

/// Lay out every requested die.
///
/// Up to [`ZONED_LAYOUT_MAX`] dice, each type gets its own zone across x,
/// zones evenly spaced and at least one grid wide. Larger rolls share one
/// square grid sorted by face count.
pub fn plan_spawn(counts: &DiceCounts, rng: &mut impl Rng) -> SpawnPlan {
    let total = counts.total();
    let scale = spawn_scale(total);
    let spacing = grid_spacing(total);
    let mut placements = Vec::with_capacity(total as usize);

    if total <= u64::from(ZONED_LAYOUT_MAX) {
        let zones: Vec<(DieType, u32)> = counts.iter().collect();
        let widest = zones
            .iter()
            .map(|&(_, count)| per_row(count as usize) as f32 * spacing)
            .fold(0.0, f32::max);
        let pitch = (BASE_SPAWN_RANGE * scale / zones.len().max(1) as f32).max(widest);
        let first = -(zones.len() as f32 - 1.0) / 2.0 * pitch;
        for (i, &(kind, count)) in zones.iter().enumerate() {
            let kinds = vec![kind; count as usize];
            lay_grid(&kinds, first + pitch * i as f32, spacing, rng, &mut placements);
        }
    } else {
        let kinds: Vec<DieType> = counts
            .iter()
            .flat_map(|(kind, count)| std::iter::repeat_n(kind, count as usize))
            .collect();
        lay_grid(&kinds, 0.0, spacing, rng, &mut placements);
    }

    let reach = placements
        .iter()
        .map(|p| p.position.x.abs().max(p.position.z.abs()))
        .fold(0.0, f32::max);
    let needed = (2.0 * (reach + WALL_CLEARANCE) - BASE_WALL_SIZE).ceil();

    SpawnPlan {
        spawn_scale: scale,
        wall_extra: wall_extra(total).max(needed).min(WALL_EXTRA_CAP),
        placements,
    }
}

fn per_row(count: usize) -> usize {
    (count as f32).sqrt().ceil() as usize
}

/// Square grid centred on `zone_center` along x and on 0 along z
fn lay_grid(
    kinds: &[DieType],
    zone_center: f32,
    spacing: f32,
    rng: &mut impl Rng,
    out: &mut Vec<Placement>,
) {
    let per_row = per_row(kinds.len()).max(1);
    let offset = (per_row as f32 - 1.0) / 2.0;
    for (i, &kind) in kinds.iter().enumerate() {
        let row = (i / per_row) as f32;
        let col = (i % per_row) as f32;
        let x = zone_center + (col - offset) * spacing + jitter(rng);
        let y = SPAWN_HEIGHT + rng.random::<f32>() * 2.0;
        let z = (row - offset) * spacing + jitter(rng);
        out.push(Placement {
            kind,
            position: Vec3::new(x, y, z),
        });
    }
}

fn jitter(rng: &mut impl Rng) -> f32 {
    (rng.random::<f32>() - 0.5) * SPAWN_JITTER
}

/// Random orientation, tumble and toss
pub fn launch(rng: &mut impl Rng) -> Launch {
    let rotation = random_unit_quat(rng);
    let angvel = random_unit_vec3(rng) * (rng.random::<f32>() * 20.0 + 5.0);
    let heading = rng.random::<f32>() * std::f32::consts::TAU;
    let speed = rng.random::<f32>() * 5.0 + 2.0;
    let linvel = Vec3::new(
        heading.cos() * speed,
        2.0 + rng.random::<f32>() * 2.0,
        heading.sin() * speed,
    );
    Launch {
        rotation,
        linvel,
        angvel,
    }
}

/// Drop point for a die that fell out of the tray
pub fn respawn_position(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * 5.0,
        SPAWN_HEIGHT + rng.random::<f32>() * 3.0,
        (rng.random::<f32>() - 0.5) * 5.0,
    )
}

/// Replace the tray's walls and dice with a fresh roll of `counts`.
///
/// An empty request rolls two d8. Requests above [`MAX_TOTAL_DICE`] are
/// rejected without touching the tray.
pub fn spawn(tray: &mut DiceTray, counts: &DiceCounts, seed: u64) -> Result<RngState> {
    let total = counts.total();
    if total > u64::from(MAX_TOTAL_DICE) {
        return Err(DiceError::invalid_request(format!(
            "{total} dice requested, at most {MAX_TOTAL_DICE} allowed"
        )));
    }
    let counts = counts.clone().or_default_roll();

    let rng_state = RngState::new(seed);
    let mut rng: Pcg32 = Pcg32::seed_from_u64(seed);
    let plan = plan_spawn(&counts, &mut rng);

    tray.physics.clear();
    tray.walls = wall_pieces(plan.wall_extra);
    for wall in &tray.walls {
        tray.physics.add_fixed_box(wall.center, wall.half_extents);
    }

    let show_hull = tray.settings.show_debug_hulls;
    tray.dice = plan
        .placements
        .iter()
        .map(|placement| {
            let kick = launch(&mut rng);
            let body = tray.physics.add_die(placement.kind, placement.position, &kick);
            let pose = Pose {
                position: placement.position,
                rotation: kick.rotation,
            };
            let mut die = DieInstance::new(placement.kind, body, pose);
            die.show_hull = show_hull;
            die
        })
        .collect();

    tray.rng = rng;
    tray.rng_state = rng_state;
    tray.request = counts;
    tray.accumulator = 0.0;
    tray.sim_time = 0.0;
    tray.time_ticks = 0;
    tray.last_detection = None;
    tray.last_report = TickReport::pending(tray.dice.len());
    tray.luck.reset();

    log::info!(
        "Rolled {} ({} dice, scale {:.2}, tray {:.0}, seed {})",
        tray.request,
        tray.dice.len(),
        plan.spawn_scale,
        BASE_WALL_SIZE + plan.wall_extra,
        seed
    );
    Ok(rng_state)
}
