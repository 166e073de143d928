//! Labelled triangle soups for die rendering
//!
//! Every die mesh is non-indexed: triangle `t` occupies positions `3t..3t+3`.
//! UVs address a 1×N atlas strip where tile `k` carries numeral `k + 1`.

use glam::{Vec2, Vec3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderGeometry {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl RenderGeometry {
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 3),
            uvs: Vec::with_capacity(triangles * 3),
        }
    }

    pub fn push_triangle(&mut self, corners: [Vec3; 3], uvs: [Vec2; 3]) {
        self.positions.extend_from_slice(&corners);
        self.uvs.extend_from_slice(&uvs);
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle(&self, t: usize) -> [Vec3; 3] {
        [
            self.positions[3 * t],
            self.positions[3 * t + 1],
            self.positions[3 * t + 2],
        ]
    }

    /// Outward unit normal of triangle `t`
    pub fn triangle_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangle(t);
        (b - a).cross(c - a).normalize_or_zero()
    }

    pub fn triangle_normals(&self) -> Vec<Vec3> {
        (0..self.triangle_count())
            .map(|t| self.triangle_normal(t))
            .collect()
    }
}

/// In-plane frame used to lay a numeral onto a face: x runs along the
/// horizon, y points towards world up (or +X for near-horizontal faces).
pub(crate) fn face_frame(normal: Vec3, horizontal_cutoff: f32) -> (Vec3, Vec3) {
    let face_up = if normal.dot(Vec3::Y).abs() > horizontal_cutoff {
        Vec3::X
    } else {
        Vec3::Y
    };
    let x_axis = face_up.cross(normal).normalize_or_zero();
    let y_axis = normal.cross(x_axis).normalize_or_zero();
    (x_axis, y_axis)
}

/// Projects face points into a tile of the atlas strip.
///
/// Points are expressed in the face frame around `center`, scaled so the
/// largest coordinate touches the tile border, then offset into tile `tile`
/// of `tiles`. `rotate_half_turn` spins the label 180° inside its tile.
pub(crate) fn project_to_tile(
    points: &[Vec3],
    center: Vec3,
    frame: (Vec3, Vec3),
    tile: usize,
    tiles: usize,
    rotate_half_turn: bool,
) -> Vec<Vec2> {
    let (x_axis, y_axis) = frame;
    let local: Vec<Vec2> = points
        .iter()
        .map(|p| {
            let d = *p - center;
            Vec2::new(d.dot(x_axis), d.dot(y_axis))
        })
        .collect();

    let mut max_range = local
        .iter()
        .map(|uv| uv.x.abs().max(uv.y.abs()))
        .fold(0.0, f32::max);
    if max_range <= f32::EPSILON {
        max_range = 1.0;
    }

    let tile_width = 1.0 / tiles as f32;
    local
        .into_iter()
        .map(|uv| {
            let mut t = uv / max_range / 2.0 + Vec2::splat(0.5);
            if rotate_half_turn {
                t = Vec2::ONE - t;
            }
            Vec2::new((tile as f32 + t.x) * tile_width, t.y)
        })
        .collect()
}
