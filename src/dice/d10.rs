//! Ten-sided die modelled as a pentagonal bipyramid
//!
//! The equator zig-zags up and down by a small offset, so each numeral sits on
//! a "kite" made of two nearly coplanar triangles that share a pole.

use std::f32::consts::TAU;

use glam::Vec3;

use super::geometry::{RenderGeometry, face_frame, project_to_tile};

const D10_RADIUS: f32 = 0.7;
const EQUATOR_OFFSET: f32 = D10_RADIUS * 0.1;
const TOP: usize = 10;
const BOTTOM: usize = 11;

/// Numeral printed on kite `k` (triangles `2k` and `2k + 1`)
pub const FACE_ORDER: [u32; 10] = [1, 7, 3, 5, 9, 4, 10, 8, 2, 6];

/// Frame cutoff for kites; steeper than the other dice since kites tilt
const HORIZONTAL_CUTOFF: f32 = 0.9;

fn vertices() -> [Vec3; 12] {
    let mut verts = [Vec3::ZERO; 12];
    for (i, v) in verts.iter_mut().enumerate().take(10) {
        let angle = i as f32 * TAU / 10.0;
        let y = if i % 2 == 0 {
            EQUATOR_OFFSET
        } else {
            -EQUATOR_OFFSET
        };
        *v = Vec3::new(angle.cos() * D10_RADIUS, y, angle.sin() * D10_RADIUS);
    }
    verts[TOP] = Vec3::Y * D10_RADIUS;
    verts[BOTTOM] = Vec3::NEG_Y * D10_RADIUS;
    verts
}

/// Twenty triangles: ten around the top pole, then ten around the bottom
fn triangles() -> [[usize; 3]; 20] {
    let mut tris = [[0; 3]; 20];
    for i in 0..10 {
        tris[i] = [TOP, (i + 1) % 10, i];
        tris[10 + i] = [BOTTOM, (i + 1) % 10, (i + 2) % 10];
    }
    tris
}

/// Kite index that triangle `t` belongs to
pub fn kite_of_triangle(t: usize) -> usize {
    t / 2
}

pub fn d10_geometry() -> RenderGeometry {
    let verts = vertices();
    let tris = triangles();
    let mut geo = RenderGeometry::with_capacity(20);

    for kite in 0..10 {
        let first = tris[2 * kite];
        let second = tris[2 * kite + 1];
        let pole = verts[first[0]];
        let (a1, b1) = (verts[first[1]], verts[first[2]]);
        let (a2, b2) = (verts[second[1]], verts[second[2]]);

        let points = [pole, a1, b1, a2, b2];
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        let normal = (b1 - a1).cross(pole - a1).normalize_or_zero();
        let frame = face_frame(normal, HORIZONTAL_CUTOFF);
        let tile = (FACE_ORDER[kite] - 1) as usize;
        let uvs = project_to_tile(&points, center, frame, tile, 10, kite >= 5);

        geo.push_triangle([pole, a1, b1], [uvs[0], uvs[1], uvs[2]]);
        geo.push_triangle([pole, a2, b2], [uvs[0], uvs[3], uvs[4]]);
    }
    geo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_order_is_permutation() {
        let mut seen = FACE_ORDER.to_vec();
        seen.sort_unstable();
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_kite_halves_nearly_coplanar() {
        let geo = d10_geometry();
        for kite in 0..10 {
            let a = geo.triangle_normal(2 * kite);
            let b = geo.triangle_normal(2 * kite + 1);
            assert!(a.dot(b) > 0.999, "kite {kite} bends by {}", a.dot(b));
        }
    }

    #[test]
    fn test_triangles_face_outward() {
        let geo = d10_geometry();
        for t in 0..geo.triangle_count() {
            let [a, b, c] = geo.triangle(t);
            assert!(geo.triangle_normal(t).dot((a + b + c) / 3.0) > 0.0);
        }
    }

    #[test]
    fn test_kite_uvs_land_on_numbered_tile() {
        let geo = d10_geometry();
        for (k, uv) in geo.uvs.iter().enumerate() {
            let kite = kite_of_triangle(k / 3);
            let tile = (FACE_ORDER[kite] - 1) as f32;
            assert!(uv.x >= tile / 10.0 - 1e-5 && uv.x <= (tile + 1.0) / 10.0 + 1e-5);
        }
    }
}
