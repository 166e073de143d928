//! Procedural geometry for the regular dice (d4, d6, d8, d12, d20)
//!
//! The d10 lives in its own module since it is not a regular solid.

use glam::{Vec2, Vec3};

use super::geometry::{RenderGeometry, face_frame, project_to_tile};

/// Frame cutoff shared by the triangle-faced dice
const HORIZONTAL_CUTOFF: f32 = 0.99;

// === d4 ===

const D4_SCALE: f32 = 0.5;

/// Outward faces of the tetrahedron; face 3 is the base
pub(crate) const D4_FACES: [[usize; 3]; 4] = [[2, 1, 0], [1, 3, 0], [3, 2, 0], [1, 2, 3]];

/// A d4 is read from the face it rests on: the face pointing down
/// reports `D4_DOWN_FACE_TO_INDEX[face]`.
pub const D4_DOWN_FACE_TO_INDEX: [usize; 4] = [3, 2, 1, 0];

fn d4_vertices() -> [Vec3; 4] {
    [
        Vec3::new(1.0, 1.0, 1.0) * D4_SCALE,
        Vec3::new(-1.0, -1.0, 1.0) * D4_SCALE,
        Vec3::new(-1.0, 1.0, -1.0) * D4_SCALE,
        Vec3::new(1.0, -1.0, -1.0) * D4_SCALE,
    ]
}

pub fn d4_geometry() -> RenderGeometry {
    let verts = d4_vertices();
    let tile_width = 1.0 / 4.0;
    let mut geo = RenderGeometry::with_capacity(4);
    for (i, face) in D4_FACES.iter().enumerate() {
        let tile = i as f32 * tile_width;
        geo.push_triangle(
            [verts[face[0]], verts[face[1]], verts[face[2]]],
            [
                Vec2::new(tile + tile_width / 2.0, 1.0),
                Vec2::new(tile, 0.0),
                Vec2::new(tile + tile_width, 0.0),
            ],
        );
    }
    geo
}

// === d6 ===

const D6_HALF: f32 = 0.5;

/// Quads in tile order: +Z, -Z, +X, -X, +Y, -Y
const D6_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [5, 4, 7, 6],
    [1, 5, 6, 2],
    [4, 0, 3, 7],
    [3, 2, 6, 7],
    [4, 5, 1, 0],
];

fn d6_vertices() -> [Vec3; 8] {
    let s = D6_HALF;
    [
        Vec3::new(-s, -s, s),
        Vec3::new(s, -s, s),
        Vec3::new(s, s, s),
        Vec3::new(-s, s, s),
        Vec3::new(-s, -s, -s),
        Vec3::new(s, -s, -s),
        Vec3::new(s, s, -s),
        Vec3::new(-s, s, -s),
    ]
}

pub fn d6_geometry() -> RenderGeometry {
    let verts = d6_vertices();
    let tile_width = 1.0 / 6.0;
    let mut geo = RenderGeometry::with_capacity(12);
    for (i, [a, b, c, d]) in D6_FACES.iter().copied().enumerate() {
        let t = i as f32 * tile_width;
        geo.push_triangle(
            [verts[a], verts[b], verts[c]],
            [
                Vec2::new(t + tile_width, 1.0),
                Vec2::new(t, 1.0),
                Vec2::new(t, 0.0),
            ],
        );
        geo.push_triangle(
            [verts[a], verts[c], verts[d]],
            [
                Vec2::new(t + tile_width, 1.0),
                Vec2::new(t, 0.0),
                Vec2::new(t + tile_width, 0.0),
            ],
        );
    }
    geo
}

// === d8 ===

const D8_SCALE: f32 = 0.7;

const D8_FACES: [[usize; 3]; 8] = [
    [0, 2, 4],
    [2, 1, 4],
    [1, 3, 4],
    [3, 0, 4],
    [2, 0, 5],
    [1, 2, 5],
    [3, 1, 5],
    [0, 3, 5],
];

/// Faces whose numeral already reads upright; the rest get a half turn
const D8_UPRIGHT: [usize; 4] = [0, 1, 4, 5];

fn d8_vertices() -> [Vec3; 6] {
    [
        Vec3::X * D8_SCALE,
        Vec3::NEG_X * D8_SCALE,
        Vec3::Y * D8_SCALE,
        Vec3::NEG_Y * D8_SCALE,
        Vec3::Z * D8_SCALE,
        Vec3::NEG_Z * D8_SCALE,
    ]
}

pub fn d8_geometry() -> RenderGeometry {
    let verts = d8_vertices();
    let faces: Vec<[Vec3; 3]> = D8_FACES
        .iter()
        .map(|f| [verts[f[0]], verts[f[1]], verts[f[2]]])
        .collect();
    labelled_triangles(&faces, |i| !D8_UPRIGHT.contains(&i))
}

// === d12 ===

const D12_RADIUS: f32 = 0.75;

#[rustfmt::skip]
const D12_INDICES: [usize; 108] = [
    3, 11, 7,   3, 7, 15,   3, 15, 13,
    7, 19, 17,  7, 17, 6,   7, 6, 15,
    17, 4, 8,   17, 8, 10,  17, 10, 6,
    8, 0, 16,   8, 16, 2,   8, 2, 10,
    0, 12, 1,   0, 1, 18,   0, 18, 16,
    6, 10, 2,   6, 2, 13,   6, 13, 15,
    2, 16, 18,  2, 18, 3,   2, 3, 13,
    18, 1, 9,   18, 9, 11,  18, 11, 3,
    4, 14, 12,  4, 12, 0,   4, 0, 8,
    11, 9, 5,   11, 5, 19,  11, 19, 7,
    19, 5, 14,  19, 14, 4,  19, 4, 17,
    1, 12, 14,  1, 14, 5,   1, 5, 9,
];

fn d12_vertices() -> Vec<Vec3> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let r = 1.0 / t;
    #[rustfmt::skip]
    let raw = [
        // Cube corners
        (-1.0, -1.0, -1.0), (-1.0, -1.0, 1.0), (-1.0, 1.0, -1.0), (-1.0, 1.0, 1.0),
        (1.0, -1.0, -1.0), (1.0, -1.0, 1.0), (1.0, 1.0, -1.0), (1.0, 1.0, 1.0),
        // Rectangles in the yz, xz and xy planes
        (0.0, -r, -t), (0.0, -r, t), (0.0, r, -t), (0.0, r, t),
        (-r, -t, 0.0), (-r, t, 0.0), (r, -t, 0.0), (r, t, 0.0),
        (-t, 0.0, -r), (t, 0.0, -r), (-t, 0.0, r), (t, 0.0, r),
    ];
    raw.iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize() * D12_RADIUS)
        .collect()
}

/// Twelve pentagons, three triangles each
pub fn d12_geometry() -> RenderGeometry {
    let verts = d12_vertices();
    let mut geo = RenderGeometry::with_capacity(36);
    for (face, ids) in D12_INDICES.chunks(9).enumerate() {
        let points: Vec<Vec3> = ids.iter().map(|&i| verts[i]).collect();
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        let normal = (points[1] - points[0])
            .cross(points[2] - points[0])
            .normalize_or_zero();
        let frame = face_frame(normal, HORIZONTAL_CUTOFF);
        let flip = (face + 1) % 2 == 0;
        let uvs = project_to_tile(&points, center, frame, face, 12, flip);
        for k in 0..3 {
            geo.push_triangle(
                [points[3 * k], points[3 * k + 1], points[3 * k + 2]],
                [uvs[3 * k], uvs[3 * k + 1], uvs[3 * k + 2]],
            );
        }
    }
    geo
}

// === d20 ===

const D20_RADIUS: f32 = 1.0;

#[rustfmt::skip]
const D20_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

fn d20_vertices() -> Vec<Vec3> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    #[rustfmt::skip]
    let raw = [
        (-1.0, t, 0.0), (1.0, t, 0.0), (-1.0, -t, 0.0), (1.0, -t, 0.0),
        (0.0, -1.0, t), (0.0, 1.0, t), (0.0, -1.0, -t), (0.0, 1.0, -t),
        (t, 0.0, -1.0), (t, 0.0, 1.0), (-t, 0.0, -1.0), (-t, 0.0, 1.0),
    ];
    raw.iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize() * D20_RADIUS)
        .collect()
}

pub fn d20_geometry() -> RenderGeometry {
    let verts = d20_vertices();
    let faces: Vec<[Vec3; 3]> = D20_FACES
        .iter()
        .map(|f| [verts[f[0]], verts[f[1]], verts[f[2]]])
        .collect();
    labelled_triangles(&faces, |i| (i + 1) % 2 == 0)
}

/// One numbered tile per triangle, label centred on the triangle centroid
fn labelled_triangles(faces: &[[Vec3; 3]], half_turn: impl Fn(usize) -> bool) -> RenderGeometry {
    let mut geo = RenderGeometry::with_capacity(faces.len());
    for (i, tri) in faces.iter().enumerate() {
        let center = (tri[0] + tri[1] + tri[2]) / 3.0;
        let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
        let frame = face_frame(normal, HORIZONTAL_CUTOFF);
        let uvs = project_to_tile(tri, center, frame, i, faces.len(), half_turn(i));
        geo.push_triangle(*tri, [uvs[0], uvs[1], uvs[2]]);
    }
    geo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::polyhedron::ConvexPolyhedron;

    fn assert_outward(geo: &RenderGeometry) {
        for t in 0..geo.triangle_count() {
            let [a, b, c] = geo.triangle(t);
            let centroid = (a + b + c) / 3.0;
            assert!(
                geo.triangle_normal(t).dot(centroid) > 0.0,
                "triangle {t} faces inward"
            );
        }
    }

    #[test]
    fn test_triangle_counts() {
        assert_eq!(d4_geometry().triangle_count(), 4);
        assert_eq!(d6_geometry().triangle_count(), 12);
        assert_eq!(d8_geometry().triangle_count(), 8);
        assert_eq!(d12_geometry().triangle_count(), 36);
        assert_eq!(d20_geometry().triangle_count(), 20);
    }

    #[test]
    fn test_all_triangles_face_outward() {
        assert_outward(&d4_geometry());
        assert_outward(&d6_geometry());
        assert_outward(&d8_geometry());
        assert_outward(&d12_geometry());
        assert_outward(&d20_geometry());
    }

    #[test]
    fn test_d12_faces_are_pentagons() {
        let hull = ConvexPolyhedron::from_triangle_soup(&d12_geometry().positions, 3);
        assert_eq!(hull.vertices.len(), 20);
        assert_eq!(hull.faces.len(), 12);
        assert!(hull.faces.iter().all(|f| f.len() == 5));
        assert!(hull.max_planarity_error() < 1e-4);
        assert!(hull.is_outward());
    }

    #[test]
    fn test_d20_vertices_on_sphere() {
        for v in d20_geometry().positions {
            assert!((v.length() - D20_RADIUS).abs() < 1e-5);
        }
    }

    #[test]
    fn test_uvs_stay_in_own_tile() {
        for (geo, tiles, per_face) in [
            (d8_geometry(), 8, 1),
            (d12_geometry(), 12, 3),
            (d20_geometry(), 20, 1),
        ] {
            for (k, uv) in geo.uvs.iter().enumerate() {
                let tile = (k / 3 / per_face) as f32;
                let lo = tile / tiles as f32 - 1e-5;
                let hi = (tile + 1.0) / tiles as f32 + 1e-5;
                assert!(uv.x >= lo && uv.x <= hi, "uv {uv} outside tile {tile}");
            }
        }
    }
}
