//! CPU-side meshes ready for upload

use glam::{Quat, Vec3};

use super::vertex::{DieVertex, LineVertex};
use crate::dice::{ConvexPolyhedron, DieDescriptor, DieType};

/// Hull overlays are drawn slightly larger so they don't z-fight the die
pub const HULL_OVERLAY_SCALE: f32 = 1.1;

/// Flat-shaded, non-indexed die mesh (triangle list)
#[derive(Debug, Clone)]
pub struct DieMesh {
    pub kind: DieType,
    pub vertices: Vec<DieVertex>,
}

impl DieMesh {
    pub fn build(desc: &DieDescriptor) -> Self {
        let geo = &desc.geometry;
        let mut vertices = Vec::with_capacity(geo.positions.len());
        for t in 0..geo.triangle_count() {
            let normal = geo.triangle_normal(t).to_array();
            for k in 3 * t..3 * t + 3 {
                vertices.push(DieVertex::new(
                    geo.positions[k].to_array(),
                    normal,
                    geo.uvs[k].to_array(),
                ));
            }
        }
        Self {
            kind: desc.kind,
            vertices,
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Line-list wireframe of a collision hull, two vertices per unique edge
pub fn hull_wireframe(hull: &ConvexPolyhedron, scale: f32) -> Vec<LineVertex> {
    hull.edges()
        .into_iter()
        .flat_map(|(a, b)| [a, b])
        .map(|i| LineVertex {
            position: (hull.vertices[i as usize] * scale).to_array(),
        })
        .collect()
}

/// Axis-aligned box as a flat-shaded triangle list (tray walls)
pub fn box_mesh(center: Vec3, half_extents: Vec3) -> Vec<DieVertex> {
    let mut vertices = Vec::with_capacity(36);
    // Each face: outward normal, plus the two in-plane axes spanning it
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];
    for (normal, u, v) in faces {
        let corner = |su: f32, sv: f32| {
            (center + (normal + u * su + v * sv) * half_extents).to_array()
        };
        let n = normal.to_array();
        let quad = [
            (corner(-1.0, -1.0), [0.0, 0.0]),
            (corner(1.0, -1.0), [1.0, 0.0]),
            (corner(1.0, 1.0), [1.0, 1.0]),
            (corner(-1.0, 1.0), [0.0, 1.0]),
        ];
        for k in [0, 1, 2, 0, 2, 3] {
            vertices.push(DieVertex::new(quad[k].0, n, quad[k].1));
        }
    }
    vertices
}

/// Model matrix columns for placing a die mesh
pub fn model_matrix(position: Vec3, rotation: Quat) -> [[f32; 4]; 4] {
    glam::Mat4::from_rotation_translation(rotation, position).to_cols_array_2d()
}
