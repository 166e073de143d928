//! Convex polyhedra used as die collision hulls

use std::collections::HashMap;

use glam::Vec3;

/// Vertex positions are welded when equal at this many decimal places
const WELD_SCALE: f32 = 1e5;

/// Convex hull as a vertex list plus outward-wound (counter-clockwise seen from
/// outside) face loops.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolyhedron {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Vec<u32>>,
}

impl ConvexPolyhedron {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Self {
        Self { vertices, faces }
    }

    /// Build a hull from a non-indexed triangle soup, where every
    /// `triangles_per_face` consecutive triangles form one planar face.
    ///
    /// Coincident vertices are welded, and each face's unique vertices are
    /// re-ordered into a single outward loop around its centroid.
    pub fn from_triangle_soup(positions: &[Vec3], triangles_per_face: usize) -> Self {
        let mut vertices = Vec::new();
        let mut lookup: HashMap<[i64; 3], u32> = HashMap::new();
        let indices: Vec<u32> = positions
            .iter()
            .map(|p| {
                let key = weld_key(*p);
                *lookup.entry(key).or_insert_with(|| {
                    vertices.push(*p);
                    (vertices.len() - 1) as u32
                })
            })
            .collect();

        let per_face = 3 * triangles_per_face.max(1);
        let faces = indices
            .chunks(per_face)
            .filter(|chunk| chunk.len() == per_face)
            .map(|chunk| {
                let a = vertices[chunk[0] as usize];
                let b = vertices[chunk[1] as usize];
                let c = vertices[chunk[2] as usize];
                let normal = (b - a).cross(c - a).normalize_or_zero();

                let mut loop_ids: Vec<u32> = Vec::with_capacity(chunk.len());
                for &id in chunk {
                    if !loop_ids.contains(&id) {
                        loop_ids.push(id);
                    }
                }
                order_loop(&vertices, loop_ids, normal)
            })
            .collect();

        Self { vertices, faces }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn centroid(&self) -> Vec3 {
        if self.vertices.is_empty() {
            return Vec3::ZERO;
        }
        self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32
    }

    pub fn face_centroid(&self, face: usize) -> Vec3 {
        let ids = &self.faces[face];
        ids.iter().map(|&i| self.vertices[i as usize]).sum::<Vec3>() / ids.len() as f32
    }

    /// Unit normal of a face (Newell's method, robust for any planar loop)
    pub fn face_normal(&self, face: usize) -> Vec3 {
        let ids = &self.faces[face];
        let mut n = Vec3::ZERO;
        for (k, &i) in ids.iter().enumerate() {
            let cur = self.vertices[i as usize];
            let next = self.vertices[ids[(k + 1) % ids.len()] as usize];
            n.x += (cur.y - next.y) * (cur.z + next.z);
            n.y += (cur.z - next.z) * (cur.x + next.x);
            n.z += (cur.x - next.x) * (cur.y + next.y);
        }
        n.normalize_or_zero()
    }

    /// Unique undirected edges, for wireframe overlays
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges = Vec::new();
        for face in &self.faces {
            for (k, &a) in face.iter().enumerate() {
                let b = face[(k + 1) % face.len()];
                let edge = (a.min(b), a.max(b));
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Every face normal points away from the hull centroid
    pub fn is_outward(&self) -> bool {
        let center = self.centroid();
        (0..self.faces.len())
            .all(|f| self.face_normal(f).dot(self.face_centroid(f) - center) > 0.0)
    }

    /// No vertex lies in front of any face plane
    pub fn is_convex(&self, tolerance: f32) -> bool {
        (0..self.faces.len()).all(|f| {
            let n = self.face_normal(f);
            let d = n.dot(self.face_centroid(f));
            self.vertices.iter().all(|v| n.dot(*v) - d <= tolerance)
        })
    }

    /// Largest distance of any face vertex from its face plane
    pub fn max_planarity_error(&self) -> f32 {
        (0..self.faces.len())
            .flat_map(|f| {
                let n = self.face_normal(f);
                let d = n.dot(self.face_centroid(f));
                self.faces[f]
                    .iter()
                    .map(move |&i| (n, d, i))
                    .collect::<Vec<_>>()
            })
            .map(|(n, d, i)| (n.dot(self.vertices[i as usize]) - d).abs())
            .fold(0.0, f32::max)
    }
}

fn weld_key(p: Vec3) -> [i64; 3] {
    [
        (p.x * WELD_SCALE).round() as i64,
        (p.y * WELD_SCALE).round() as i64,
        (p.z * WELD_SCALE).round() as i64,
    ]
}

/// Sort a face's vertex ids counter-clockwise around `normal`
fn order_loop(vertices: &[Vec3], mut ids: Vec<u32>, normal: Vec3) -> Vec<u32> {
    if ids.len() <= 3 {
        return ids;
    }
    let center = ids.iter().map(|&i| vertices[i as usize]).sum::<Vec3>() / ids.len() as f32;
    let u = (vertices[ids[0] as usize] - center).normalize_or_zero();
    let w = normal.cross(u);
    let angle = |i: u32| {
        let d = vertices[i as usize] - center;
        d.dot(w).atan2(d.dot(u))
    };
    ids.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    ids
}
