//! "Which face is up" queries

use glam::{Quat, Vec3};
use rand::Rng;

use super::DieType;
use super::d10::{FACE_ORDER, kite_of_triangle};
use super::geometry::RenderGeometry;
use super::shapes::D4_DOWN_FACE_TO_INDEX;

/// Face candidates for a resting orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopFace {
    /// Exactly one face reads as up
    Exact(usize),
    /// The d10's two best triangles belong to different numerals; either may win
    EitherOf([usize; 2]),
}

impl TopFace {
    pub fn contains(&self, face: usize) -> bool {
        match *self {
            TopFace::Exact(f) => f == face,
            TopFace::EitherOf([a, b]) => a == face || b == face,
        }
    }
}

/// Per-type top-face query over the render mesh's triangle normals
#[derive(Debug, Clone)]
pub struct TopFaceResolver {
    kind: DieType,
    normals: Vec<Vec3>,
}

impl TopFaceResolver {
    pub fn new(kind: DieType, geometry: &RenderGeometry) -> Self {
        Self {
            kind,
            normals: geometry.triangle_normals(),
        }
    }

    /// d4 results are read off the face touching the table
    fn query_direction(&self) -> Vec3 {
        match self.kind {
            DieType::D4 => Vec3::NEG_Y,
            _ => Vec3::Y,
        }
    }

    fn scores(&self, orientation: Quat) -> Vec<f32> {
        let query = self.query_direction();
        self.normals
            .iter()
            .map(|n| (orientation * *n).dot(query))
            .collect()
    }

    /// Face index (numeral - 1) candidates for `orientation`
    pub fn candidates(&self, orientation: Quat) -> TopFace {
        let scores = self.scores(orientation);
        match self.kind {
            DieType::D10 => {
                let mut order: Vec<usize> = (0..scores.len()).collect();
                // Stable: equal scores keep enumeration order
                order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
                let face = |t: usize| (FACE_ORDER[kite_of_triangle(t)] - 1) as usize;
                let (first, second) = (face(order[0]), face(order[1]));
                if first == second {
                    TopFace::Exact(first)
                } else {
                    TopFace::EitherOf([first, second])
                }
            }
            DieType::D4 => TopFace::Exact(D4_DOWN_FACE_TO_INDEX[best_index(&scores)]),
            kind => TopFace::Exact(best_index(&scores) / kind.triangles_per_face()),
        }
    }

    /// Resolve to a single face, drawing from `rng` only when the d10 is ambiguous
    pub fn resolve(&self, orientation: Quat, rng: &mut impl Rng) -> usize {
        match self.candidates(orientation) {
            TopFace::Exact(face) => face,
            TopFace::EitherOf([a, b]) => {
                if rng.random_bool(0.5) {
                    a
                } else {
                    b
                }
            }
        }
    }
}

/// First index holding the maximum score
fn best_index(scores: &[f32]) -> usize {
    let mut best = 0;
    let mut max = f32::NEG_INFINITY;
    for (i, &s) in scores.iter().enumerate() {
        if s > max {
            max = s;
            best = i;
        }
    }
    best
}
