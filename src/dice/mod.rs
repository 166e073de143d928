//! Die shape library
//!
//! Every die type gets a labelled render mesh, a convex collision hull built
//! from the same vertices, and a top-face resolver. Descriptors are built once
//! into a [`DieLibrary`] and shared read-only by every die of that type.

pub mod d10;
pub mod geometry;
pub mod polyhedron;
pub mod resolve;
pub mod shapes;

use std::fmt;
use std::str::FromStr;

use glam::Quat;
use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{DiceError, Result};
pub use geometry::RenderGeometry;
pub use polyhedron::ConvexPolyhedron;
pub use resolve::{TopFace, TopFaceResolver};

/// The six supported polyhedral dice
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieType {
    /// All types in ascending face count
    pub const ALL: [DieType; 6] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
    ];

    pub const fn face_count(self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DieType::D4 => "d4",
            DieType::D6 => "d6",
            DieType::D8 => "d8",
            DieType::D10 => "d10",
            DieType::D12 => "d12",
            DieType::D20 => "d20",
        }
    }

    pub fn from_faces(faces: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.face_count() == faces)
    }

    /// Dense index into per-type tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Render triangles that make up one numbered face
    pub const fn triangles_per_face(self) -> usize {
        match self {
            DieType::D6 | DieType::D10 => 2,
            DieType::D12 => 3,
            DieType::D4 | DieType::D8 | DieType::D20 => 1,
        }
    }

    /// Labelled triangle mesh, one atlas tile per numeral
    pub fn render_geometry(self) -> RenderGeometry {
        match self {
            DieType::D4 => shapes::d4_geometry(),
            DieType::D6 => shapes::d6_geometry(),
            DieType::D8 => shapes::d8_geometry(),
            DieType::D10 => d10::d10_geometry(),
            DieType::D12 => shapes::d12_geometry(),
            DieType::D20 => shapes::d20_geometry(),
        }
    }

    /// Convex hull welded from the render mesh, so physics rests on exactly
    /// the faces that are drawn. The d10's kites bend slightly and stay split
    /// into triangles.
    pub fn collision_shape(self) -> ConvexPolyhedron {
        let grouping = match self {
            DieType::D10 => 1,
            kind => kind.triangles_per_face(),
        };
        ConvexPolyhedron::from_triangle_soup(&self.render_geometry().positions, grouping)
    }

    pub fn label_atlas(self) -> RgbaImage {
        crate::renderer::atlas::label_atlas(self)
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for DieType {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .strip_prefix(['d', 'D'])
            .and_then(|faces| faces.parse().ok())
            .and_then(Self::from_faces)
            .ok_or_else(|| DiceError::UnknownDieType(s.to_string()))
    }
}

/// Immutable per-type data shared by every die of that type
#[derive(Debug, Clone)]
pub struct DieDescriptor {
    pub kind: DieType,
    pub collision: ConvexPolyhedron,
    pub geometry: RenderGeometry,
    pub resolver: TopFaceResolver,
}

impl DieDescriptor {
    pub fn build(kind: DieType) -> Result<Self> {
        let geometry = kind.render_geometry();
        let collision = kind.collision_shape();
        if collision.vertices.len() < 4 || !collision.is_outward() {
            return Err(DiceError::DegenerateHull { kind });
        }
        let resolver = TopFaceResolver::new(kind, &geometry);
        Ok(Self {
            kind,
            collision,
            geometry,
            resolver,
        })
    }

    pub fn face_count(&self) -> u32 {
        self.kind.face_count()
    }

    pub fn top_face_candidates(&self, orientation: Quat) -> TopFace {
        self.resolver.candidates(orientation)
    }

    pub fn resolve_top_face(&self, orientation: Quat, rng: &mut impl Rng) -> usize {
        self.resolver.resolve(orientation, rng)
    }

    /// Numeral printed on a face index
    pub fn value_for(&self, face: usize) -> u32 {
        face as u32 + 1
    }
}

/// Descriptors for every die type, built once up front
#[derive(Debug, Clone)]
pub struct DieLibrary {
    descriptors: Vec<DieDescriptor>,
}

impl DieLibrary {
    pub fn build() -> Result<Self> {
        let descriptors = DieType::ALL
            .into_iter()
            .map(DieDescriptor::build)
            .collect::<Result<Vec<_>>>()?;
        log::info!("Built die library ({} types)", descriptors.len());
        Ok(Self { descriptors })
    }

    pub fn get(&self, kind: DieType) -> &DieDescriptor {
        &self.descriptors[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DieDescriptor> {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_counts() {
        let counts: Vec<u32> = DieType::ALL.iter().map(|t| t.face_count()).collect();
        assert_eq!(counts, vec![4, 6, 8, 10, 12, 20]);
    }

    #[test]
    fn test_parse_die_type() {
        assert_eq!("d20".parse::<DieType>().unwrap(), DieType::D20);
        assert_eq!("D6".parse::<DieType>().unwrap(), DieType::D6);
        assert!("d7".parse::<DieType>().is_err());
        assert!("20".parse::<DieType>().is_err());
    }

    #[test]
    fn test_render_faces_match_face_count() {
        for kind in DieType::ALL {
            let geo = kind.render_geometry();
            assert_eq!(
                geo.triangle_count(),
                kind.face_count() as usize * kind.triangles_per_face(),
                "{kind}"
            );
            assert_eq!(geo.uvs.len(), geo.positions.len());
        }
    }

    #[test]
    fn test_hulls_are_convex_and_outward() {
        let library = DieLibrary::build().unwrap();
        for desc in library.iter() {
            assert!(desc.collision.is_outward(), "{}", desc.kind);
            assert!(desc.collision.is_convex(1e-4), "{}", desc.kind);
        }
    }

    #[test]
    fn test_hull_uses_render_vertices() {
        for kind in DieType::ALL {
            let hull = kind.collision_shape();
            let geo = kind.render_geometry();
            for v in &hull.vertices {
                assert!(geo.positions.iter().any(|p| (*p - *v).length() < 1e-5));
            }
            for p in &geo.positions {
                assert!(hull.vertices.iter().any(|v| (*p - *v).length() < 1e-5));
            }
        }
    }

    #[test]
    fn test_hull_face_counts() {
        let faces: Vec<usize> = DieType::ALL
            .iter()
            .map(|t| t.collision_shape().face_count())
            .collect();
        assert_eq!(faces, vec![4, 6, 8, 20, 12, 20]);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&DieType::D12).unwrap(), "\"d12\"");
    }
}
