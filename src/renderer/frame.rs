//! Per-frame draw data built from the tray
//!
//! Die meshes are uploaded once per type; each frame only the instance
//! buffer, the hull overlay lines and (after a roll) the walls change.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::mesh::{HULL_OVERLAY_SCALE, box_mesh, hull_wireframe, model_matrix};
use super::vertex::{DieVertex, LineVertex, colors};
use crate::dice::DieLibrary;
use crate::sim::{DieInstance, WallPiece};

/// One die as seen by the instanced draw: model matrix columns and fill
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DieInstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl DieInstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    pub fn from_die(die: &DieInstance) -> Self {
        Self {
            model: model_matrix(die.pose.position, die.pose.rotation),
            color: colors::die_fill(die.kind),
        }
    }

    /// Instance-rate buffer following `DieVertex` (locations 3..=7)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DieInstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub fn die_instances(dice: &[DieInstance]) -> Vec<DieInstanceRaw> {
    dice.iter().map(DieInstanceRaw::from_die).collect()
}

/// World-space hull wireframes for every die with `show_hull` set
pub fn hull_overlay(dice: &[DieInstance], library: &DieLibrary) -> Vec<LineVertex> {
    let mut lines = Vec::new();
    for die in dice.iter().filter(|d| d.show_hull) {
        let hull = &library.get(die.kind).collision;
        lines.extend(hull_wireframe(hull, HULL_OVERLAY_SCALE).into_iter().map(|v| {
            let p = die.pose.rotation * Vec3::from_array(v.position) + die.pose.position;
            LineVertex {
                position: p.to_array(),
            }
        }));
    }
    lines
}

/// Triangles for the walls that are drawn (ceiling and front wall are skipped)
pub fn wall_vertices(walls: &[WallPiece]) -> Vec<DieVertex> {
    walls
        .iter()
        .filter(|w| w.visible)
        .flat_map(|w| box_mesh(w.center, w.half_extents))
        .collect()
}

/// Flatten a buffer layout for a JS renderer:
/// `[stride, instanced, then (location, offset, float count) per attribute]`
pub fn layout_words(layout: &wgpu::VertexBufferLayout) -> Vec<u32> {
    let mut words = vec![
        layout.array_stride as u32,
        u32::from(layout.step_mode == wgpu::VertexStepMode::Instance),
    ];
    for attr in layout.attributes {
        words.extend([
            attr.shader_location,
            attr.offset as u32,
            (attr.format.size() / 4) as u32,
        ]);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DieType;
    use crate::notation::DiceCounts;
    use crate::settings::TraySettings;
    use crate::sim::DiceTray;

    fn rolled(counts: DiceCounts) -> DiceTray {
        let mut tray = DiceTray::new(TraySettings::default(), 8).unwrap();
        tray.roll_with_seed(&counts, 21).unwrap();
        tray
    }

    #[test]
    fn test_instances_follow_poses() {
        let tray = rolled(DiceCounts::new().with(DieType::D8, 2).with(DieType::D20, 1));
        let instances = die_instances(tray.dice());
        assert_eq!(instances.len(), 3);
        for (raw, die) in instances.iter().zip(tray.dice()) {
            assert_eq!(raw.model[3][..3], die.pose.position.to_array());
            assert_eq!(raw.color, colors::die_fill(die.kind));
        }
        assert_eq!(std::mem::size_of::<DieInstanceRaw>(), 80);
    }

    #[test]
    fn test_hull_overlay_only_when_enabled() {
        let mut tray = rolled(DiceCounts::new().with(DieType::D6, 2));
        assert!(hull_overlay(tray.dice(), tray.library()).is_empty());

        tray.set_debug_hulls(true);
        let lines = hull_overlay(tray.dice(), tray.library());
        // Twelve cube edges per die
        assert_eq!(lines.len(), 2 * 24);
        let die = &tray.dice()[0];
        for v in &lines[..24] {
            let d = Vec3::from_array(v.position) - die.pose.position;
            assert!((d.length() - 0.55 * 3f32.sqrt()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hidden_walls_are_not_drawn() {
        let tray = rolled(DiceCounts::new().with(DieType::D4, 1));
        let visible = tray.walls().iter().filter(|w| w.visible).count();
        assert_eq!(visible, 4);
        assert_eq!(wall_vertices(tray.walls()).len(), visible * 36);
    }

    #[test]
    fn test_layout_words() {
        let words = layout_words(&DieVertex::desc());
        assert_eq!(words, vec![32, 0, 0, 0, 3, 1, 12, 3, 2, 24, 2]);
        let words = layout_words(&DieInstanceRaw::desc());
        assert_eq!(&words[..2], &[80, 1]);
        assert_eq!(&words[words.len() - 3..], &[7, 64, 4]);
        assert_eq!(layout_words(&LineVertex::desc()), vec![12, 0, 0, 0, 3]);
    }
}
