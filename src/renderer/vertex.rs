//! Vertex types for die and overlay rendering

use bytemuck::{Pod, Zeroable};

/// Lit, textured die vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DieVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl DieVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DieVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Unlit line-list vertex for hull wireframes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

/// Colors for dice and tray
pub mod colors {
    use crate::dice::DieType;

    pub const WALL: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
    pub const HULL_WIREFRAME: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.07, 0.07, 0.09, 1.0];

    /// Face color of each die type (atlas tile background)
    pub fn die_fill(kind: DieType) -> [f32; 4] {
        match kind {
            DieType::D4 => [0.95, 0.55, 0.55, 1.0],
            DieType::D6 => [0.96, 0.96, 0.92, 1.0],
            DieType::D8 => [0.55, 0.75, 0.95, 1.0],
            DieType::D10 => [0.6, 0.9, 0.6, 1.0],
            DieType::D12 => [0.95, 0.8, 0.45, 1.0],
            DieType::D20 => [0.8, 0.65, 0.95, 1.0],
        }
    }

    /// Background, wall and hull wireframe colours, in that order
    pub fn palette() -> [[f32; 4]; 3] {
        [BACKGROUND, WALL, HULL_WIREFRAME]
    }

    pub fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
        color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_vertex_layout_is_tight() {
        assert_eq!(std::mem::size_of::<DieVertex>(), 32);
        let layout = DieVertex::desc();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn test_palette_order() {
        let [background, wall, hull] = colors::palette();
        assert_eq!(background, colors::BACKGROUND);
        assert_eq!(wall, colors::WALL);
        assert_eq!(hull, colors::HULL_WIREFRAME);
    }

    #[test]
    fn test_rgba8_conversion() {
        assert_eq!(colors::to_rgba8([1.0, 0.0, 0.5, 2.0]), [255, 0, 128, 255]);
    }
}
