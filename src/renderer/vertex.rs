//! Vertex types for instanced quad rendering
//!
//! Every sprite is the same unit quad; position and UV come from the
//! per-instance attributes.

use bytemuck::{Pod, Zeroable};

/// Corner of the shared quad template
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    /// Corner in [-1, 1]², scaled by the instance half-extent
    pub position: [f32; 2],
    /// Corner in [0, 1]², remapped by the instance UV rect
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Quad template (v grows downward in texture space)
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex::new(-1.0, -1.0, 0.0, 1.0),
    QuadVertex::new(1.0, -1.0, 1.0, 1.0),
    QuadVertex::new(1.0, 1.0, 1.0, 0.0),
    QuadVertex::new(-1.0, 1.0, 0.0, 0.0),
];

/// Two counter-clockwise triangles over [`QUAD_VERTICES`]
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Per-instance sprite attributes (one per draw command)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position_offset: [f32; 2],
    pub position_scale: [f32; 2],
    pub uv_offset: [f32; 2],
    pub uv_scale: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x2,
        3 => Float32x2,
        4 => Float32x2,
        5 => Float32x2,
        6 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const WALL: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
    pub const PADDLE_LEFT: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const PADDLE_RIGHT: [f32; 4] = [0.4, 0.7, 1.0, 1.0];
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
