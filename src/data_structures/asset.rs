//! The static mesh asset contract and its GPU-facing layouts.
//!
//! A [`MeshAsset`] is what the external asset system must provide for every
//! mesh section: a render-ready vertex stream, a triangle index stream, an
//! axis-aligned bounding box, and an ordered list of material slots (only
//! slot 0 is consulted). Assets are immutable once built and shared between
//! the game thread and proxy construction via `Arc`.

use cgmath::{Matrix, Matrix4};

use crate::data_structures::aabb::Aabb;

/// Trait for GPU vertex data that can describe its own buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One vertex of a section mesh: position, tangent basis, UV and color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SectionVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex for SectionVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<SectionVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 9]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/**
 * One deform transform as it is laid out in the consolidated GPU buffer.
 *
 * The renderer expects row-major matrices, while cgmath stores column-major,
 * so the conversion transposes. All CPU-side math stays in cgmath types and
 * only crosses into this layout at the GPU boundary.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    pub rows: [[f32; 4]; 4],
}

impl From<&Matrix4<f32>> for TransformRaw {
    fn from(matrix: &Matrix4<f32>) -> Self {
        Self {
            rows: matrix.transpose().into(),
        }
    }
}

/// An immutable, render-ready mesh asset.
///
/// The crate never owns asset lifetimes; sections hold `Arc` references and
/// the asset system decides when an asset goes away. Material slots are
/// opaque ids into the host's material registry.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAsset {
    pub name: String,
    pub vertices: Vec<SectionVertex>,
    pub indices: Vec<u32>,
    pub material_slots: Vec<u32>,
    bounding_box: Aabb,
}

impl MeshAsset {
    /// Build an asset from raw streams. The bounding box is computed from the
    /// vertex positions once, here, and cached.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<SectionVertex>,
        indices: Vec<u32>,
        material_slots: Vec<u32>,
    ) -> Self {
        let bounding_box =
            Aabb::from_points(vertices.iter().map(|v| v.position.into()));
        Self {
            name: name.into(),
            vertices,
            indices,
            material_slots,
            bounding_box,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    /// Material id in `slot`, if the asset has one assigned there.
    pub fn material_slot(&self, slot: usize) -> Option<u32> {
        self.material_slots.get(slot).copied()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
