use std::sync::Arc;

use deform_mesh::{MeshAsset, SectionVertex};

/// An axis-aligned cube from -extent to +extent with 12 triangles, enough
/// geometry for bounds and draw-collection assertions.
pub fn cube_asset(name: &str, extent: f32, material_slots: Vec<u32>) -> Arc<MeshAsset> {
    let mut vertices = Vec::with_capacity(8);
    for i in 0..8u32 {
        let x = if i & 1 == 0 { -extent } else { extent };
        let y = if i & 2 == 0 { -extent } else { extent };
        let z = if i & 4 == 0 { -extent } else { extent };
        vertices.push(SectionVertex {
            position: [x, y, z],
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0],
            tex_coords: [0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        });
    }
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 3, 3, 2, 0, // -z
        4, 6, 7, 7, 5, 4, // +z
        0, 4, 5, 5, 1, 0, // -y
        2, 3, 7, 7, 6, 2, // +y
        0, 2, 6, 6, 4, 0, // -x
        1, 5, 7, 7, 3, 1, // +x
    ];
    Arc::new(MeshAsset::new(name, vertices, indices, material_slots))
}

/// The smallest drawable asset: one triangle, no material slots.
#[allow(dead_code)]
pub fn triangle_asset(name: &str) -> Arc<MeshAsset> {
    let vertices = vec![
        SectionVertex {
            position: [0.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0],
            tex_coords: [0.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        },
        SectionVertex {
            position: [1.0, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0],
            tex_coords: [1.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        },
        SectionVertex {
            position: [0.0, 1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            tangent: [1.0, 0.0, 0.0],
            tex_coords: [0.0, 1.0],
            color: [1.0, 1.0, 1.0, 1.0],
        },
    ];
    Arc::new(MeshAsset::new(name, vertices, vec![0, 1, 2], vec![]))
}
