use std::{collections::HashMap, io::BufRead};

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

use crate::data_structures::asset::{MeshAsset, SectionVertex};

/**
 * Obj files don't come with tangents, so they have to be calculated here for
 * the tangent basis that the section vertex stream expects.
 */
pub fn load_asset_obj(file_name: &str) -> anyhow::Result<MeshAsset> {
    let (models, _materials) = tobj::load_obj(file_name, &tobj::GPU_LOAD_OPTIONS)?;
    build_asset(&models, file_name)
}

/// Same as [`load_asset_obj`], reading obj text from memory instead of a
/// file. Material libraries are not resolved; slots still come from the
/// material ids referenced by the models.
pub fn load_asset_obj_buf(reader: &mut impl BufRead, name: &str) -> anyhow::Result<MeshAsset> {
    let (models, _materials) = tobj::load_obj_buf(reader, &tobj::GPU_LOAD_OPTIONS, |_| {
        Ok((Vec::new(), HashMap::new()))
    })?;
    build_asset(&models, name)
}

fn build_asset(models: &[tobj::Model], file_name: &str) -> anyhow::Result<MeshAsset> {
    let mut vertices: Vec<SectionVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut material_slots: Vec<u32> = Vec::new();

    for m in models {
        if m.mesh.indices.is_empty() || m.mesh.positions.is_empty() {
            log::warn!(
                "Model {} in file {} has no geometry and was skipped.",
                m.name,
                file_name
            );
            continue;
        }

        let base_vertex = vertices.len() as u32;
        for i in 0..m.mesh.positions.len() / 3 {
            vertices.push(SectionVertex {
                position: [
                    m.mesh.positions[i * 3],
                    m.mesh.positions[i * 3 + 1],
                    m.mesh.positions[i * 3 + 2],
                ],
                normal: [
                    m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                    m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                    m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                ],
                // Accumulated below from the triangle data
                tangent: [0.0; 3],
                tex_coords: [
                    m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                    1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                ],
                color: [
                    m.mesh.vertex_color.get(i * 3).map_or(1.0, |f| *f),
                    m.mesh.vertex_color.get(i * 3 + 1).map_or(1.0, |f| *f),
                    m.mesh.vertex_color.get(i * 3 + 2).map_or(1.0, |f| *f),
                    1.0,
                ],
            });
        }

        compute_tangents(&mut vertices[base_vertex as usize..], &m.mesh.indices);

        indices.extend(m.mesh.indices.iter().map(|i| i + base_vertex));

        // Slot order follows model order; the component only consults slot 0.
        if let Some(material_id) = m.mesh.material_id {
            let id = material_id as u32;
            if !material_slots.contains(&id) {
                material_slots.push(id);
            }
        }
    }

    if vertices.is_empty() {
        anyhow::bail!("No usable geometry in {}", file_name);
    }

    Ok(MeshAsset::new(file_name, vertices, indices, material_slots))
}

/// Accumulate a per-vertex tangent from every triangle touching the vertex,
/// then normalize. Triangles with degenerate UVs contribute nothing.
fn compute_tangents(vertices: &mut [SectionVertex], indices: &[u32]) {
    let mut accumulated: Vec<Vector3<f32>> = vec![Vector3::zero(); vertices.len()];

    for c in indices.chunks_exact(3) {
        let [i0, i1, i2] = [c[0] as usize, c[1] as usize, c[2] as usize];

        let pos0: Vector3<f32> = vertices[i0].position.into();
        let pos1: Vector3<f32> = vertices[i1].position.into();
        let pos2: Vector3<f32> = vertices[i2].position.into();
        let uv0: Vector2<f32> = vertices[i0].tex_coords.into();
        let uv1: Vector2<f32> = vertices[i1].tex_coords.into();
        let uv2: Vector2<f32> = vertices[i2].tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        // Solve delta_pos = delta_uv.x * T + delta_uv.y * B for T
        let denom = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if denom.abs() <= f32::EPSILON {
            continue;
        }
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) / denom;

        accumulated[i0] += tangent;
        accumulated[i1] += tangent;
        accumulated[i2] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(accumulated) {
        if tangent.magnitude2() > 0.0 {
            vertex.tangent = tangent.normalize().into();
        }
    }
}
