//! The game-thread representation of one mesh section.

use std::sync::Arc;

use cgmath::Matrix4;

use crate::data_structures::{aabb::Aabb, asset::MeshAsset};

/// One section of a [`DeformMeshComponent`](crate::component::DeformMeshComponent):
/// a source asset, the deform transform applied to the whole section, the
/// accumulated local box and a visibility flag.
///
/// `local_box` only ever grows: every transform update unions in the asset
/// bounds as moved by the new transform, so a section that has been animated
/// back and forth stays inside its box. Replacing or clearing the section is
/// the only way to shrink it again.
#[derive(Clone, Debug)]
pub struct MeshSection {
    pub asset: Arc<MeshAsset>,
    pub deform_transform: Matrix4<f32>,
    pub local_box: Aabb,
    /// Material id from the asset's slot 0, recorded at creation time.
    /// `None` means the proxy falls back to the default material.
    pub material: Option<u32>,
    pub visible: bool,
}

impl MeshSection {
    /// A fresh section. The local box starts as the asset's own (undeformed)
    /// bounds; the deformation is not folded in until the first transform
    /// update.
    pub fn new(asset: Arc<MeshAsset>, deform_transform: Matrix4<f32>) -> Self {
        let mut local_box = Aabb::empty();
        local_box.union(&asset.bounding_box());
        let material = asset.material_slot(0);
        Self {
            asset,
            deform_transform,
            local_box,
            material,
            visible: true,
        }
    }
}
