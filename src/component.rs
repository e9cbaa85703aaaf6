//! The game-thread side of a deform mesh: the authoritative section store.
//!
//! A [`DeformMeshComponent`] owns an index-addressable collection of mesh
//! sections and never shares mutable state with the render thread. Cheap,
//! per-frame changes (transforms, visibility) are propagated to the current
//! scene proxy over the command bridge; structural changes (create, replace,
//! clear) instead mark the render state dirty so the host rebuilds the proxy
//! from a fresh snapshot.
//!
//! No operation here panics or returns an error: out-of-range indices are
//! silent no-ops and reads return sentinels, because a stale index in a
//! best-effort rendering path should degrade, not abort.

use std::sync::Arc;

use cgmath::Matrix4;

use crate::{
    bridge::{CommandSender, SectionCommand, command_bridge},
    data_structures::{
        aabb::{Aabb, Bounds},
        asset::MeshAsset,
        section::MeshSection,
    },
    proxy::DeformMeshSceneProxy,
};

/// The authoritative, CPU-side deform mesh state.
pub struct DeformMeshComponent {
    /// Sparse-safe slot array: writing index `i` grows the array and fills
    /// the holes with `None`, which is distinct from "index out of range".
    sections: Vec<Option<MeshSection>>,
    /// Union of all sections' local boxes; empty when no section has one.
    local_bounds: Aabb,
    /// User-tunable fudge factor applied to the exported world bounds.
    pub bounds_scale: f32,
    /// Set by structural changes, cleared by [`DeformMeshComponent::create_scene_proxy`].
    needs_rebuild: bool,
    /// Logic-thread end of the bridge to the current proxy, if one exists.
    bridge: Option<CommandSender>,
}

impl DeformMeshComponent {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            local_bounds: Aabb::empty(),
            bounds_scale: 1.0,
            needs_rebuild: false,
            bridge: None,
        }
    }

    /// Create a section at `index`, replacing whatever was there. The slot
    /// array grows as needed. The section's local box starts as the asset's
    /// own bounds (the deformation is not folded in yet) and the material is
    /// taken from the asset's first slot.
    ///
    /// Structural: the scene proxy must be rebuilt before the next frame.
    pub fn create_section(
        &mut self,
        index: usize,
        asset: Arc<MeshAsset>,
        transform: Matrix4<f32>,
    ) {
        self.set_section(index, MeshSection::new(asset, transform));
    }

    /// Wholesale slot replacement with a caller-built section. Structural.
    pub fn set_section(&mut self, index: usize, section: MeshSection) {
        self.ensure_len(index);
        log::debug!("Set deform mesh section {} ({})", index, section.asset.name);
        self.sections[index] = Some(section);
        self.update_local_bounds();
        self.mark_render_state_dirty();
    }

    /// Replace one section's deform transform. This is the hot path: it must
    /// never rebuild the proxy and never log.
    ///
    /// The section's local box is *unioned* with the asset bounds under the
    /// new transform, so bounds only grow across successive updates; only
    /// recreating or clearing the section resets them. Out of range or empty
    /// slots are a silent no-op.
    pub fn update_section_transform(&mut self, index: usize, transform: Matrix4<f32>) {
        let Some(Some(section)) = self.sections.get_mut(index) else {
            return;
        };
        section.deform_transform = transform;
        let deformed = section.asset.bounding_box().transform_by(&transform);
        section.local_box.union(&deformed);

        if let Some(bridge) = &self.bridge {
            bridge.send(SectionCommand::UpdateTransform { index, transform });
        }
        self.update_local_bounds();
    }

    /// Signal the end of a batch of transform updates, letting the render
    /// side fold all pending per-section writes into a single bulk upload of
    /// the consolidated buffer instead of locking it once per section.
    pub fn finish_transform_batch(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.send(SectionCommand::ConsolidateTransforms);
        }
    }

    /// Reset one slot. The slot stays in the index (the array does not
    /// shrink); its contents, accumulated bounds included, are gone.
    /// Structural. Out of range is a silent no-op.
    pub fn clear_section(&mut self, index: usize) {
        if let Some(slot) = self.sections.get_mut(index) {
            log::debug!("Cleared deform mesh section {}", index);
            *slot = None;
            self.update_local_bounds();
            self.mark_render_state_dirty();
        }
    }

    /// Empty the whole store. Structural.
    pub fn clear_all_sections(&mut self) {
        log::debug!("Cleared all deform mesh sections");
        self.sections.clear();
        self.update_local_bounds();
        self.mark_render_state_dirty();
    }

    /// Update the CPU visibility flag and propagate it to the proxy. Out of
    /// range or empty slots are a silent no-op. Not structural.
    pub fn set_section_visible(&mut self, index: usize, visible: bool) {
        let Some(Some(section)) = self.sections.get_mut(index) else {
            return;
        };
        section.visible = visible;
        if let Some(bridge) = &self.bridge {
            bridge.send(SectionCommand::SetVisibility { index, visible });
        }
    }

    /// False for holes and out-of-range indices alike.
    pub fn is_section_visible(&self, index: usize) -> bool {
        self.section(index).is_some_and(|s| s.visible)
    }

    /// Length of the slot array, holes included.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// `None` is the "not found" sentinel, for holes as well as indices past
    /// the end.
    pub fn section(&self, index: usize) -> Option<&MeshSection> {
        self.sections.get(index).and_then(|s| s.as_ref())
    }

    /// Aggregate of all sections' accumulated local boxes.
    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// The bounds exported to the host scene: the aggregate local box under
    /// `local_to_world`, scaled by [`DeformMeshComponent::bounds_scale`].
    /// Zero bounds at the origin when the store is empty.
    pub fn calc_bounds(&self, local_to_world: &Matrix4<f32>) -> Bounds {
        Bounds::from(self.local_bounds.transform_by(local_to_world)).scaled(self.bounds_scale)
    }

    /// Whether a structural change happened since the last proxy snapshot.
    pub fn needs_proxy_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Snapshot the store into a fresh render-thread proxy and install a new
    /// command bridge for it. The previous bridge (and with it any command
    /// still in flight toward the previous proxy) is abandoned.
    ///
    /// The host moves the returned proxy onto the render thread and calls
    /// `init_resources` there.
    pub fn create_scene_proxy(&mut self) -> DeformMeshSceneProxy {
        let (sender, receiver) = command_bridge();
        self.bridge = Some(sender);
        self.needs_rebuild = false;
        DeformMeshSceneProxy::new(
            &self.sections,
            self.local_bounds,
            self.bounds_scale,
            receiver,
        )
    }

    /// Grow the slot array so `index` is addressable, filling holes with the
    /// explicit "no section here" entry.
    fn ensure_len(&mut self, index: usize) {
        if index >= self.sections.len() {
            self.sections.resize_with(index + 1, || None);
        }
    }

    /// Recompute the aggregate local box from all populated slots.
    fn update_local_bounds(&mut self) {
        let mut bounds = Aabb::empty();
        for section in self.sections.iter().flatten() {
            bounds.union(&section.local_box);
        }
        self.local_bounds = bounds;
    }

    fn mark_render_state_dirty(&mut self) {
        self.needs_rebuild = true;
    }
}

impl Default for DeformMeshComponent {
    fn default() -> Self {
        Self::new()
    }
}
