//! The render-thread mirror of a deform mesh component.
//!
//! A [`DeformMeshSceneProxy`] is built once per structural change by
//! snapshotting the section store, and is never patched structurally
//! afterwards: adding, removing or clearing a section always means tearing
//! the proxy down and building a fresh one. Data-only changes (a transform, a
//! visibility bit) arrive over the command bridge and are applied by the
//! handlers below, strictly in submission order.
//!
//! The proxy owns everything the renderer needs to draw the component: one
//! [`SectionProxy`] per populated section slot, and a [`TransformTable`]
//! holding all deform transforms contiguously, backed by a single
//! consolidated GPU storage buffer that the vertex stage indexes per section.

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    bridge::{CommandReceiver, SectionCommand},
    data_structures::{
        aabb::{Aabb, Bounds},
        asset::TransformRaw,
        section::MeshSection,
    },
    resources::{GpuBuffer, VertexStream},
};

/// Material resolution for a draw submission. `Host` ids index the host's
/// material registry; `Default` is the guaranteed-available fallback for
/// sections whose asset has no slot-0 material; `Wireframe` is the
/// engine-wide override while the view family is in wireframe mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Material {
    Host(u32),
    Default,
    Wireframe,
}

/// Render-thread data for one mesh section.
///
/// 1. Vertex data: each section owns its vertex stream and index buffer
/// 2. Material: resolved once at proxy construction, default fallback applied
/// 3. Other data: visibility and the cached max vertex index
#[derive(Debug)]
pub struct SectionProxy {
    pub material: Material,
    pub index_buffer: GpuBuffer,
    pub vertex_stream: VertexStream,
    num_indices: u32,
    max_vertex_index: u32,
    visible: bool,
}

impl SectionProxy {
    fn new(section: &MeshSection) -> Self {
        let asset = section.asset.as_ref();
        Self {
            material: section.material.map_or(Material::Default, Material::Host),
            index_buffer: GpuBuffer::new(
                format!("{} index buffer", asset.name),
                wgpu::BufferUsages::INDEX,
                bytemuck::cast_slice(&asset.indices).to_vec(),
            ),
            vertex_stream: VertexStream::from_asset(asset),
            num_indices: asset.index_count(),
            // Cached here so draw collection doesn't have to chase the asset
            max_vertex_index: asset.vertex_count().saturating_sub(1),
            visible: section.visible,
        }
    }

    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    pub fn max_vertex_index(&self) -> u32 {
        self.max_vertex_index
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// The dense render-thread array of deform transforms, index-aligned with the
/// proxy's section array, plus the consolidated GPU buffer they are uploaded
/// to.
///
/// Individual command handlers only touch the CPU array and set the dirty
/// flag; [`TransformTable::upload`] folds any number of such writes into one
/// bulk buffer write.
#[derive(Debug)]
pub struct TransformTable {
    transforms: Vec<Matrix4<f32>>,
    buffer: GpuBuffer,
    dirty: bool,
}

impl TransformTable {
    fn new(transforms: Vec<Matrix4<f32>>) -> Self {
        let raw: Vec<TransformRaw> = transforms.iter().map(TransformRaw::from).collect();
        Self {
            buffer: GpuBuffer::new(
                "deform transforms",
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                bytemuck::cast_slice(&raw).to_vec(),
            ),
            transforms,
            dirty: false,
        }
    }

    /// Overwrite one entry. Out-of-range indices are dropped; a command may
    /// have been aimed at a proxy that has since been rebuilt with fewer
    /// sections.
    pub fn set(&mut self, index: usize, transform: Matrix4<f32>) {
        if let Some(entry) = self.transforms.get_mut(index) {
            *entry = transform;
            self.dirty = true;
        }
    }

    pub fn get(&self, index: usize) -> Option<&Matrix4<f32>> {
        self.transforms.get(index)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Whether the GPU buffer is stale relative to the CPU array.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The consolidated buffer, for binding as a shader resource.
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.buffer()
    }

    /// Copy the whole CPU array into the consolidated buffer in one write.
    /// No-op while clean or while the buffer is not resident.
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if !self.dirty {
            return;
        }
        if let Some(buffer) = self.buffer.buffer() {
            let raw: Vec<TransformRaw> = self.transforms.iter().map(TransformRaw::from).collect();
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&raw));
            self.dirty = false;
        }
    }

    fn ensure_ready(&mut self, device: &wgpu::Device) {
        self.buffer.ensure_ready(device);
    }

    fn release(&mut self) {
        self.buffer.release();
    }
}

/// One view the renderer wants the scene drawn for.
#[derive(Clone, Copy, Debug)]
pub struct SceneView {
    pub view_proj: Matrix4<f32>,
}

/// The set of views for the current frame. `wireframe` substitutes the
/// engine-wide wireframe material on every submission.
#[derive(Clone, Debug, Default)]
pub struct ViewFamily {
    pub views: Vec<SceneView>,
    pub wireframe: bool,
}

impl Default for SceneView {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::identity(),
        }
    }
}

/// Per-frame primitive data supplied by the host scene: where the component
/// sits this frame and where it sat last frame (for motion vectors).
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub local_to_world: Matrix4<f32>,
    pub previous_local_to_world: Matrix4<f32>,
}

/// Uniform data attached to one draw submission.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveUniforms {
    pub local_to_world: Matrix4<f32>,
    pub previous_local_to_world: Matrix4<f32>,
    pub bounds: Bounds,
    pub local_bounds: Aabb,
}

/// One "draw this" answer to the renderer's per-frame query: the section's
/// GPU resources plus everything frame-specific the draw needs.
#[derive(Debug)]
pub struct DrawSubmission<'a> {
    pub view_index: usize,
    pub material: Material,
    pub vertex_stream: &'a VertexStream,
    pub index_buffer: &'a GpuBuffer,
    /// Index buffers are contiguous from zero, so the full range is drawn.
    pub first_index: u32,
    pub num_primitives: u32,
    pub max_vertex_index: u32,
    pub topology: wgpu::PrimitiveTopology,
    /// A mirrored local-to-world (negative determinant) flips triangle
    /// winding; the renderer must reverse culling to keep normals correct.
    pub reverse_culling: bool,
    pub wireframe: bool,
    pub uniforms: PrimitiveUniforms,
}

/// The render-thread state of one deform mesh component.
#[derive(Debug)]
pub struct DeformMeshSceneProxy {
    /// Index-aligned with the store snapshot; empty slots stay `None` so
    /// command indices keep meaning the same section.
    sections: Vec<Option<SectionProxy>>,
    transforms: TransformTable,
    local_bounds: Aabb,
    bounds_scale: f32,
    commands: CommandReceiver,
    upload_requested: bool,
}

impl DeformMeshSceneProxy {
    /// Snapshot construction. Copies everything the render thread will ever
    /// read out of the store: per-section GPU resource staging, resolved
    /// materials, visibility, transforms and bounds. The section array and
    /// the transform array get the same fixed length and are never resized;
    /// a structural change builds a whole new proxy instead.
    pub(crate) fn new(
        sections: &[Option<MeshSection>],
        local_bounds: Aabb,
        bounds_scale: f32,
        commands: CommandReceiver,
    ) -> Self {
        let mut proxies = Vec::with_capacity(sections.len());
        let mut transforms = Vec::with_capacity(sections.len());

        for slot in sections {
            match slot {
                Some(section) => {
                    proxies.push(Some(SectionProxy::new(section)));
                    transforms.push(section.deform_transform);
                }
                None => {
                    proxies.push(None);
                    transforms.push(Matrix4::identity());
                }
            }
        }

        log::debug!(
            "Built deform mesh scene proxy with {} section slot(s)",
            proxies.len()
        );

        Self {
            sections: proxies,
            transforms: TransformTable::new(transforms),
            local_bounds,
            bounds_scale,
            commands,
            upload_requested: false,
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, index: usize) -> Option<&SectionProxy> {
        self.sections.get(index).and_then(|s| s.as_ref())
    }

    pub fn transform_table(&self) -> &TransformTable {
        &self.transforms
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// Whether a `ConsolidateTransforms` command has been drained and not yet
    /// honored by [`DeformMeshSceneProxy::upload_transforms`].
    pub fn upload_pending(&self) -> bool {
        self.upload_requested
    }

    /// Realize every staged GPU resource on the device. Idempotent; hosts
    /// call this right after moving a freshly built proxy onto the render
    /// thread.
    pub fn init_resources(&mut self, device: &wgpu::Device) {
        for section in self.sections.iter_mut().flatten() {
            section.vertex_stream.ensure_ready(device);
            section.index_buffer.ensure_ready(device);
        }
        self.transforms.ensure_ready(device);
    }

    /// Drop every GPU resource. Idempotent; also runs on drop.
    pub fn release_resources(&mut self) {
        for section in self.sections.iter_mut().flatten() {
            section.vertex_stream.release();
            section.index_buffer.release();
        }
        self.transforms.release();
    }

    /// Apply every queued command, strictly in submission order. Render
    /// thread only; hosts call this once per frame before draw collection.
    pub fn drain_commands(&mut self) {
        // Collecting first releases the borrow on the receiver
        let queued: Vec<SectionCommand> = self.commands.drain().collect();
        for command in queued {
            match command {
                SectionCommand::UpdateTransform { index, transform } => {
                    self.update_deform_transform(index, transform);
                }
                SectionCommand::SetVisibility { index, visible } => {
                    self.set_section_visibility(index, visible);
                }
                SectionCommand::ConsolidateTransforms => {
                    self.upload_requested = true;
                }
            }
        }
    }

    /// Honor a drained `ConsolidateTransforms`: one bulk copy of the CPU
    /// transform array into the consolidated buffer. Render thread only;
    /// no-op when nothing was requested or nothing is dirty.
    pub fn upload_transforms(&mut self, queue: &wgpu::Queue) {
        if self.upload_requested {
            self.transforms.upload(queue);
            self.upload_requested = false;
        }
    }

    /// Transform handler: only the CPU-side entry changes here, the GPU
    /// buffer goes stale until the next consolidation.
    fn update_deform_transform(&mut self, index: usize, transform: Matrix4<f32>) {
        if self.section(index).is_some() {
            self.transforms.set(index, transform);
        }
    }

    /// Visibility handler. Out-of-range or empty slots are dropped, same as
    /// every other handler: the command may predate a structural rebuild.
    fn set_section_visibility(&mut self, index: usize, visible: bool) {
        if let Some(Some(section)) = self.sections.get_mut(index) {
            section.visible = visible;
        }
    }

    /// The renderer's per-frame query: one submission per visible section per
    /// view whose bit is set in `visibility_map`.
    pub fn collect_drawables<'a>(
        &'a self,
        view_family: &ViewFamily,
        visibility_map: u32,
        frame: &FrameContext,
    ) -> Vec<DrawSubmission<'a>> {
        let reverse_culling = frame.local_to_world.determinant() < 0.0;
        let bounds = Bounds::from(self.local_bounds.transform_by(&frame.local_to_world))
            .scaled(self.bounds_scale);
        let uniforms = PrimitiveUniforms {
            local_to_world: frame.local_to_world,
            previous_local_to_world: frame.previous_local_to_world,
            bounds,
            local_bounds: self.local_bounds,
        };

        let mut submissions = Vec::new();
        for section in self.sections.iter().flatten() {
            if !section.visible {
                continue;
            }
            let material = if view_family.wireframe {
                Material::Wireframe
            } else {
                section.material
            };
            for view_index in 0..view_family.views.len() {
                if visibility_map & (1 << view_index) == 0 {
                    continue;
                }
                submissions.push(DrawSubmission {
                    view_index,
                    material,
                    vertex_stream: &section.vertex_stream,
                    index_buffer: &section.index_buffer,
                    first_index: 0,
                    num_primitives: section.num_indices / 3,
                    max_vertex_index: section.max_vertex_index,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    reverse_culling,
                    wireframe: view_family.wireframe,
                    uniforms,
                });
            }
        }
        submissions
    }
}

impl Drop for DeformMeshSceneProxy {
    fn drop(&mut self) {
        log::debug!("Tearing down deform mesh scene proxy");
        self.release_resources();
    }
}
