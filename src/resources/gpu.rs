//! GPU resource lifecycle.
//!
//! Every GPU-resident object in this crate goes through the same three
//! states: built CPU-side first, realized on the device once the proxy
//! reaches the render thread, and released on teardown. The transitions are
//! idempotent, so callers never have to track whether a resource was already
//! initialized.

use wgpu::util::DeviceExt;

use crate::data_structures::asset::MeshAsset;

/// A buffer with an explicit two-phase lifecycle.
///
/// `Uninitialized` carries the staged contents, `ensure_ready` turns them
/// into a device buffer, `release` drops it. Calling a transition twice, or
/// `ensure_ready` after `release`, is a no-op.
#[derive(Debug)]
pub enum GpuBuffer {
    Uninitialized {
        label: String,
        usage: wgpu::BufferUsages,
        contents: Vec<u8>,
    },
    Initialized(wgpu::Buffer),
    Released,
}

impl GpuBuffer {
    pub fn new(label: impl Into<String>, usage: wgpu::BufferUsages, contents: Vec<u8>) -> Self {
        Self::Uninitialized {
            label: label.into(),
            usage,
            contents,
        }
    }

    /// Create the device buffer if it does not exist yet.
    ///
    /// Empty contents stay uninitialized: a component without sections has
    /// nothing to upload and wgpu has no use for a zero-size buffer.
    pub fn ensure_ready(&mut self, device: &wgpu::Device) {
        if let GpuBuffer::Uninitialized { label, usage, contents } = self {
            if contents.is_empty() {
                return;
            }
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label.as_str()),
                contents: contents.as_slice(),
                usage: *usage,
            });
            *self = GpuBuffer::Initialized(buffer);
        }
    }

    /// Drop the device buffer. Terminal: a released buffer stays released.
    pub fn release(&mut self) {
        *self = GpuBuffer::Released;
    }

    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        match self {
            GpuBuffer::Initialized(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, GpuBuffer::Initialized(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self, GpuBuffer::Released)
    }
}

/// The vertex stream of one section proxy: the vertex buffer staged from the
/// asset's vertex data plus the cached vertex count.
///
/// The layout of the stream is [`SectionVertex::desc`](crate::data_structures::asset::Vertex);
/// pipelines bind it as vertex buffer slot 0.
#[derive(Debug)]
pub struct VertexStream {
    pub buffer: GpuBuffer,
    vertex_count: u32,
}

impl VertexStream {
    pub fn from_asset(asset: &MeshAsset) -> Self {
        Self {
            buffer: GpuBuffer::new(
                format!("{} vertex buffer", asset.name),
                wgpu::BufferUsages::VERTEX,
                bytemuck::cast_slice(&asset.vertices).to_vec(),
            ),
            vertex_count: asset.vertex_count(),
        }
    }

    pub fn ensure_ready(&mut self, device: &wgpu::Device) {
        self.buffer.ensure_ready(device);
    }

    pub fn release(&mut self) {
        self.buffer.release();
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}
