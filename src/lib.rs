//! deform-mesh
//!
//! A deformable multi-section mesh primitive for wgpu-based renderers. A
//! component owns mesh sections (one static mesh asset + one 4x4 deform
//! matrix each) on the game-logic thread, while a scene proxy owns the
//! GPU-resident mirror on the render thread and answers the per-frame
//! draw-collection query. The two sides never share mutable state: data-only
//! updates cross over an ordered, fire-and-forget command bridge, and
//! structural changes rebuild the proxy from a fresh snapshot.
//!
//! High-level modules
//! - `component`: the authoritative section store and its caller-facing API
//! - `proxy`: the render-thread scene proxy, command handlers and draw query
//! - `bridge`: the one-way logic-to-render command channel
//! - `data_structures`: bounding volumes, the asset contract, section state
//! - `resources`: GPU buffer lifecycle and the OBJ asset loader
//!

pub mod bridge;
pub mod component;
pub mod data_structures;
pub mod proxy;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use crate::bridge::{CommandReceiver, CommandSender, SectionCommand, command_bridge};
pub use crate::component::DeformMeshComponent;
pub use crate::data_structures::aabb::{Aabb, Bounds};
pub use crate::data_structures::asset::{MeshAsset, SectionVertex, TransformRaw, Vertex};
pub use crate::data_structures::section::MeshSection;
pub use crate::proxy::{
    DeformMeshSceneProxy, DrawSubmission, FrameContext, Material, SceneView, SectionProxy,
    ViewFamily,
};
pub use cgmath::*;
pub use wgpu;
