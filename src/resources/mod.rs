/**
 * This module contains the GPU resource lifecycle and the loaders that turn
 * external files into mesh assets.
 */
pub mod gpu;
pub mod mesh;

pub use gpu::{GpuBuffer, VertexStream};
pub use mesh::{load_asset_obj, load_asset_obj_buf};
