//! GPU smoke tests. These need a real adapter, so they only run with
//! `--features integration-tests`, same as the image tests upstream engines
//! gate behind CI-only flags.
#![cfg(feature = "integration-tests")]

use deform_mesh::{DeformMeshComponent, Matrix4, SquareMatrix, Vector3, wgpu};

mod common;
use common::cube_asset;

fn request_device() -> (wgpu::Device, wgpu::Queue) {
    let _ = env_logger::builder().is_test(true).try_init();
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .unwrap();
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .unwrap()
    })
}

#[test]
fn init_resources_realizes_every_staged_buffer() {
    let (device, _queue) = request_device();

    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    proxy.init_resources(&device);
    let section = proxy.section(0).unwrap();
    assert!(section.index_buffer.is_initialized());
    assert!(section.vertex_stream.buffer.is_initialized());
    assert!(proxy.transform_table().buffer().is_some());

    // ensure_ready is idempotent
    proxy.init_resources(&device);
    assert!(proxy.section(0).unwrap().index_buffer.is_initialized());
}

#[test]
fn upload_transforms_performs_one_bulk_copy_and_clears_dirty() {
    let (device, queue) = request_device();

    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();
    proxy.init_resources(&device);

    for i in 1..=10 {
        component
            .update_section_transform(0, Matrix4::from_translation(Vector3::new(i as f32, 0.0, 0.0)));
    }
    component.finish_transform_batch();

    proxy.drain_commands();
    assert!(proxy.transform_table().is_dirty());

    proxy.upload_transforms(&queue);
    assert!(!proxy.transform_table().is_dirty());
    assert!(!proxy.upload_pending());

    // Nothing left to fold in, the next call must be a no-op
    proxy.upload_transforms(&queue);
    assert!(!proxy.transform_table().is_dirty());
}

#[test]
fn released_resources_stay_released() {
    let (device, _queue) = request_device();

    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    proxy.init_resources(&device);
    proxy.release_resources();
    assert!(proxy.section(0).unwrap().index_buffer.is_released());

    // Teardown is terminal; re-initializing must not resurrect the buffer
    proxy.init_resources(&device);
    assert!(proxy.section(0).unwrap().index_buffer.is_released());
}
