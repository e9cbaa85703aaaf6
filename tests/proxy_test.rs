use approx::assert_relative_eq;
use deform_mesh::{
    DeformMeshComponent, FrameContext, Material, Matrix4, SceneView, SquareMatrix, Vector3,
    ViewFamily, wgpu,
};

mod common;
use common::{cube_asset, triangle_asset};

fn two_views() -> ViewFamily {
    ViewFamily {
        views: vec![SceneView::default(), SceneView::default()],
        wireframe: false,
    }
}

fn identity_frame() -> FrameContext {
    FrameContext {
        local_to_world: Matrix4::identity(),
        previous_local_to_world: Matrix4::identity(),
    }
}

#[test]
fn proxy_snapshots_the_store_including_holes() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("first", 1.0, vec![4]), Matrix4::identity());
    component.create_section(2, triangle_asset("third"), Matrix4::identity());
    component.set_section_visible(2, false);

    let proxy = component.create_scene_proxy();

    // Both arrays share the store's length, holes stay holes
    assert_eq!(proxy.section_count(), 3);
    assert_eq!(proxy.transform_table().len(), 3);
    assert!(proxy.section(1).is_none());

    let first = proxy.section(0).unwrap();
    assert_eq!(first.material, Material::Host(4));
    assert_eq!(first.num_indices(), 36);
    assert_eq!(first.max_vertex_index(), 7);
    assert!(first.is_visible());

    // Slot-less asset falls back to the default material
    let third = proxy.section(2).unwrap();
    assert_eq!(third.material, Material::Default);
    assert!(!third.is_visible());
}

#[test]
fn proxy_transforms_start_from_the_store_snapshot() {
    let mut component = DeformMeshComponent::new();
    let deform = Matrix4::from_translation(Vector3::new(3.0, 0.0, 0.0));
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), deform);

    let proxy = component.create_scene_proxy();
    assert_relative_eq!(proxy.transform_table().get(0).unwrap().w.x, 3.0);
    assert!(!proxy.transform_table().is_dirty());
    assert!(!proxy.upload_pending());
}

#[test]
fn stale_out_of_range_commands_are_dropped_by_the_handler() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    // Grow the store after the snapshot; the bridge still feeds the old
    // proxy, exactly the race a structural rebuild creates
    component.create_section(5, cube_asset("late", 1.0, vec![0]), Matrix4::identity());
    component.update_section_transform(5, Matrix4::from_translation(Vector3::new(9.0, 0.0, 0.0)));
    component.set_section_visible(5, false);

    proxy.drain_commands();

    assert_eq!(proxy.section_count(), 1);
    assert!(!proxy.transform_table().is_dirty());
    assert_relative_eq!(proxy.transform_table().get(0).unwrap().w.x, 0.0);
    assert!(proxy.section(0).unwrap().is_visible());
}

#[test]
fn batch_of_updates_consolidates_to_one_pending_upload() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("a", 1.0, vec![0]), Matrix4::identity());
    component.create_section(1, cube_asset("b", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    for i in 1..=25 {
        component.update_section_transform(0, Matrix4::from_translation(Vector3::new(i as f32, 0.0, 0.0)));
        component.update_section_transform(1, Matrix4::from_translation(Vector3::new(0.0, i as f32, 0.0)));
    }
    component.finish_transform_batch();
    proxy.drain_commands();

    // All 50 writes landed in the CPU array; exactly the final values remain
    assert_relative_eq!(proxy.transform_table().get(0).unwrap().w.x, 25.0);
    assert_relative_eq!(proxy.transform_table().get(1).unwrap().w.y, 25.0);
    assert!(proxy.transform_table().is_dirty());
    assert!(proxy.upload_pending());

    // A second drain with nothing queued changes nothing
    proxy.drain_commands();
    assert_relative_eq!(proxy.transform_table().get(0).unwrap().w.x, 25.0);
}

#[test]
fn consolidate_without_updates_requests_an_upload_of_nothing() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    component.finish_transform_batch();
    proxy.drain_commands();

    assert!(proxy.upload_pending());
    assert!(!proxy.transform_table().is_dirty());
}

#[test]
fn collect_emits_per_visible_section_per_visible_view() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("a", 1.0, vec![0]), Matrix4::identity());
    component.create_section(1, cube_asset("b", 1.0, vec![0]), Matrix4::identity());
    component.create_section(2, cube_asset("c", 1.0, vec![0]), Matrix4::identity());
    component.set_section_visible(1, false);
    let proxy = component.create_scene_proxy();

    // Both views visible: 2 visible sections x 2 views
    let submissions = proxy.collect_drawables(&two_views(), 0b11, &identity_frame());
    assert_eq!(submissions.len(), 4);

    // Only view 0 visible
    let submissions = proxy.collect_drawables(&two_views(), 0b01, &identity_frame());
    assert_eq!(submissions.len(), 2);
    assert!(submissions.iter().all(|s| s.view_index == 0));

    for submission in &submissions {
        assert_eq!(submission.first_index, 0);
        assert_eq!(submission.num_primitives, 12);
        assert_eq!(submission.max_vertex_index, 7);
        assert_eq!(submission.topology, wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(submission.material, Material::Host(0));
        assert!(!submission.reverse_culling);
        assert!(!submission.wireframe);
    }

    // Empty visibility map: nothing to draw
    let submissions = proxy.collect_drawables(&two_views(), 0, &identity_frame());
    assert!(submissions.is_empty());
}

#[test]
fn visibility_command_hides_a_section_from_collection() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    component.set_section_visible(0, false);
    proxy.drain_commands();

    let submissions = proxy.collect_drawables(&two_views(), 0b11, &identity_frame());
    assert!(submissions.is_empty());
}

#[test]
fn wireframe_view_family_overrides_every_material() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![5]), Matrix4::identity());
    let proxy = component.create_scene_proxy();

    let family = ViewFamily {
        views: vec![SceneView::default()],
        wireframe: true,
    };
    let submissions = proxy.collect_drawables(&family, 0b1, &identity_frame());
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].material, Material::Wireframe);
    assert!(submissions[0].wireframe);
}

#[test]
fn mirrored_world_transform_reverses_culling() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let proxy = component.create_scene_proxy();

    let frame = FrameContext {
        local_to_world: Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0),
        previous_local_to_world: Matrix4::identity(),
    };
    let family = ViewFamily {
        views: vec![SceneView::default()],
        wireframe: false,
    };
    let submissions = proxy.collect_drawables(&family, 0b1, &frame);
    assert!(submissions[0].reverse_culling);
}

#[test]
fn submission_uniforms_carry_frame_and_bounds_data() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let proxy = component.create_scene_proxy();

    let frame = FrameContext {
        local_to_world: Matrix4::from_translation(Vector3::new(5.0, 0.0, 0.0)),
        previous_local_to_world: Matrix4::from_translation(Vector3::new(4.0, 0.0, 0.0)),
    };
    let family = ViewFamily {
        views: vec![SceneView::default()],
        wireframe: false,
    };
    let submissions = proxy.collect_drawables(&family, 0b1, &frame);
    let uniforms = &submissions[0].uniforms;

    assert_relative_eq!(uniforms.local_to_world.w.x, 5.0);
    assert_relative_eq!(uniforms.previous_local_to_world.w.x, 4.0);
    assert_relative_eq!(uniforms.bounds.origin.x, 5.0);
    assert_relative_eq!(uniforms.bounds.box_extent.x, 1.0);
    assert_relative_eq!(uniforms.local_bounds.min.x, -1.0);
    assert_relative_eq!(uniforms.local_bounds.max.x, 1.0);
}

#[test]
fn resources_stay_staged_without_a_device_and_release_is_idempotent() {
    let mut component = DeformMeshComponent::new();
    component.create_section(0, cube_asset("cube", 1.0, vec![0]), Matrix4::identity());
    let mut proxy = component.create_scene_proxy();

    let section = proxy.section(0).unwrap();
    assert!(!section.index_buffer.is_initialized());
    assert!(!section.index_buffer.is_released());
    assert!(proxy.transform_table().buffer().is_none());

    proxy.release_resources();
    proxy.release_resources();
    assert!(proxy.section(0).unwrap().index_buffer.is_released());
    assert!(proxy.section(0).unwrap().vertex_stream.buffer.is_released());
}

#[test]
fn empty_component_builds_an_empty_proxy() {
    let mut component = DeformMeshComponent::new();
    let proxy = component.create_scene_proxy();

    assert_eq!(proxy.section_count(), 0);
    assert!(proxy.transform_table().is_empty());
    let submissions = proxy.collect_drawables(&two_views(), 0b11, &identity_frame());
    assert!(submissions.is_empty());
}
