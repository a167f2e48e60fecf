//! Scene state tests
//!
//! Tests for:
//! - LightRegistry slot stability, capacity and versioning
//! - FrameState defaults and material preset selection
//! - MotionHistory use-then-store ordering
//! - Camera pitch / zoom clamps and movement
//! - Shape draw calls through a recording DrawRecorder
//! - Model preset swaps and spin

use glam::{Mat4, Vec3};
use lumina::errors::LuminaError;
use lumina::resources::{MaterialPreset, ModelPreset, ToneMappingMode};
use lumina::scene::{
    AttenuationModel, Camera, CameraMovement, DirectionalLight, DrawCall, DrawRecorder,
    FrameState, GBufferView, Light, LightKind, LightRegistry, MAX_DIRECTIONAL_LIGHTS,
    MAX_POINT_LIGHTS, Model, MotionHistory, PointLight, Scene, Shape, ShapeKind,
};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn point(x: f32) -> PointLight {
    PointLight::new(Vec3::new(x, 0.0, 0.0), Vec3::ONE, 3.0)
}

#[derive(Default)]
struct RecordedDraws {
    calls: Vec<(wgpu::PrimitiveTopology, u32)>,
}

impl DrawRecorder for RecordedDraws {
    fn record(&mut self, call: DrawCall<'_>) {
        self.calls.push((call.topology, call.vertex_count));
    }
}

// ============================================================================
// LightRegistry
// ============================================================================

#[test]
fn slots_stay_stable_when_earlier_lights_are_removed() {
    let mut lights = LightRegistry::new();
    let a = lights.add_point(point(0.0)).unwrap();
    let b = lights.add_point(point(1.0)).unwrap();
    let c = lights.add_point(point(2.0)).unwrap();

    lights.remove(a).unwrap();

    assert_eq!(b.slot(), 1);
    assert_eq!(c.slot(), 2);
    assert!(approx(lights.point(c).unwrap().position.x, 2.0));

    let slots: Vec<bool> = lights.point_slots().map(|s| s.is_some()).collect();
    assert_eq!(slots, vec![false, true, true]);
}

#[test]
fn freed_slot_is_reused_and_stale_ids_are_rejected() {
    let mut lights = LightRegistry::new();
    let a = lights.add_point(point(0.0)).unwrap();
    lights.add_point(point(1.0)).unwrap();
    lights.remove(a).unwrap();

    let d = lights.add_point(point(5.0)).unwrap();
    assert_eq!(d.slot(), a.slot());
    assert_ne!(d, a);

    assert!(lights.point(a).is_none());
    assert!(lights.remove(a).is_none());
    assert!(approx(lights.point(d).unwrap().position.x, 5.0));
}

#[test]
fn capacity_is_enforced_per_kind() {
    let mut lights = LightRegistry::new();
    for i in 0..MAX_POINT_LIGHTS {
        lights.add_point(point(i as f32)).unwrap();
    }
    let err = lights.add_point(point(99.0)).unwrap_err();
    assert!(matches!(
        err,
        LuminaError::LightCapacityExceeded { capacity, .. } if capacity == MAX_POINT_LIGHTS
    ));

    for _ in 0..MAX_DIRECTIONAL_LIGHTS {
        lights
            .add_directional(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE))
            .unwrap();
    }
    assert!(
        lights
            .add_directional(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE))
            .is_err()
    );
    assert_eq!(lights.point_count(), MAX_POINT_LIGHTS);
    assert_eq!(lights.directional_count(), MAX_DIRECTIONAL_LIGHTS);
}

#[test]
fn accessors_check_the_light_kind() {
    let mut lights = LightRegistry::new();
    let p = lights.add_point(point(0.0)).unwrap();
    let d = lights
        .add_directional(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE))
        .unwrap();

    assert_eq!(p.kind(), LightKind::Point);
    assert_eq!(d.kind(), LightKind::Directional);
    assert!(lights.directional(p).is_none());
    assert!(lights.point(d).is_none());
    assert!(matches!(lights.get(d), Some(Light::Directional(_))));
}

#[test]
fn version_moves_on_every_change() {
    let mut lights = LightRegistry::new();
    let v0 = lights.version();
    let id = lights.add_point(point(0.0)).unwrap();
    let v1 = lights.version();
    assert!(v1 > v0);

    let mut moved = *lights.point(id).unwrap();
    moved.position = Vec3::ONE;
    assert!(lights.update(id, Light::Point(moved)));
    assert!(lights.version() > v1);
    assert_eq!(lights.point(id).unwrap().position, Vec3::ONE);
}

#[test]
fn update_rejects_kind_mismatch_without_bumping_version() {
    let mut lights = LightRegistry::new();
    let id = lights.add_point(point(0.0)).unwrap();
    let version = lights.version();
    let wrong = Light::Directional(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE));
    assert!(!lights.update(id, wrong));
    assert_eq!(lights.version(), version);
}

#[test]
fn mutable_access_through_stale_id_keeps_version() {
    let mut lights = LightRegistry::new();
    let stale = lights.add_point(point(0.0)).unwrap();
    let sun = lights
        .add_directional(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE))
        .unwrap();
    lights.remove(stale).unwrap();
    lights.remove(sun).unwrap();
    let version = lights.version();

    assert!(lights.point_mut(stale).is_none());
    assert!(lights.directional_mut(sun).is_none());
    assert!(lights.point_mut(sun).is_none());
    assert_eq!(lights.version(), version);

    let live = lights.add_point(point(1.0)).unwrap();
    let version = lights.version();
    lights.point_mut(live).unwrap().radius = 5.0;
    assert!(lights.version() > version);
}

#[test]
fn ids_list_points_before_directionals() {
    let scene = Scene::with_default_lights(16.0 / 9.0).unwrap();
    let kinds: Vec<LightKind> = scene.lights.ids().map(|id| id.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            LightKind::Point,
            LightKind::Point,
            LightKind::Point,
            LightKind::Directional
        ]
    );
}

#[test]
fn intensity_scales_radiance_not_color() {
    let mut light = PointLight::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.0), 3.0);
    light.intensity = 4.0;
    assert_eq!(light.radiance(), Vec3::new(4.0, 2.0, 0.0));
    assert_eq!(light.color, Vec3::new(1.0, 0.5, 0.0));
}

// ============================================================================
// FrameState
// ============================================================================

#[test]
fn frame_state_defaults_match_reference_scene() {
    let s = FrameState::default();
    assert!(s.point_lights && s.directional_lights && s.ibl && s.sao.enabled);
    assert!(!s.fxaa && !s.motion_blur.enabled);
    assert_eq!(s.tone_mapping, ToneMappingMode::Reinhard);
    assert_eq!(s.attenuation, AttenuationModel::Ue4);
    assert_eq!(s.gbuffer_view, GBufferView::Final);

    assert_eq!(s.sao.samples, 30);
    assert_eq!(s.sao.turns, 7);
    assert_eq!(s.sao.blur_size, 4);
    assert!(approx(s.sao.radius, 0.3));
    assert_eq!(s.motion_blur.max_samples, 32);

    assert!(approx(s.exposure.aperture, 16.0));
    assert!(approx(s.exposure.shutter_speed, 0.5));
    assert!(approx(s.exposure.iso, 1000.0));

    assert!(approx(s.material.roughness, 0.01));
    assert!(approx(s.material.metallic, 0.02));
    assert_eq!(s.material.f0, Vec3::splat(0.04));
    assert!(approx(s.material.ambient_intensity, 0.005));
    assert!(approx(s.model.rotation_speed, 0.6));
}

#[test]
fn selecting_shiny_applies_its_f0() {
    let mut s = FrameState::default();
    s.select_material(MaterialPreset::Shiny);
    assert_eq!(s.material_preset, MaterialPreset::Shiny);
    assert_eq!(s.material.f0, Vec3::new(1.0, 0.72, 0.29));

    // Reselecting the active preset keeps a user-edited F0.
    s.material.f0 = Vec3::ONE;
    s.select_material(MaterialPreset::Shiny);
    assert_eq!(s.material.f0, Vec3::ONE);

    s.select_material(MaterialPreset::Granite);
    assert_eq!(s.material.f0, Vec3::splat(0.04));
}

#[test]
fn gbuffer_views_cover_nine_function_keys() {
    assert_eq!(GBufferView::all().len(), 9);
    assert_eq!(GBufferView::from_function_key(0), None);
    assert_eq!(GBufferView::from_function_key(10), None);
    for n in 1..=9 {
        let view = GBufferView::from_function_key(n).unwrap();
        assert_eq!(view.shader_index(), n);
    }
}

#[test]
fn ue4_attenuation_reaches_zero_at_radius() {
    let ue4 = AttenuationModel::Ue4;
    assert!(approx(ue4.evaluate(3.0, 3.0), 0.0));
    assert!(ue4.evaluate(1.0, 3.0) > ue4.evaluate(2.0, 3.0));
    assert!(approx(AttenuationModel::Quadratic.evaluate(2.0, 3.0), 0.25));
}

// ============================================================================
// MotionHistory
// ============================================================================

#[test]
fn first_frame_sees_its_own_matrix() {
    let mut history = MotionHistory::new();
    let m = Mat4::from_translation(Vec3::X);
    assert_eq!(history.advance(m), m);
}

#[test]
fn history_returns_previous_then_stores_current() {
    let mut history = MotionHistory::new();
    let a = Mat4::from_translation(Vec3::X);
    let b = Mat4::from_translation(Vec3::Y);
    let c = Mat4::from_translation(Vec3::Z);

    history.advance(a);
    assert_eq!(history.advance(b), a);
    assert_eq!(history.advance(c), b);
    assert_eq!(history.previous(), Some(c));

    history.reset();
    assert_eq!(history.advance(a), a);
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_starts_at_reference_pose() {
    let camera = Camera::default();
    assert_eq!(camera.position, Vec3::new(0.0, 0.0, 4.0));
    assert!((camera.front() - Vec3::NEG_Z).length() < EPSILON);
    assert!(approx(camera.near, 0.1));
    assert!(approx(camera.far, 100.0));
}

#[test]
fn pitch_is_clamped() {
    let mut camera = Camera::default();
    camera.process_mouse(0.0, 10_000.0);
    assert!(approx(camera.pitch(), Camera::PITCH_LIMIT));
    camera.process_mouse(0.0, -20_000.0);
    assert!(approx(camera.pitch(), -Camera::PITCH_LIMIT));
}

#[test]
fn zoom_is_clamped() {
    let mut camera = Camera::default();
    camera.process_scroll(1000.0);
    assert!(approx(camera.fov_degrees(), Camera::MIN_FOV));
    camera.process_scroll(-1000.0);
    assert!(approx(camera.fov_degrees(), Camera::MAX_FOV));
}

#[test]
fn movement_scales_with_delta_time() {
    let mut camera = Camera::default();
    let start = camera.position;
    camera.process_movement(CameraMovement::Right, 0.25);
    let moved = camera.position - start;
    assert!((moved - Vec3::X * camera.speed * 0.25).length() < EPSILON);
}

// ============================================================================
// Shapes & model
// ============================================================================

#[test]
fn shapes_issue_one_draw_of_their_vertex_count() {
    let mut recorder = RecordedDraws::default();
    for kind in [ShapeKind::Cube, ShapeKind::Plane, ShapeKind::Quad] {
        Shape::new(kind).draw(&mut recorder);
    }
    assert_eq!(
        recorder.calls,
        vec![
            (wgpu::PrimitiveTopology::TriangleList, 36),
            (wgpu::PrimitiveTopology::TriangleList, 6),
            (wgpu::PrimitiveTopology::TriangleStrip, 4),
        ]
    );
}

#[test]
fn shape_vertex_bytes_match_counts() {
    for kind in [ShapeKind::Cube, ShapeKind::Plane, ShapeKind::Quad] {
        let stride = kind.vertex_layout().array_stride as usize;
        assert_eq!(kind.vertex_bytes().len(), stride * kind.vertex_count() as usize);
    }
}

#[test]
fn model_reset_reports_real_swaps_only() {
    let mut model = Model::new(ModelPreset::Sphere);
    assert!(!model.reset(ModelPreset::Sphere));
    assert!(model.reset(ModelPreset::Torus));
    assert_eq!(model.preset(), ModelPreset::Torus);
    assert!(model.mesh().triangle_count() > 0);
}

#[test]
fn scene_update_follows_model_preset() {
    let mut scene = Scene::new(1.0);
    let state = FrameState {
        model_preset: ModelPreset::Pyramid,
        time_seconds: 5.0,
        ..Default::default()
    };
    scene.update(&state);
    assert_eq!(scene.model.preset(), ModelPreset::Pyramid);
    assert!(approx(scene.model.transform.rotation_angle, 0.6));
}
