//! Renderer CPU-side tests
//!
//! Tests for:
//! - Render target completeness validation
//! - Lighting uniform table offsets and GPU light packing
//! - Environment capture views, prefilter mip sizes and roughness
//! - EV100 exposure, tone mapping selectors, motion blur scaling
//! - SAO uniform packing

use glam::{Mat4, Vec3, Vec4};
use lumina::errors::LuminaError;
use lumina::renderer::core::{
    AttachmentSpec, CubeTargetDesc, FrameTimings, GBuffer, GpuDirectionalLight, GpuPointLight,
    LIGHTING_LAYOUT, LightingFlags, LightingGlobals, PassTiming, RenderTargetDesc,
    validate_cube_target, validate_target,
};
use lumina::renderer::graph::passes::environment::{capture_projection, capture_views};
use lumina::renderer::graph::passes::post_process::PostUniforms;
use lumina::renderer::settings::full_mip_count;
use lumina::renderer::{EnvironmentSettings, RendererSettings};
use lumina::resources::{
    CameraExposure, SaoSettings, ToneMappingMode, motion_blur_sample_count, motion_blur_scale,
};
use lumina::scene::{DirectionalLight, FrameState, GBufferView, MAX_POINT_LIGHTS, PointLight};

// ============================================================================
// Helpers
// ============================================================================

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn limits() -> wgpu::Limits {
    wgpu::Limits::default()
}

fn reason_of(result: lumina::errors::Result<()>) -> String {
    match result {
        Err(LuminaError::IncompleteRenderTarget { reason, .. }) => reason,
        other => panic!("expected an incomplete target, got {other:?}"),
    }
}

// ============================================================================
// Render target validation
// ============================================================================

#[test]
fn complete_targets_validate() {
    let features = wgpu::Features::empty();
    validate_target(&GBuffer::descriptor(1280, 720), &limits(), features).unwrap();

    let depth_only = RenderTargetDesc::new("Depth", 64, 64)
        .with_depth(AttachmentSpec::new("Depth", wgpu::TextureFormat::Depth32Float));
    validate_target(&depth_only, &limits(), features).unwrap();
}

#[test]
fn zero_sized_target_is_incomplete() {
    let desc = RenderTargetDesc::new("Empty", 0, 720)
        .with_color(AttachmentSpec::new("c", wgpu::TextureFormat::Rgba8Unorm));
    let reason = reason_of(validate_target(&desc, &limits(), wgpu::Features::empty()));
    assert!(reason.contains("zero-sized"));
}

#[test]
fn target_without_attachments_is_incomplete() {
    let desc = RenderTargetDesc::new("Nothing", 16, 16);
    let reason = reason_of(validate_target(&desc, &limits(), wgpu::Features::empty()));
    assert!(reason.contains("no attachments"));
}

#[test]
fn oversized_target_is_incomplete() {
    let max = limits().max_texture_dimension_2d;
    let desc = RenderTargetDesc::new("Huge", max + 1, 16)
        .with_color(AttachmentSpec::new("c", wgpu::TextureFormat::Rgba8Unorm));
    assert!(validate_target(&desc, &limits(), wgpu::Features::empty()).is_err());
}

#[test]
fn depth_format_as_color_is_incomplete() {
    let desc = RenderTargetDesc::new("Bad", 16, 16)
        .with_color(AttachmentSpec::new("c", wgpu::TextureFormat::Depth32Float));
    let reason = reason_of(validate_target(&desc, &limits(), wgpu::Features::empty()));
    assert!(reason.contains("not color-renderable"));
}

#[test]
fn color_format_as_depth_is_incomplete() {
    let desc = RenderTargetDesc::new("Bad", 16, 16)
        .with_depth(AttachmentSpec::new("d", wgpu::TextureFormat::Rgba8Unorm));
    let reason = reason_of(validate_target(&desc, &limits(), wgpu::Features::empty()));
    assert!(reason.contains("no depth aspect"));
}

#[test]
fn too_many_color_attachments_are_incomplete() {
    let mut desc = RenderTargetDesc::new("Wide", 16, 16);
    for _ in 0..=limits().max_color_attachments {
        desc = desc.with_color(AttachmentSpec::new("c", wgpu::TextureFormat::R8Unorm));
    }
    assert!(validate_target(&desc, &limits(), wgpu::Features::empty()).is_err());
}

#[test]
fn cube_mip_chain_is_bounded_by_face_size() {
    let features = wgpu::Features::empty();
    let ok = CubeTargetDesc {
        label: "Cube",
        size: 512,
        mip_levels: full_mip_count(512),
        format: wgpu::TextureFormat::Rgba16Float,
    };
    validate_cube_target(&ok, &limits(), features).unwrap();

    let too_deep = CubeTargetDesc {
        mip_levels: full_mip_count(512) + 1,
        ..ok
    };
    assert!(validate_cube_target(&too_deep, &limits(), features).is_err());

    let no_mips = CubeTargetDesc { mip_levels: 0, ..ok };
    assert!(validate_cube_target(&no_mips, &limits(), features).is_err());
}

// ============================================================================
// Lighting uniform table
// ============================================================================

#[test]
fn lighting_layout_offsets_are_resolved_once_and_aligned() {
    let layout = LIGHTING_LAYOUT;
    assert_eq!(layout.globals, 0);
    assert_eq!(size_of::<LightingGlobals>(), 256);
    assert_eq!(layout.points, 256);
    assert_eq!(layout.point_stride, 48);
    assert_eq!(
        layout.directionals,
        layout.points + layout.point_stride * MAX_POINT_LIGHTS as u64
    );
    assert_eq!(layout.directional_stride, 32);
    assert_eq!(layout.size % 16, 0);

    assert_eq!(layout.point_offset(3), 256 + 3 * 48);
    assert_eq!(layout.directional_offset(1), layout.directionals + 32);
}

#[test]
fn gpu_lights_are_view_space_and_premultiplied() {
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0));
    let mut light = PointLight::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.0), 3.0);
    light.intensity = 2.0;

    let gpu = GpuPointLight::from_light(&light, &view);
    assert_eq!(gpu.position, [1.0, 0.0, -4.0]);
    assert_eq!(gpu.color, [2.0, 1.0, 0.0, 1.0]);
    assert_eq!(gpu.enabled, 1);
    // The CPU light keeps its unscaled color.
    assert_eq!(light.color, Vec3::new(1.0, 0.5, 0.0));

    let sun = DirectionalLight::new(Vec3::new(0.0, -2.0, 0.0), Vec3::ONE);
    let gpu = GpuDirectionalLight::from_light(&sun, &Mat4::IDENTITY);
    assert!(approx(Vec3::from_array(gpu.direction).length(), 1.0));
}

#[test]
fn lighting_flags_follow_toggles() {
    let mut state = FrameState::default();
    assert_eq!(LightingFlags::from_state(&state), LightingFlags::all());

    state.ibl = false;
    state.sao.enabled = false;
    let flags = LightingFlags::from_state(&state);
    assert!(flags.contains(LightingFlags::POINT_LIGHTS | LightingFlags::DIRECTIONAL_LIGHTS));
    assert!(!flags.intersects(LightingFlags::IBL | LightingFlags::SAO));
}

// ============================================================================
// Environment precompute geometry
// ============================================================================

#[test]
fn each_capture_view_centers_its_face_direction() {
    let proj = capture_projection();
    let faces = [
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    for (view, dir) in capture_views().iter().zip(faces) {
        let clip = proj * *view * dir.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4, "{dir:?} -> {ndc:?}");
    }
}

#[test]
fn capture_projection_covers_ninety_degrees() {
    let proj = capture_projection();
    // A direction 45° off the -Z axis lands on the face edge.
    let edge = proj * Vec4::new(1.0, 0.0, -1.0, 1.0);
    assert!(approx(edge.x / edge.w, 1.0));
}

#[test]
fn environment_defaults_and_mip_sizes() {
    let s = EnvironmentSettings::default();
    assert_eq!(s.cube_size, 512);
    assert_eq!(s.irradiance_size, 32);
    assert_eq!(s.prefilter_size, 128);
    assert_eq!(s.prefilter_mips, 5);
    assert_eq!(s.brdf_lut_size, 512);
    assert_eq!(s.cube_mip_count(), 10);

    let sizes: Vec<u32> = (0..s.prefilter_mips).map(|m| s.prefilter_mip_size(m)).collect();
    assert_eq!(sizes, vec![128, 64, 32, 16, 8]);
}

#[test]
fn prefilter_roughness_spans_zero_to_one() {
    let s = EnvironmentSettings::default();
    let roughness: Vec<f32> = (0..s.prefilter_mips)
        .map(|m| s.prefilter_roughness(m))
        .collect();
    assert_eq!(roughness, vec![0.0, 0.25, 0.5, 0.75, 1.0]);

    let single = EnvironmentSettings {
        prefilter_mips: 1,
        ..s
    };
    assert!(approx(single.prefilter_roughness(0), 0.0));
}

// ============================================================================
// Exposure, tone mapping, motion blur
// ============================================================================

#[test]
fn ev100_of_default_exposure() {
    let exposure = CameraExposure::default();
    // log2(16² / 0.5 · 100 / 1000) = log2(51.2)
    assert!(approx(exposure.ev100(), 51.2f32.log2()));
    assert!(approx(exposure.exposure(), 1.0 / (1.2 * 51.2)));
}

#[test]
fn ev100_doubles_with_aperture_stops() {
    let base = CameraExposure::default();
    let stopped = CameraExposure {
        aperture: base.aperture * std::f32::consts::SQRT_2,
        ..base
    };
    assert!(approx(stopped.ev100() - base.ev100(), 1.0));
    assert!(stopped.exposure() < base.exposure());
}

#[test]
fn tone_mapping_selectors_are_distinct() {
    let modes = ToneMappingMode::all();
    assert_eq!(modes.len(), 3);
    let indices: Vec<u32> = modes.iter().map(|m| m.shader_index()).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    assert!(ToneMappingMode::Filmic.outputs_gamma_space());
    assert!(!ToneMappingMode::Reinhard.outputs_gamma_space());
}

#[test]
fn motion_blur_scale_uses_whole_frames() {
    assert!(approx(motion_blur_scale(60.0), 1.0));
    assert!(approx(motion_blur_scale(30.9), 0.5));
    assert!(approx(motion_blur_scale(144.7), 144.0 / 60.0));
    assert!(approx(motion_blur_scale(-5.0), 0.0));
}

#[test]
fn motion_blur_samples_are_capped() {
    assert_eq!(motion_blur_sample_count(0.2, 32), 1);
    assert_eq!(motion_blur_sample_count(12.8, 32), 12);
    assert_eq!(motion_blur_sample_count(500.0, 32), 32);
    assert_eq!(motion_blur_sample_count(500.0, 0), 1);
}

#[test]
fn post_uniforms_skip_tone_curve_for_debug_views() {
    let state = FrameState {
        gbuffer_view: GBufferView::Normal,
        tone_mapping: ToneMappingMode::Uncharted,
        ..Default::default()
    };
    let u = PostUniforms::new(&state, 800, 600, true);
    assert_eq!(u.gbuffer_view, 3);
    assert_eq!(u.tone_mapping, 3);
    assert!(approx(u.exposure, state.exposure.exposure()));
}

// ============================================================================
// SAO & settings
// ============================================================================

#[test]
fn sao_uniforms_clamp_samples_and_blur() {
    let settings = SaoSettings {
        samples: 1000,
        blur_size: 1000,
        ..Default::default()
    };
    let u = settings.uniforms(1280, 720, 45f32.to_radians());
    assert!(u.samples <= lumina::resources::sao::SAO_MAX_SAMPLES);
    assert_eq!(u.viewport_width, 1280);
    assert!(u.projection_scale > 0.0);

    let [h, v] = settings.blur_uniforms();
    assert_eq!(h.direction, [1, 0]);
    assert_eq!(v.direction, [0, 1]);
    assert!(h.blur_size <= lumina::resources::sao::SAO_MAX_BLUR_SIZE);
}

#[test]
fn renderer_settings_defaults() {
    let s = RendererSettings::default();
    assert_eq!((s.width, s.height), (1280, 720));
    assert!(s.enable_gpu_timing);
    assert!(approx(s.aspect_ratio(), 1280.0 / 720.0));
}

#[test]
fn frame_timings_total_sums_measured_passes() {
    let mut timings = FrameTimings::default();
    assert_eq!(timings.get(PassTiming::Geometry), None);
    assert_eq!(timings.total_ms(), None);

    timings.passes[PassTiming::Lighting.index()] = Some(2.5);
    assert!(approx(timings.total_ms().unwrap(), 2.5));

    for (i, pass) in PassTiming::all().iter().enumerate() {
        timings.passes[pass.index()] = Some(i as f32);
    }
    assert_eq!(timings.get(PassTiming::Ui), Some(5.0));
    assert!(approx(timings.total_ms().unwrap(), 15.0));
}
