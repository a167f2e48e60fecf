//! GPU integration tests
//!
//! Tests for:
//! - Environment precompute determinism and swap generations
//! - Per-face mip chains of the environment cube
//! - Failed preset swaps inside a frame
//! - Depth blit from the G-buffer into the display depth target
//! - SAO neutral output with zero samples and when disabled
//! - SAO only ever darkening the lit image
//!
//! Every test needs an adapter. Machines without one print a notice and
//! pass trivially.

use half::f16;
use lumina::renderer::core::readback::read_texture;
use lumina::renderer::core::{GpuContext, RenderTargetManager};
use lumina::renderer::graph::passes::EnvironmentStage;
use lumina::renderer::{EnvironmentSettings, Renderer, RendererSettings};
use lumina::resources::{EnvironmentPreset, HdrImage};
use lumina::scene::{FrameState, GBufferView, Scene};

// ============================================================================
// Helpers
// ============================================================================

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

/// +Y in cube face order.
const FACE_POS_Y: u32 = 2;

fn small_environment() -> EnvironmentSettings {
    EnvironmentSettings {
        cube_size: 32,
        irradiance_size: 8,
        prefilter_size: 16,
        prefilter_mips: 3,
        brdf_lut_size: 32,
        sample_count: 64,
    }
}

fn settings() -> RendererSettings {
    RendererSettings {
        width: WIDTH,
        height: HEIGHT,
        enable_gpu_timing: false,
        environment: small_environment(),
        ..Default::default()
    }
}

fn gpu() -> Option<GpuContext> {
    match GpuContext::headless(&settings()) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

/// Renderer over a missing asset root, so every asset takes its fallback.
fn renderer(gpu: GpuContext, scene: &Scene, state: &FrameState) -> Renderer {
    Renderer::new(
        gpu,
        settings(),
        wgpu::TextureFormat::Rgba8UnormSrgb,
        "missing-assets",
        scene,
        state,
    )
    .expect("renderer")
}

fn scene(state: &FrameState) -> Scene {
    let mut scene = Scene::with_default_lights(WIDTH as f32 / HEIGHT as f32).expect("scene");
    scene.update(state);
    scene
}

fn render_once(renderer: &mut Renderer, scene: &Scene, state: &FrameState) {
    let output = renderer.create_output_texture();
    let view = output.create_view(&wgpu::TextureViewDescriptor::default());
    renderer
        .render_frame(&view, scene, state, None)
        .expect("frame");
}

fn read_color(renderer: &Renderer, texture: &wgpu::Texture, layer: u32) -> Vec<u8> {
    read_texture(
        renderer.device(),
        renderer.queue(),
        texture,
        0,
        layer,
        wgpu::TextureAspect::All,
    )
    .expect("readback")
}

fn rgba16f(bytes: &[u8]) -> Vec<f32> {
    let texels: Vec<f16> = bytemuck::pod_collect_to_vec(bytes);
    texels.iter().map(|t| t.to_f32()).collect()
}

fn mean_rgb(rgba16f: &[u8]) -> f32 {
    let texels: Vec<f16> = bytemuck::pod_collect_to_vec(rgba16f);
    let (sum, count) = texels
        .chunks_exact(4)
        .fold((0.0, 0usize), |(sum, count), t| {
            (sum + t[0].to_f32() + t[1].to_f32() + t[2].to_f32(), count + 3)
        });
    sum / count as f32
}

// ============================================================================
// Environment precompute
// ============================================================================

#[test]
fn precompute_is_deterministic_for_the_same_image() {
    let Some(gpu) = gpu() else { return };
    let device = &gpu.device;
    let queue = &gpu.queue;

    let image = HdrImage::from_fn(64, 32, |u, v| [u * 4.0, v, 1.0 - u]);
    let mut targets = RenderTargetManager::new(device);
    let mut stage = EnvironmentStage::new(device, small_environment());

    let first = stage
        .precompute(device, queue, &mut targets, &image)
        .expect("first precompute");
    let second = stage
        .precompute(device, queue, &mut targets, &image)
        .expect("second precompute");

    assert_ne!(first.generation(), second.generation());
    for face in 0..6 {
        let read = |set: &lumina::renderer::graph::passes::EnvironmentMapSet, mip| {
            (
                read_texture(device, queue, &set.irradiance.texture, 0, face, wgpu::TextureAspect::All)
                    .expect("irradiance"),
                read_texture(device, queue, &set.prefilter.texture, mip, face, wgpu::TextureAspect::All)
                    .expect("prefilter"),
            )
        };
        for mip in 0..first.prefilter.mip_levels() {
            assert_eq!(read(&first, mip), read(&second, mip), "face {face} mip {mip}");
        }
    }
}

#[test]
fn empty_image_is_rejected() {
    let Some(gpu) = gpu() else { return };
    let mut targets = RenderTargetManager::new(&gpu.device);
    let mut stage = EnvironmentStage::new(&gpu.device, small_environment());

    let empty = HdrImage {
        width: 0,
        height: 0,
        pixels: Vec::new(),
    };
    assert!(
        stage
            .precompute(&gpu.device, &gpu.queue, &mut targets, &empty)
            .is_err()
    );
}

#[test]
fn swapping_environment_bumps_generation_and_changes_irradiance() {
    let Some(gpu) = gpu() else { return };
    let state = FrameState::default();
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    let dark = renderer
        .reset_environment(&HdrImage::solid([0.05, 0.05, 0.05]))
        .expect("dark swap");
    let dark_up = mean_rgb(&read_color(
        &renderer,
        &renderer.environment().irradiance.texture,
        FACE_POS_Y,
    ));

    // Bright sky over a dark ground.
    let sky = HdrImage::from_fn(64, 32, |_, v| if v < 0.5 { [8.0; 3] } else { [0.05; 3] });
    let bright = renderer.reset_environment(&sky).expect("sky swap");
    let bright_up = mean_rgb(&read_color(
        &renderer,
        &renderer.environment().irradiance.texture,
        FACE_POS_Y,
    ));

    assert_eq!(bright, dark + 1);
    assert_eq!(renderer.environment_generation(), bright);
    assert!(
        bright_up > dark_up * 10.0,
        "irradiance up {bright_up} vs {dark_up}"
    );
}

#[test]
fn failed_swap_keeps_previous_generation() {
    let Some(gpu) = gpu() else { return };
    let state = FrameState::default();
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    let before = renderer.environment_generation();
    let empty = HdrImage {
        width: 0,
        height: 0,
        pixels: Vec::new(),
    };
    assert!(renderer.reset_environment(&empty).is_err());
    assert_eq!(renderer.environment_generation(), before);
}

#[test]
fn every_cube_face_gets_a_full_mip_chain() {
    let Some(gpu) = gpu() else { return };
    let state = FrameState::default();
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    let color = [0.5, 0.25, 0.125];
    renderer
        .reset_environment(&HdrImage::solid(color))
        .expect("solid swap");

    let cube = &renderer.environment().cube;
    assert_eq!(cube.mip_levels(), small_environment().cube_mip_count());
    assert_eq!(cube.mip_size(cube.mip_levels() - 1), 1);

    // A uniform source stays uniform at every level, so an unfilled level
    // shows up as the transparent clear.
    for face in 0..6 {
        for mip in 0..cube.mip_levels() {
            let bytes = read_texture(
                renderer.device(),
                renderer.queue(),
                &cube.texture,
                mip,
                face,
                wgpu::TextureAspect::All,
            )
            .expect("cube readback");
            let texels = rgba16f(&bytes);
            let side = cube.mip_size(mip) as usize;
            assert_eq!(texels.len(), side * side * 4, "face {face} mip {mip}");
            for texel in texels.chunks_exact(4) {
                for (got, want) in texel.iter().zip(color) {
                    assert!(
                        (got - want).abs() < 0.01,
                        "face {face} mip {mip}: {got} vs {want}"
                    );
                }
            }
        }
    }
}

#[test]
fn failed_preset_swap_in_a_frame_keeps_generation() {
    let Some(gpu) = gpu() else { return };
    let mut state = FrameState::default();
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);
    let before = renderer.environment_generation();

    // The asset root is missing, so the preset file cannot load.
    state.environment_preset = EnvironmentPreset::BlueSky;
    render_once(&mut renderer, &scene, &state);

    assert_eq!(renderer.environment_preset(), EnvironmentPreset::BlueSky);
    assert_eq!(renderer.environment_generation(), before);

    // Selected once, so the next frame does not retry.
    render_once(&mut renderer, &scene, &state);
    assert_eq!(renderer.environment_generation(), before);
}

// ============================================================================
// Frame targets
// ============================================================================

#[test]
fn display_depth_matches_gbuffer_depth() {
    let Some(gpu) = gpu() else { return };
    let state = FrameState::default();
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    render_once(&mut renderer, &scene, &state);
    assert!(renderer.graph().forward.gizmo_count() > 0);

    let targets = renderer.targets();
    let read_depth = |texture: &wgpu::Texture| {
        let bytes = read_texture(
            renderer.device(),
            renderer.queue(),
            texture,
            0,
            0,
            wgpu::TextureAspect::DepthOnly,
        )
        .expect("depth readback");
        bytemuck::pod_collect_to_vec::<u8, f32>(&bytes)
    };
    let gbuffer = read_depth(&targets.gbuffer.depth().expect("gbuffer depth").texture);
    let display = read_depth(&targets.display_depth.depth().expect("display depth").texture);
    assert_eq!(gbuffer.len(), (WIDTH * HEIGHT) as usize);
    assert_eq!(display.len(), gbuffer.len());

    // Gizmos draw after the blit with a Less test, so they can only pull
    // display depth closer. Everything outside their footprint is the copy.
    let mut covered = 0;
    for (i, (&g, &d)) in gbuffer.iter().zip(&display).enumerate() {
        if d != g {
            assert!(d < g, "texel {i}: display {d} behind gbuffer {g}");
            covered += 1;
        }
    }
    assert!(
        covered * 4 < gbuffer.len(),
        "{covered} texels differ, more than gizmos can cover"
    );
}

#[test]
fn sao_with_zero_samples_is_unoccluded() {
    let Some(gpu) = gpu() else { return };
    let mut state = FrameState::default();
    state.sao.samples = 0;
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    render_once(&mut renderer, &scene, &state);

    let raw = read_color(&renderer, &renderer.targets().sao_raw.color(0).texture, 0);
    assert_eq!(raw.len(), (WIDTH * HEIGHT) as usize);
    assert!(raw.iter().all(|&ao| ao == raw[0]), "raw AO not uniform");
}

#[test]
fn disabled_sao_leaves_blur_target_at_one() {
    let Some(gpu) = gpu() else { return };
    let mut state = FrameState::default();
    state.sao.enabled = false;
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    render_once(&mut renderer, &scene, &state);

    let blurred = read_color(&renderer, &renderer.targets().sao_blur.color(0).texture, 0);
    assert!(blurred.iter().all(|&ao| ao == u8::MAX));
}

#[test]
fn sao_never_brightens_ambient_lighting() {
    let Some(gpu) = gpu() else { return };
    let mut state = FrameState::default();
    state.ibl = true;
    state.point_lights = false;
    state.directional_lights = false;
    state.gbuffer_view = GBufferView::Final;
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    let mut lit = |sao: bool| {
        state.sao.enabled = sao;
        render_once(&mut renderer, &scene, &state);
        rgba16f(&read_color(
            &renderer,
            &renderer.targets().lighting.color(0).texture,
            0,
        ))
    };
    let occluded = lit(true);
    let open = lit(false);

    assert_eq!(occluded.len(), (WIDTH * HEIGHT * 4) as usize);
    for (i, (on, off)) in occluded.iter().zip(&open).enumerate() {
        assert!(
            *on <= off + 1e-3,
            "channel {i}: {on} with SAO above {off} without"
        );
    }
}

#[test]
fn frames_render_with_every_debug_view() {
    let Some(gpu) = gpu() else { return };
    let mut state = FrameState::default();
    let scene = scene(&state);
    let mut renderer = renderer(gpu, &scene, &state);

    for view in GBufferView::all() {
        state.gbuffer_view = *view;
        render_once(&mut renderer, &scene, &state);
    }
    assert!(!renderer.timings_enabled());
    assert_eq!(renderer.last_timings().total_ms(), None);
}
