//! Viewer control panels.
//!
//! Every widget edits a [`FrameState`] field or a scene light in place.
//! Lights are edited on a copy and written back only when a widget changed,
//! so an idle panel never invalidates the light upload.

use glam::Vec3;

use crate::renderer::core::profiler::{FrameTimings, PassTiming};
use crate::resources::presets::{EnvironmentPreset, MaterialPreset, ModelPreset};
use crate::resources::sao::{SAO_MAX_BLUR_SIZE, SAO_MAX_SAMPLES};
use crate::resources::tone_mapping::ToneMappingMode;
use crate::scene::frame_state::{AttenuationModel, FrameState, GBufferView};
use crate::scene::light::{Light, LightRegistry};
use crate::scene::scene::Scene;

/// Read-only numbers shown in the profiler panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_time_ms: f32,
    pub timings: FrameTimings,
    pub timings_enabled: bool,
}

pub fn draw(ctx: &egui::Context, scene: &mut Scene, state: &mut FrameState, stats: &FrameStats) {
    egui::Window::new("Lumina")
        .default_width(300.0)
        .resizable(true)
        .show(ctx, |ui| {
            profiler_panel(ui, stats);
            ui.separator();

            egui::CollapsingHeader::new("Scene")
                .default_open(true)
                .show(ui, |ui| presets_panel(ui, state));
            egui::CollapsingHeader::new("Rendering")
                .default_open(true)
                .show(ui, |ui| rendering_panel(ui, state));
            egui::CollapsingHeader::new("Ambient Occlusion")
                .show(ui, |ui| sao_panel(ui, state));
            egui::CollapsingHeader::new("Camera Exposure")
                .show(ui, |ui| exposure_panel(ui, state));
            egui::CollapsingHeader::new("Material")
                .show(ui, |ui| material_panel(ui, state));
            egui::CollapsingHeader::new("Model")
                .show(ui, |ui| model_panel(ui, state));
            egui::CollapsingHeader::new("Lights")
                .show(ui, |ui| lights_panel(ui, &mut scene.lights));
        });
}

fn profiler_panel(ui: &mut egui::Ui, stats: &FrameStats) {
    ui.label(format!(
        "{:.1} FPS ({:.2} ms)",
        stats.fps, stats.frame_time_ms
    ));
    if !stats.timings_enabled {
        ui.label("GPU timings unavailable");
        return;
    }
    egui::Grid::new("gpu_timings").striped(true).show(ui, |ui| {
        for pass in PassTiming::all() {
            ui.label(pass.name());
            match stats.timings.get(*pass) {
                Some(ms) => ui.label(format!("{ms:.3} ms")),
                None => ui.label("-"),
            };
            ui.end_row();
        }
        if let Some(total) = stats.timings.total_ms() {
            ui.strong("Total");
            ui.strong(format!("{total:.3} ms"));
            ui.end_row();
        }
    });
}

fn presets_panel(ui: &mut egui::Ui, state: &mut FrameState) {
    egui::ComboBox::from_label("Model")
        .selected_text(state.model_preset.name())
        .show_ui(ui, |ui| {
            for preset in ModelPreset::all() {
                ui.selectable_value(&mut state.model_preset, *preset, preset.name());
            }
        });

    let mut material = state.material_preset;
    egui::ComboBox::from_label("Material")
        .selected_text(material.name())
        .show_ui(ui, |ui| {
            for preset in MaterialPreset::all() {
                ui.selectable_value(&mut material, *preset, preset.name());
            }
        });
    state.select_material(material);

    egui::ComboBox::from_label("Environment")
        .selected_text(state.environment_preset.name())
        .show_ui(ui, |ui| {
            for preset in EnvironmentPreset::all() {
                ui.selectable_value(&mut state.environment_preset, *preset, preset.name());
            }
        });
}

fn rendering_panel(ui: &mut egui::Ui, state: &mut FrameState) {
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.point_lights, "Point lights");
        ui.checkbox(&mut state.directional_lights, "Directional");
    });
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.ibl, "IBL");
        ui.checkbox(&mut state.sao.enabled, "SAO");
        ui.checkbox(&mut state.fxaa, "FXAA");
    });
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.motion_blur.enabled, "Motion blur");
        ui.add_enabled(
            state.motion_blur.enabled,
            egui::Slider::new(&mut state.motion_blur.max_samples, 1..=64).text("max samples"),
        );
    });

    egui::ComboBox::from_label("Tone mapping")
        .selected_text(state.tone_mapping.name())
        .show_ui(ui, |ui| {
            for mode in ToneMappingMode::all() {
                ui.selectable_value(&mut state.tone_mapping, *mode, mode.name());
            }
        });
    egui::ComboBox::from_label("Attenuation")
        .selected_text(state.attenuation.name())
        .show_ui(ui, |ui| {
            for model in AttenuationModel::all() {
                ui.selectable_value(&mut state.attenuation, *model, model.name());
            }
        });
    egui::ComboBox::from_label("G-buffer view")
        .selected_text(state.gbuffer_view.name())
        .show_ui(ui, |ui| {
            for (i, view) in GBufferView::all().iter().enumerate() {
                let label = format!("F{} {}", i + 1, view.name());
                ui.selectable_value(&mut state.gbuffer_view, *view, label);
            }
        });
}

fn sao_panel(ui: &mut egui::Ui, state: &mut FrameState) {
    let sao = &mut state.sao;
    ui.add(egui::Slider::new(&mut sao.samples, 0..=SAO_MAX_SAMPLES).text("Samples"));
    ui.add(egui::Slider::new(&mut sao.turns, 1..=16).text("Turns"));
    ui.add(egui::Slider::new(&mut sao.radius, 0.01..=2.0).text("Radius"));
    ui.add(
        egui::Slider::new(&mut sao.bias, 0.0..=0.1)
            .logarithmic(true)
            .text("Bias"),
    );
    ui.add(egui::Slider::new(&mut sao.scale, 0.0..=3.0).text("Scale"));
    ui.add(egui::Slider::new(&mut sao.contrast, 0.0..=3.0).text("Contrast"));
    ui.add(egui::Slider::new(&mut sao.blur_size, 0..=SAO_MAX_BLUR_SIZE).text("Blur size"));
}

fn exposure_panel(ui: &mut egui::Ui, state: &mut FrameState) {
    let exposure = &mut state.exposure;
    ui.add(egui::Slider::new(&mut exposure.aperture, 1.0..=32.0).text("Aperture (f)"));
    ui.add(
        egui::Slider::new(&mut exposure.shutter_speed, 1.0 / 4000.0..=4.0)
            .logarithmic(true)
            .text("Shutter (s)"),
    );
    ui.add(
        egui::Slider::new(&mut exposure.iso, 50.0..=6400.0)
            .logarithmic(true)
            .text("ISO"),
    );
    ui.label(format!("EV100 {:.2}", exposure.ev100()));
}

fn material_panel(ui: &mut egui::Ui, state: &mut FrameState) {
    let material = &mut state.material;
    ui.add(egui::Slider::new(&mut material.roughness, 0.0..=1.0).text("Roughness"));
    ui.add(egui::Slider::new(&mut material.metallic, 0.0..=1.0).text("Metallic"));
    color_row(ui, "F0", &mut material.f0);
    color_row(ui, "Albedo", &mut material.albedo);
    ui.add(
        egui::Slider::new(&mut material.ambient_intensity, 0.0..=1.0)
            .logarithmic(true)
            .text("Ambient"),
    );
}

fn model_panel(ui: &mut egui::Ui, state: &mut FrameState) {
    let model = &mut state.model;
    vec3_row(ui, "Position", &mut model.position, 0.05);
    if vec3_row(ui, "Rotation axis", &mut model.rotation_axis, 0.05) {
        model.rotation_axis = model.rotation_axis.try_normalize().unwrap_or(Vec3::Y);
    }
    ui.add(egui::Slider::new(&mut model.rotation_speed, 0.0..=5.0).text("Rotation speed"));
}

fn lights_panel(ui: &mut egui::Ui, lights: &mut LightRegistry) {
    let ids: Vec<_> = lights.ids().collect();
    for id in ids {
        let Some(mut light) = lights.get(id) else {
            continue;
        };
        let title = format!("{} light {}", id.kind().name(), id.slot());
        let mut changed = false;
        ui.push_id(id, |ui| {
            ui.label(title);
            match &mut light {
                Light::Point(point) => {
                    changed |= vec3_row(ui, "Position", &mut point.position, 0.05);
                    changed |= color_row(ui, "Color", &mut point.color);
                    changed |= ui
                        .add(egui::Slider::new(&mut point.intensity, 0.0..=50.0).text("Intensity"))
                        .changed();
                    changed |= ui
                        .add(egui::Slider::new(&mut point.radius, 0.1..=20.0).text("Radius"))
                        .changed();
                    changed |= ui.checkbox(&mut point.gizmo, "Gizmo").changed();
                }
                Light::Directional(directional) => {
                    changed |= vec3_row(ui, "Direction", &mut directional.direction, 0.05);
                    changed |= color_row(ui, "Color", &mut directional.color);
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut directional.intensity, 0.0..=10.0)
                                .text("Intensity"),
                        )
                        .changed();
                }
            }
            ui.separator();
        });
        if changed {
            lights.update(id, light);
        }
    }
}

fn vec3_row(ui: &mut egui::Ui, label: &str, value: &mut Vec3, speed: f64) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut changed = false;
        changed |= ui.add(egui::DragValue::new(&mut value.x).speed(speed)).changed();
        changed |= ui.add(egui::DragValue::new(&mut value.y).speed(speed)).changed();
        changed |= ui.add(egui::DragValue::new(&mut value.z).speed(speed)).changed();
        changed
    })
    .inner
}

fn color_row(ui: &mut egui::Ui, label: &str, value: &mut Vec3) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut rgb = value.to_array();
        let changed = ui.color_edit_button_rgb(&mut rgb).changed();
        if changed {
            *value = Vec3::from_array(rgb);
        }
        changed
    })
    .inner
}
