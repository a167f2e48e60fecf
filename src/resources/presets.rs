//! Built-in scene presets selectable from the UI.
//!
//! Each preset resolves to concrete assets under an asset root directory:
//!
//! ```text
//! <root>/textures/pbr/<material>/<material>_{albedo,normal,roughness,metalness,ao}.png
//! <root>/textures/hdr/<environment>.hdr
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;

use super::mesh::MeshData;
use super::primitives::{
    SphereOptions, TorusOptions, create_box, create_pyramid, create_sphere, create_torus,
};

// ============================================================================
// Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelPreset {
    #[default]
    Sphere,
    Cube,
    Torus,
    Pyramid,
}

impl ModelPreset {
    #[must_use]
    pub fn all() -> &'static [ModelPreset] {
        &[Self::Sphere, Self::Cube, Self::Torus, Self::Pyramid]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sphere => "Sphere",
            Self::Cube => "Cube",
            Self::Torus => "Torus",
            Self::Pyramid => "Pyramid",
        }
    }

    /// Uniform scale the model is displayed at.
    #[must_use]
    pub fn scale(self) -> f32 {
        match self {
            Self::Sphere | Self::Cube => 0.6,
            Self::Torus => 0.35,
            Self::Pyramid => 0.55,
        }
    }

    #[must_use]
    pub fn build_mesh(self) -> MeshData {
        match self {
            Self::Sphere => create_sphere(&SphereOptions {
                radius: 1.8,
                ..Default::default()
            }),
            Self::Cube => create_box(2.4, 2.4, 2.4),
            Self::Torus => create_torus(&TorusOptions {
                radius: 2.4,
                tube: 1.0,
                ..Default::default()
            }),
            Self::Pyramid => create_pyramid(3.0, 3.0),
        }
    }
}

// ============================================================================
// Materials
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialPreset {
    #[default]
    Quartz,
    Shiny,
    Granite,
}

/// One file per material channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialTexturePaths {
    pub albedo: PathBuf,
    pub normal: PathBuf,
    pub roughness: PathBuf,
    pub metalness: PathBuf,
    pub ao: PathBuf,
}

impl MaterialPreset {
    #[must_use]
    pub fn all() -> &'static [MaterialPreset] {
        &[Self::Quartz, Self::Shiny, Self::Granite]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Quartz => "Quartz",
            Self::Shiny => "Shiny",
            Self::Granite => "Granite",
        }
    }

    fn dir_name(self) -> &'static str {
        match self {
            Self::Quartz => "quartz",
            Self::Shiny => "shiny",
            Self::Granite => "granite",
        }
    }

    /// Fresnel reflectance at normal incidence the preset is meant to be seen with.
    #[must_use]
    pub fn f0(self) -> Vec3 {
        match self {
            Self::Shiny => Vec3::new(1.0, 0.72, 0.29),
            Self::Quartz | Self::Granite => Vec3::splat(0.04),
        }
    }

    #[must_use]
    pub fn texture_paths(self, asset_root: &Path) -> MaterialTexturePaths {
        let name = self.dir_name();
        let dir = asset_root.join("textures").join("pbr").join(name);
        let channel = |suffix: &str| dir.join(format!("{name}_{suffix}.png"));
        MaterialTexturePaths {
            albedo: channel("albedo"),
            normal: channel("normal"),
            roughness: channel("roughness"),
            metalness: channel("metalness"),
            ao: channel("ao"),
        }
    }
}

// ============================================================================
// Environments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnvironmentPreset {
    #[default]
    Studio,
    BlueSky,
    WarmHome,
    Ensuite,
}

impl EnvironmentPreset {
    #[must_use]
    pub fn all() -> &'static [EnvironmentPreset] {
        &[Self::Studio, Self::BlueSky, Self::WarmHome, Self::Ensuite]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Studio => "Studio",
            Self::BlueSky => "Blue Sky",
            Self::WarmHome => "Warm Home",
            Self::Ensuite => "Ensuite",
        }
    }

    #[must_use]
    pub fn path(self, asset_root: &Path) -> PathBuf {
        let file = match self {
            Self::Studio => "studio1.hdr",
            Self::BlueSky => "bluesky.hdr",
            Self::WarmHome => "warmhome.hdr",
            Self::Ensuite => "ensuite.hdr",
        };
        asset_root.join("textures").join("hdr").join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_paths_follow_naming_scheme() {
        let paths = MaterialPreset::Granite.texture_paths(Path::new("assets"));
        assert_eq!(
            paths.roughness,
            Path::new("assets/textures/pbr/granite/granite_roughness.png")
        );
    }

    #[test]
    fn every_model_builds_a_triangle_list() {
        for preset in ModelPreset::all() {
            let mesh = preset.build_mesh();
            assert!(mesh.triangle_count() > 0, "{}", preset.name());
            assert_eq!(mesh.indices.len() % 3, 0);
            let max = mesh.indices.iter().copied().max().unwrap_or(0) as usize;
            assert!(max < mesh.vertices.len());
        }
    }
}
