//! Lights and the light registry
//!
//! Lights live in a [`LightRegistry`]: one arena per kind, each with a fixed
//! capacity matching the uniform arrays in the lighting shader. A light's
//! slot is assigned on insertion and is the index of its entry in the
//! shader array for as long as the light is alive. Freed slots go on a free
//! list and are handed out again only after the old [`LightId`] has been
//! invalidated by a generation bump.

use glam::Vec3;
use smallvec::SmallVec;

use crate::errors::{LuminaError, Result};

/// Capacity of the point light uniform array.
pub const MAX_POINT_LIGHTS: usize = 16;
/// Capacity of the directional light uniform array.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Distance past which the light contributes nothing.
    pub radius: f32,
    /// Draw a billboard at the light position in the forward overlay.
    pub gizmo: bool,
}

impl PointLight {
    #[must_use]
    pub fn new(position: Vec3, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity: 10.0,
            radius,
            gizmo: true,
        }
    }

    /// Color scaled by intensity, as uploaded to the GPU.
    #[inline]
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self {
            direction,
            color,
            intensity: 2.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
}

impl Light {
    #[must_use]
    pub fn kind(&self) -> LightKind {
        match self {
            Self::Point(_) => LightKind::Point,
            Self::Directional(_) => LightKind::Directional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Point,
    Directional,
}

impl LightKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Directional => "directional",
        }
    }

    #[must_use]
    pub fn capacity(self) -> usize {
        match self {
            Self::Point => MAX_POINT_LIGHTS,
            Self::Directional => MAX_DIRECTIONAL_LIGHTS,
        }
    }
}

/// Handle to a registered light.
///
/// `slot` is the light's index in its kind's uniform array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId {
    kind: LightKind,
    slot: u32,
    generation: u32,
}

impl LightId {
    #[inline]
    #[must_use]
    pub fn kind(self) -> LightKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn slot(self) -> usize {
        self.slot as usize
    }
}

// ============================================================================
// Slot arena
// ============================================================================

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// Fixed-capacity arena with stable indices.
#[derive(Debug, Clone)]
struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: SmallVec<[u32; 8]>,
    capacity: usize,
}

impl<T> SlotArena<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: SmallVec::new(),
            capacity,
        }
    }

    fn insert(&mut self, value: T) -> Option<(u32, u32)> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Some((index, slot.generation));
        }
        if self.slots.len() >= self.capacity {
            return None;
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: Some(value),
            generation: 0,
        });
        Some((index, 0))
    }

    fn get(&self, index: u32, generation: u32) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_ref())
    }

    fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(value)
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    /// Every slot in index order, `None` for vacant ones.
    fn slots(&self) -> impl Iterator<Item = Option<&T>> {
        self.slots.iter().map(|s| s.value.as_ref())
    }

    fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.value.as_ref().map(|v| (i as u32, s.generation, v)))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = (u32, u32, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.value.as_mut().map(|v| (i as u32, generation, v))
        })
    }
}

// ============================================================================
// LightRegistry
// ============================================================================

/// All lights of the scene, one arena per kind.
#[derive(Debug, Clone)]
pub struct LightRegistry {
    points: SlotArena<PointLight>,
    directionals: SlotArena<DirectionalLight>,
    /// Bumped on every structural or value change; the lighting pass
    /// re-uploads only when it moved.
    version: u64,
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LightRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: SlotArena::with_capacity(MAX_POINT_LIGHTS),
            directionals: SlotArena::with_capacity(MAX_DIRECTIONAL_LIGHTS),
            version: 0,
        }
    }

    /// Registers a light and assigns its slot.
    pub fn add(&mut self, light: Light) -> Result<LightId> {
        let kind = light.kind();
        let inserted = match light {
            Light::Point(p) => self.points.insert(p),
            Light::Directional(d) => self.directionals.insert(d),
        };
        let (slot, generation) = inserted.ok_or(LuminaError::LightCapacityExceeded {
            kind: kind.name(),
            capacity: kind.capacity(),
        })?;
        self.version += 1;
        Ok(LightId {
            kind,
            slot,
            generation,
        })
    }

    pub fn add_point(&mut self, light: PointLight) -> Result<LightId> {
        self.add(Light::Point(light))
    }

    pub fn add_directional(&mut self, light: DirectionalLight) -> Result<LightId> {
        self.add(Light::Directional(light))
    }

    /// Removes a light, freeing its slot. Returns `None` for stale ids.
    pub fn remove(&mut self, id: LightId) -> Option<Light> {
        let removed = match id.kind {
            LightKind::Point => self
                .points
                .remove(id.slot, id.generation)
                .map(Light::Point),
            LightKind::Directional => self
                .directionals
                .remove(id.slot, id.generation)
                .map(Light::Directional),
        };
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: LightId) -> Option<Light> {
        match id.kind {
            LightKind::Point => self
                .points
                .get(id.slot, id.generation)
                .copied()
                .map(Light::Point),
            LightKind::Directional => self
                .directionals
                .get(id.slot, id.generation)
                .copied()
                .map(Light::Directional),
        }
    }

    #[must_use]
    pub fn point(&self, id: LightId) -> Option<&PointLight> {
        (id.kind == LightKind::Point)
            .then(|| self.points.get(id.slot, id.generation))
            .flatten()
    }

    pub fn point_mut(&mut self, id: LightId) -> Option<&mut PointLight> {
        if id.kind != LightKind::Point {
            return None;
        }
        let light = self.points.get_mut(id.slot, id.generation)?;
        self.version += 1;
        Some(light)
    }

    #[must_use]
    pub fn directional(&self, id: LightId) -> Option<&DirectionalLight> {
        (id.kind == LightKind::Directional)
            .then(|| self.directionals.get(id.slot, id.generation))
            .flatten()
    }

    pub fn directional_mut(&mut self, id: LightId) -> Option<&mut DirectionalLight> {
        if id.kind != LightKind::Directional {
            return None;
        }
        let light = self.directionals.get_mut(id.slot, id.generation)?;
        self.version += 1;
        Some(light)
    }

    /// Overwrites the light behind `id`. Returns `false` for stale ids or a
    /// kind mismatch, leaving the registry untouched.
    pub fn update(&mut self, id: LightId, light: Light) -> bool {
        let written = match (light, id.kind) {
            (Light::Point(p), LightKind::Point) => self
                .points
                .get_mut(id.slot, id.generation)
                .map(|slot| *slot = p),
            (Light::Directional(d), LightKind::Directional) => self
                .directionals
                .get_mut(id.slot, id.generation)
                .map(|slot| *slot = d),
            _ => None,
        };
        if written.is_some() {
            self.version += 1;
        }
        written.is_some()
    }

    /// Ids of every live light, points first, each kind in slot order.
    pub fn ids(&self) -> impl Iterator<Item = LightId> + '_ {
        let points = self.points.iter().map(|(slot, generation, _)| LightId {
            kind: LightKind::Point,
            slot,
            generation,
        });
        let directionals = self.directionals.iter().map(|(slot, generation, _)| LightId {
            kind: LightKind::Directional,
            slot,
            generation,
        });
        points.chain(directionals)
    }

    /// Point lights by slot, `None` marking vacant slots.
    pub fn point_slots(&self) -> impl Iterator<Item = Option<&PointLight>> {
        self.points.slots()
    }

    pub fn directional_slots(&self) -> impl Iterator<Item = Option<&DirectionalLight>> {
        self.directionals.slots()
    }

    /// Live point lights with their ids, in slot order.
    pub fn points_mut(&mut self) -> impl Iterator<Item = (LightId, &mut PointLight)> {
        self.version += 1;
        self.points.iter_mut().map(|(slot, generation, light)| {
            (
                LightId {
                    kind: LightKind::Point,
                    slot,
                    generation,
                },
                light,
            )
        })
    }

    pub fn directionals_mut(&mut self) -> impl Iterator<Item = (LightId, &mut DirectionalLight)> {
        self.version += 1;
        self.directionals
            .iter_mut()
            .map(|(slot, generation, light)| {
                (
                    LightId {
                        kind: LightKind::Directional,
                        slot,
                        generation,
                    },
                    light,
                )
            })
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn directional_count(&self) -> usize {
        self.directionals.len()
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// The reference scene lighting: three colored point lights around the model
/// and one white key light from above.
pub fn default_lights(registry: &mut LightRegistry) -> Result<()> {
    let points = [
        (Vec3::new(1.5, 0.75, 1.0), Vec3::new(0.0, 0.0, 1.0)),
        (Vec3::new(-1.5, 1.0, 1.0), Vec3::new(1.0, 0.4, 0.7)),
        (Vec3::new(0.0, 0.75, -1.2), Vec3::new(1.0, 0.5, 0.0)),
    ];
    for (position, color) in points {
        registry.add_point(PointLight::new(position, color, 3.0))?;
    }
    registry.add_directional(DirectionalLight::new(
        Vec3::new(-0.2, -1.0, -0.3),
        Vec3::ONE,
    ))?;
    Ok(())
}
