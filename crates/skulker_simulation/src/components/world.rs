//! Room geometry: bounds + obstacle descriptors.
//!
//! RoomContext: read-only данные от scene geometry provider'а.
//! Шарится между skulker'ами через `Arc` (никто не мутирует после создания).

use bevy::prelude::*;
use std::sync::Arc;

use crate::collaborators::SceneGeometry;

/// Axis-aligned границы комнаты (world coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RoomBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl RoomBounds {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains_planar(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.z && point.z <= self.max.z
    }

    pub fn clamp_planar(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y,
            point.z.clamp(self.min.z, self.max.z),
        )
    }
}

/// Препятствие, за которым можно спрятаться
///
/// `extents`: полный размер box'а (не half-size).
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Obstacle {
    pub position: Vec3,
    pub extents: Vec3,
}

impl Obstacle {
    pub fn new(position: Vec3, extents: Vec3) -> Self {
        Self { position, extents }
    }

    /// Планарный "радиус" препятствия: max(half_x, half_z)
    pub fn half_extent(&self) -> f32 {
        self.extents.x.max(self.extents.z) * 0.5
    }

    pub fn half_size(&self) -> Vec3 {
        self.extents * 0.5
    }
}

/// Геометрия комнаты, в которой заспавнился skulker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomContext {
    pub bounds: Option<RoomBounds>,
    pub obstacles: Vec<Obstacle>,
}

impl RoomContext {
    pub fn new(bounds: Option<RoomBounds>, obstacles: Vec<Obstacle>) -> Self {
        Self { bounds, obstacles }
    }

    /// Снимок геометрии у provider'а (делается на каждый spawn)
    pub fn capture(scene: &dyn SceneGeometry) -> Arc<Self> {
        Arc::new(Self {
            bounds: scene.room_bounds(),
            obstacles: scene.obstacles(),
        })
    }
}
