//! External collaborator seams (navigation, scene geometry, LOS, observer).
//!
//! Архитектура: ECS = decision layer, всё остальное: за trait'ами.
//! Хост резолвит реализации ОДИН раз (при сборке App) и кладёт в resources;
//! ядро их не ищет и не кэширует глобально.

use bevy::prelude::*;

use crate::components::{Obstacle, RoomBounds};

pub mod headless;

pub use headless::{HeadlessNavigation, ObstacleTracer, StaticScene};

/// Поза наблюдателя (камера/игрок)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ObserverPose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl ObserverPose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }

    /// Наблюдатель в `position`, смотрит на `target`
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            forward: (target - position).normalize_or_zero(),
        }
    }
}

/// Resource: текущая поза наблюдателя (хост обновляет каждый frame)
///
/// `None` → наблюдателя нет, perception возвращает (∞, false).
#[derive(Resource, Debug, Clone, Default)]
pub struct ObserverState {
    pub pose: Option<ObserverPose>,
}

/// Результат raycast'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub point: Vec3,
    /// Entity, в collision volume которой попал луч (None = статичная геометрия)
    pub entity: Option<Entity>,
}

/// Line-of-sight raycast
pub trait LineOfSightTracer: Send + Sync {
    /// `direction` нормализован; хиты дальше `max_distance` не возвращаются
    fn trace(&self, from: Vec3, direction: Vec3, max_distance: f32) -> Option<TraceHit>;
}

/// Scene geometry provider (room discovery)
pub trait SceneGeometry: Send + Sync {
    fn room_bounds(&self) -> Option<RoomBounds>;
    fn obstacles(&self) -> Vec<Obstacle>;
}

/// Навигация для ОДНОГО агента (то, что видит state machine)
pub trait NavigationAgent {
    /// Ближайшая точка navigable surface в пределах `search_radius`
    fn snap_to_surface(&self, point: Vec3, search_radius: f32) -> Option<Vec3>;
    fn set_target(&mut self, point: Vec3);
    fn desired_velocity(&self) -> Vec3;
    fn remaining_distance(&self) -> f32;
    fn set_stopped(&mut self, stopped: bool);
    fn set_speed(&mut self, speed: f32);
}

/// Navigation oracle хоста (все агенты, ключ = Entity)
pub trait NavigationOracle: Send + Sync {
    fn snap_to_surface(&self, point: Vec3, search_radius: f32) -> Option<Vec3>;
    fn set_target(&mut self, entity: Entity, point: Vec3);
    fn desired_velocity(&self, entity: Entity) -> Vec3;
    fn remaining_distance(&self, entity: Entity) -> f32;
    fn set_stopped(&mut self, entity: Entity, stopped: bool);
    fn set_speed(&mut self, entity: Entity, speed: f32);

    /// Агент появился (spawn / возврат из pool)
    fn register_agent(&mut self, _entity: Entity, _position: Vec3) {}

    /// Агент исчез (despawn / возврат в pool)
    fn remove_agent(&mut self, _entity: Entity) {}

    /// Продвинуть тела агентов (для oracle'ов, которые двигают их сами)
    fn step(&mut self, _delta: f32) {}

    /// Позиция тела после `step` (None = позицией владеет кто-то другой)
    fn body_position(&self, _entity: Entity) -> Option<Vec3> {
        None
    }
}

/// Adapter: NavigationOracle + Entity → NavigationAgent
pub struct AgentHandle<'a> {
    oracle: &'a mut dyn NavigationOracle,
    entity: Entity,
}

impl<'a> AgentHandle<'a> {
    pub fn new(oracle: &'a mut dyn NavigationOracle, entity: Entity) -> Self {
        Self { oracle, entity }
    }
}

impl NavigationAgent for AgentHandle<'_> {
    fn snap_to_surface(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        self.oracle.snap_to_surface(point, search_radius)
    }

    fn set_target(&mut self, point: Vec3) {
        self.oracle.set_target(self.entity, point);
    }

    fn desired_velocity(&self) -> Vec3 {
        self.oracle.desired_velocity(self.entity)
    }

    fn remaining_distance(&self) -> f32 {
        self.oracle.remaining_distance(self.entity)
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.oracle.set_stopped(self.entity, stopped);
    }

    fn set_speed(&mut self, speed: f32) {
        self.oracle.set_speed(self.entity, speed);
    }
}

/// Resource: navigation oracle хоста
#[derive(Resource)]
pub struct NavigationBackend(pub Box<dyn NavigationOracle>);

/// Resource: scene geometry provider хоста
#[derive(Resource)]
pub struct SceneBackend(pub Box<dyn SceneGeometry>);

/// Resource: LOS tracer хоста
#[derive(Resource)]
pub struct TracerBackend(pub Box<dyn LineOfSightTracer>);
