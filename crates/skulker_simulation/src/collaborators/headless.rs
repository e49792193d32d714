//! Headless collaborators: плоская комната без физики и без navmesh.
//!
//! Используются headless бинарником и интеграционными тестами.
//! Navigable surface = прямоугольник пола минус footprint'ы препятствий,
//! движение по прямой (без pathfinding вокруг препятствий).

use bevy::prelude::*;
use std::collections::HashMap;

use super::{LineOfSightTracer, NavigationOracle, SceneGeometry, TraceHit};
use crate::components::{Obstacle, RoomBounds};
use crate::shared::{planar, planar_distance};

/// Ближе этого агент считается "на месте" (desired velocity = 0)
const HEADLESS_STOP_DISTANCE: f32 = 0.05;

/// Фиксированная геометрия комнаты
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    pub bounds: Option<RoomBounds>,
    pub obstacles: Vec<Obstacle>,
}

impl StaticScene {
    pub fn new(bounds: Option<RoomBounds>, obstacles: Vec<Obstacle>) -> Self {
        Self { bounds, obstacles }
    }
}

impl SceneGeometry for StaticScene {
    fn room_bounds(&self) -> Option<RoomBounds> {
        self.bounds
    }

    fn obstacles(&self) -> Vec<Obstacle> {
        self.obstacles.clone()
    }
}

/// Raycast против box'ов препятствий (slab test)
///
/// Skulker'ы не имеют collision volume здесь → луч до skulker'а
/// либо упирается в препятствие, либо ничего не встречает.
#[derive(Debug, Clone, Default)]
pub struct ObstacleTracer {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleTracer {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }
}

impl LineOfSightTracer for ObstacleTracer {
    fn trace(&self, from: Vec3, direction: Vec3, max_distance: f32) -> Option<TraceHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        self.obstacles
            .iter()
            .filter_map(|obstacle| ray_box_distance(from, dir, obstacle))
            .filter(|&t| t <= max_distance)
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| TraceHit {
                point: from + dir * t,
                entity: None,
            })
    }
}

/// Slab test: расстояние до входа луча в box (None = мимо)
fn ray_box_distance(origin: Vec3, dir: Vec3, obstacle: &Obstacle) -> Option<f32> {
    let min = obstacle.position - obstacle.half_size();
    let max = obstacle.position + obstacle.half_size();

    let mut t_enter = 0.0_f32;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < 1e-8 {
            // Луч параллелен slab'у: либо внутри, либо мимо
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

#[derive(Debug, Clone)]
struct HeadlessAgent {
    position: Vec3,
    target: Option<Vec3>,
    speed: f32,
    stopped: bool,
}

/// Navigation oracle для плоского пола
#[derive(Debug, Clone)]
pub struct HeadlessNavigation {
    pub floor: RoomBounds,
    pub blocked: Vec<Obstacle>,
    agents: HashMap<Entity, HeadlessAgent>,
}

impl HeadlessNavigation {
    pub fn new(floor: RoomBounds, blocked: Vec<Obstacle>) -> Self {
        Self {
            floor,
            blocked,
            agents: HashMap::new(),
        }
    }

    pub fn agent_target(&self, entity: Entity) -> Option<Vec3> {
        self.agents.get(&entity).and_then(|agent| agent.target)
    }

    pub fn is_stopped(&self, entity: Entity) -> Option<bool> {
        self.agents.get(&entity).map(|agent| agent.stopped)
    }

    pub fn agent_speed(&self, entity: Entity) -> Option<f32> {
        self.agents.get(&entity).map(|agent| agent.speed)
    }

    fn is_blocked(&self, point: Vec3) -> bool {
        self.blocked.iter().any(|obstacle| {
            let half = obstacle.half_size();
            let local = planar(point - obstacle.position);
            local.x.abs() < half.x && local.z.abs() < half.z
        })
    }
}

impl NavigationOracle for HeadlessNavigation {
    fn snap_to_surface(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        let mut snapped = self.floor.clamp_planar(point);
        snapped.y = self.floor.min.y;

        if planar_distance(snapped, point) > search_radius || self.is_blocked(snapped) {
            return None;
        }
        Some(snapped)
    }

    fn set_target(&mut self, entity: Entity, point: Vec3) {
        if let Some(agent) = self.agents.get_mut(&entity) {
            agent.target = Some(point);
        }
    }

    fn desired_velocity(&self, entity: Entity) -> Vec3 {
        let Some(agent) = self.agents.get(&entity) else {
            return Vec3::ZERO;
        };
        if agent.stopped {
            return Vec3::ZERO;
        }
        let Some(target) = agent.target else {
            return Vec3::ZERO;
        };

        let to_target = planar(target - agent.position);
        if to_target.length() <= HEADLESS_STOP_DISTANCE {
            return Vec3::ZERO;
        }
        to_target.normalize() * agent.speed
    }

    fn remaining_distance(&self, entity: Entity) -> f32 {
        self.agents
            .get(&entity)
            .and_then(|agent| agent.target.map(|target| planar_distance(agent.position, target)))
            .unwrap_or(0.0)
    }

    fn set_stopped(&mut self, entity: Entity, stopped: bool) {
        if let Some(agent) = self.agents.get_mut(&entity) {
            agent.stopped = stopped;
        }
    }

    fn set_speed(&mut self, entity: Entity, speed: f32) {
        if let Some(agent) = self.agents.get_mut(&entity) {
            agent.speed = speed;
        }
    }

    fn register_agent(&mut self, entity: Entity, position: Vec3) {
        self.agents.insert(
            entity,
            HeadlessAgent {
                position,
                target: None,
                speed: 0.0,
                stopped: false,
            },
        );
    }

    fn remove_agent(&mut self, entity: Entity) {
        self.agents.remove(&entity);
    }

    fn step(&mut self, delta: f32) {
        let entities: Vec<Entity> = self.agents.keys().copied().collect();
        for entity in entities {
            let velocity = self.desired_velocity(entity);
            let Some(agent) = self.agents.get_mut(&entity) else {
                continue;
            };
            let Some(target) = agent.target else {
                continue;
            };

            let step = velocity * delta;
            let remaining = planar_distance(agent.position, target);
            if step.length() >= remaining {
                agent.position = Vec3::new(target.x, agent.position.y, target.z);
            } else {
                agent.position += step;
            }
        }
    }

    fn body_position(&self, entity: Entity) -> Option<Vec3> {
        self.agents.get(&entity).map(|agent| agent.position)
    }
}
