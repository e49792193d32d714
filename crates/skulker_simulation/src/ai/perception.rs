//! Perception sampler: throttled distance + "am I being watched" check.
//!
//! Sample дорогой (raycast), поэтому пересчитываем не чаще `sample_interval`,
//! между семплами отдаём кэш. Так стоимость тика ограничена при многих skulker'ах.

use bevy::prelude::*;

use crate::collaborators::{LineOfSightTracer, ObserverPose};
use crate::shared::TIMER_EPSILON;

/// Результат perception sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub distance: f32,
    pub is_observed: bool,
}

impl Observation {
    /// Наблюдателя нет → бесконечно далеко и не видит
    pub const UNOBSERVED: Self = Self {
        distance: f32::INFINITY,
        is_observed: false,
    };
}

/// Кэш perception (мутирует только sampler)
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct PerceptionCache {
    /// None → следующий `sample` пересчитает сразу
    pub last_sample_time: Option<f64>,
    pub cached_distance: f32,
    pub cached_is_observed: bool,
}

impl Default for PerceptionCache {
    fn default() -> Self {
        Self {
            last_sample_time: None,
            cached_distance: f32::INFINITY,
            cached_is_observed: false,
        }
    }
}

/// Параметры одного sample (время + геометрия наблюдения)
pub struct SampleInput<'a> {
    pub entity: Entity,
    pub entity_position: Vec3,
    pub observer: Option<&'a ObserverPose>,
    pub tracer: &'a dyn LineOfSightTracer,
    pub half_fov_radians: f32,
    pub sample_interval: f32,
    pub now: f64,
}

impl PerceptionCache {
    pub fn observation(&self) -> Observation {
        Observation {
            distance: self.cached_distance,
            is_observed: self.cached_is_observed,
        }
    }

    /// Сбросить кэш (spawn / смерть)
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    pub fn sample(&mut self, input: SampleInput<'_>) -> Observation {
        let Some(observer) = input.observer else {
            // Наблюдатель пропал: кэш инвалидируем, чтобы при возвращении
            // пересчитать на первом же тике
            self.invalidate();
            return Observation::UNOBSERVED;
        };

        if let Some(last) = self.last_sample_time {
            if input.now - last + f64::from(TIMER_EPSILON) < f64::from(input.sample_interval) {
                return self.observation();
            }
        }

        let to_entity = input.entity_position - observer.position;
        let distance = to_entity.length();
        let is_observed = in_view_cone(observer, to_entity, input.half_fov_radians)
            && has_line_of_sight(input.tracer, observer.position, to_entity, distance, input.entity);

        self.last_sample_time = Some(input.now);
        self.cached_distance = distance;
        self.cached_is_observed = is_observed;

        self.observation()
    }
}

/// Угол между forward наблюдателя и направлением на entity ≤ half fov
fn in_view_cone(observer: &ObserverPose, to_entity: Vec3, half_fov_radians: f32) -> bool {
    if to_entity.length_squared() < 1e-8 {
        // Entity стоит прямо в наблюдателе
        return true;
    }
    let forward = observer.forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return false;
    }
    forward.angle_between(to_entity) <= half_fov_radians
}

/// Луч от наблюдателя до entity свободен или упёрся в саму entity
fn has_line_of_sight(
    tracer: &dyn LineOfSightTracer,
    from: Vec3,
    to_entity: Vec3,
    distance: f32,
    entity: Entity,
) -> bool {
    let Some(direction) = to_entity.try_normalize() else {
        return true;
    };

    match tracer.trace(from, direction, distance) {
        None => true,
        Some(hit) => hit.entity == Some(entity),
    }
}
