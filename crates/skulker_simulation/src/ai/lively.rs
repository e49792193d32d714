//! Lively-action selector: мелкие "живые" движения рядом с наблюдателем,
//! пока он не смотрит.
//!
//! Веса фиксированные: Circle 40 / Dart 30 / Reposition 30.

use bevy::prelude::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::collaborators::NavigationAgent;
use crate::config::SkulkerConfig;
use crate::shared::{perpendicular, planar_direction, random_in_disk, random_planar_direction, range_or_min};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum LivelyAction {
    /// Обойти наблюдателя по дуге
    Circle,
    /// Резкий рывок вбок
    Dart,
    /// Небольшое смещение в случайную сторону
    Reposition,
}

impl LivelyAction {
    pub const ALL: [LivelyAction; 3] = [LivelyAction::Circle, LivelyAction::Dart, LivelyAction::Reposition];
    pub const WEIGHTS: [u32; 3] = [40, 30, 30];
}

/// Что получилось из попытки lively action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LivelyOutcome {
    /// Точка snapped → идём
    Move { action: LivelyAction, target: Vec3 },
    /// Snap не удался → пропускаем до следующего интервала
    Skipped { action: LivelyAction },
}

pub fn select_lively_action<R: Rng + ?Sized>(rng: &mut R) -> LivelyAction {
    match WeightedIndex::new(LivelyAction::WEIGHTS) {
        Ok(dist) => LivelyAction::ALL[dist.sample(rng)],
        // Веса: константы, сюда не попадаем
        Err(_) => LivelyAction::Circle,
    }
}

/// Сырая (не snapped) точка для действия
pub fn lively_candidate<R: Rng + ?Sized>(
    action: LivelyAction,
    entity_pos: Vec3,
    observer_pos: Vec3,
    config: &SkulkerConfig,
    rng: &mut R,
) -> Vec3 {
    let mut observer_to_entity = planar_direction(entity_pos - observer_pos);
    if observer_to_entity == Vec3::ZERO {
        observer_to_entity = random_planar_direction(rng);
    }

    match action {
        LivelyAction::Circle => {
            let max_angle = config.circle_max_angle_degrees.to_radians();
            let angle = range_or_min(rng, -max_angle, max_angle);
            let rotated = Quat::from_rotation_y(angle) * observer_to_entity;
            let mut target = observer_pos + rotated * config.circle_radius;
            target.y = entity_pos.y;
            target
        }
        LivelyAction::Dart => {
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let distance = range_or_min(rng, config.dart_distance_min, config.dart_distance_max);
            entity_pos + perpendicular(observer_to_entity) * side * distance
        }
        LivelyAction::Reposition => entity_pos + random_in_disk(rng, config.reposition_radius),
    }
}

/// Выбрать действие, посчитать точку, snap'нуть на navigable surface
pub fn plan_lively_action<R: Rng + ?Sized>(
    entity_pos: Vec3,
    observer_pos: Vec3,
    config: &SkulkerConfig,
    navigation: &dyn NavigationAgent,
    rng: &mut R,
) -> LivelyOutcome {
    let action = select_lively_action(rng);
    let candidate = lively_candidate(action, entity_pos, observer_pos, config, rng);

    match navigation.snap_to_surface(candidate, config.lively_snap_radius) {
        Some(target) => LivelyOutcome::Move { action, target },
        None => LivelyOutcome::Skipped { action },
    }
}
