//! Roam/explore planner.
//!
//! - Roam: случайная точка в границах комнаты (или вокруг наблюдателя, если границ нет)
//! - Explore: roam target рядом с препятствием → можно "исследовать" его какое-то время,
//!   периодически сдвигаясь рядом, чтобы не стоять статуей

use bevy::prelude::*;
use rand::Rng;

use crate::collaborators::NavigationAgent;
use crate::components::{Obstacle, RoomContext};
use crate::config::SkulkerConfig;
use crate::shared::{planar_distance, random_in_disk, range_or_min};

/// Сырая roam точка (до snap'а)
pub fn roam_candidate<R: Rng + ?Sized>(
    entity_pos: Vec3,
    room: Option<&RoomContext>,
    observer_pos: Option<Vec3>,
    config: &SkulkerConfig,
    rng: &mut R,
) -> Vec3 {
    if let Some(bounds) = room.and_then(|room| room.bounds) {
        return Vec3::new(
            range_or_min(rng, bounds.min.x, bounds.max.x),
            entity_pos.y,
            range_or_min(rng, bounds.min.z, bounds.max.z),
        );
    }

    // Degraded: границ нет → бродим вокруг наблюдателя (или вокруг себя)
    let center = observer_pos.unwrap_or(entity_pos);
    let mut target = center + random_in_disk(rng, config.roam_radius);
    target.y = entity_pos.y;
    target
}

/// Roam точка, snapped на navigable surface (None → оставляем текущую цель)
pub fn plan_roam_target<R: Rng + ?Sized>(
    entity_pos: Vec3,
    room: Option<&RoomContext>,
    observer_pos: Option<Vec3>,
    config: &SkulkerConfig,
    navigation: &dyn NavigationAgent,
    rng: &mut R,
) -> Option<Vec3> {
    let candidate = roam_candidate(entity_pos, room, observer_pos, config, rng);
    navigation.snap_to_surface(candidate, config.roam_snap_radius)
}

/// Новая roam цель только когда почти дошли И roam timer истёк
pub fn should_replan(remaining_distance: f32, roam_timer: f32, config: &SkulkerConfig) -> bool {
    remaining_distance <= config.arrival_threshold && roam_timer >= config.roam_interval
}

/// Ближайшее препятствие, рядом с которым оказалась точка
pub fn obstacle_of_interest(point: Vec3, obstacles: &[Obstacle], interest_radius: f32) -> Option<usize> {
    obstacles
        .iter()
        .enumerate()
        .filter_map(|(index, obstacle)| {
            let distance = planar_distance(point, obstacle.position);
            (distance <= obstacle.half_extent() + interest_radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Длительность исследования: U[explore_min_time, explore_max_time]
pub fn explore_duration<R: Rng + ?Sized>(config: &SkulkerConfig, rng: &mut R) -> f32 {
    range_or_min(rng, config.explore_min_time, config.explore_max_time)
}

/// Вероятность nudge в этом тике: растёт со временем с прошлого nudge, с потолком
pub fn nudge_probability(since_last_nudge: f32, config: &SkulkerConfig) -> f32 {
    (since_last_nudge * config.explore_nudge_rate).clamp(0.0, config.explore_nudge_cap)
}

/// Небольшой сдвиг вокруг anchor точки исследования
pub fn explore_nudge_candidate<R: Rng + ?Sized>(anchor: Vec3, config: &SkulkerConfig, rng: &mut R) -> Vec3 {
    anchor + random_in_disk(rng, config.explore_nudge_radius)
}
