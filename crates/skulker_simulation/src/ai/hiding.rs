//! Hiding-spot selector.
//!
//! Порядок (первый успех выигрывает):
//! 1. Укрытие за препятствием (scoring по alignment + дистанции от наблюдателя)
//! 2. Directional fallback: прочь от наблюдателя
//! 3. Perpendicular fallback: вбок от линии взгляда
//!
//! Если всё отвергнуто навигацией → None, вызывающий оставляет текущую цель.

use bevy::prelude::*;
use rand::Rng;

use crate::collaborators::NavigationAgent;
use crate::components::Obstacle;
use crate::config::SkulkerConfig;
use crate::shared::{perpendicular, planar_direction, random_planar_direction};

/// Препятствие должно лежать примерно "по ту сторону" от наблюдателя
pub const HIDE_MIN_ALIGNMENT: f32 = 0.3;

/// Дополнительное смещение directional fallback (метры, поверх min_hide_distance)
const DIRECTIONAL_EXTRA_MIN: f32 = 1.0;
const DIRECTIONAL_EXTRA_MAX: f32 = 3.0;

/// Амплитуда случайного планарного шума directional fallback
const DIRECTIONAL_JITTER: f32 = 1.0;

/// Откуда взялась точка укрытия
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideSource {
    /// Индекс препятствия в RoomContext::obstacles
    Obstacle(usize),
    Directional,
    Perpendicular,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HidePlan {
    pub target: Vec3,
    pub source: HideSource,
}

/// Параметры selector'а (срез SkulkerConfig)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HideParams {
    pub min_hide_distance: f32,
    pub margin: f32,
    pub obstacle_snap_radius: f32,
    pub directional_snap_radius: f32,
    pub perpendicular_snap_radius: f32,
}

impl HideParams {
    pub fn from_config(config: &SkulkerConfig) -> Self {
        Self {
            min_hide_distance: config.min_hide_distance,
            margin: config.hide_margin,
            obstacle_snap_radius: config.obstacle_snap_radius,
            directional_snap_radius: config.directional_snap_radius,
            perpendicular_snap_radius: config.perpendicular_snap_radius,
        }
    }
}

/// Кандидат за препятствием
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCandidate {
    pub obstacle: usize,
    pub point: Vec3,
    pub alignment: f32,
    pub score: f32,
}

/// Кандидаты за препятствиями, отсортированные по score (лучший первый)
pub fn score_cover_candidates(
    entity_pos: Vec3,
    observer_pos: Vec3,
    obstacles: &[Obstacle],
    margin: f32,
) -> Vec<CoverCandidate> {
    let to_entity = planar_direction(entity_pos - observer_pos);

    let mut candidates: Vec<CoverCandidate> = obstacles
        .iter()
        .enumerate()
        .filter_map(|(index, obstacle)| {
            let to_obstacle = planar_direction(obstacle.position - observer_pos);
            let alignment = to_obstacle.dot(to_entity);
            if alignment <= HIDE_MIN_ALIGNMENT {
                return None;
            }

            let point = obstacle.position + to_obstacle * (obstacle.half_extent() + margin);
            let score = observer_pos.distance(point) * (1.0 + alignment);
            Some(CoverCandidate {
                obstacle: index,
                point,
                alignment,
                score,
            })
        })
        .collect();

    // Stable sort: при равном score выигрывает препятствие с меньшим индексом
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

pub fn select_hide_target<R: Rng + ?Sized>(
    entity_pos: Vec3,
    observer_pos: Vec3,
    obstacles: &[Obstacle],
    params: &HideParams,
    navigation: &dyn NavigationAgent,
    rng: &mut R,
) -> Option<HidePlan> {
    // 1. Укрытие за препятствием
    for candidate in score_cover_candidates(entity_pos, observer_pos, obstacles, params.margin) {
        if let Some(target) = navigation.snap_to_surface(candidate.point, params.obstacle_snap_radius) {
            return Some(HidePlan {
                target,
                source: HideSource::Obstacle(candidate.obstacle),
            });
        }
    }

    let mut away = planar_direction(entity_pos - observer_pos);
    if away == Vec3::ZERO {
        // Стоим прямо в наблюдателе: любое направление годится
        away = random_planar_direction(rng);
    }

    // 2. Directional: прочь от наблюдателя + шум
    let extra = rng.gen_range(DIRECTIONAL_EXTRA_MIN..=DIRECTIONAL_EXTRA_MAX);
    let jitter = Vec3::new(
        rng.gen_range(-DIRECTIONAL_JITTER..=DIRECTIONAL_JITTER),
        0.0,
        rng.gen_range(-DIRECTIONAL_JITTER..=DIRECTIONAL_JITTER),
    );
    let directional = entity_pos + away * (params.min_hide_distance + extra) + jitter;
    if let Some(target) = navigation.snap_to_surface(directional, params.directional_snap_radius) {
        return Some(HidePlan {
            target,
            source: HideSource::Directional,
        });
    }

    // 3. Perpendicular: вбок от линии взгляда (сторона случайная)
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let sideways = entity_pos + perpendicular(away) * side * params.min_hide_distance;
    if let Some(target) = navigation.snap_to_surface(sideways, params.perpendicular_snap_radius) {
        return Some(HidePlan {
            target,
            source: HideSource::Perpendicular,
        });
    }

    None
}
