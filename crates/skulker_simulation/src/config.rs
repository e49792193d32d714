//! Skulker tuning (perception, hiding, lively actions, roaming).
//!
//! Все веса и пороги: статические константы на архетип.
//! Хост может загрузить их из TOML (`SkulkerConfig::from_file`), отсутствующие
//! поля берутся из `Default`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Параметры поведения skulker'а
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct SkulkerConfig {
    // --- Perception ---
    /// Минимальный интервал между perception samples (секунды)
    pub sample_interval: f32,
    /// Полный угол обзора наблюдателя (градусы)
    pub field_of_view_degrees: f32,

    // --- Detection / hiding ---
    /// Если наблюдатель смотрит и ближе этой дистанции → реакция и прятки
    pub hide_distance: f32,
    /// Ближе этой дистанции (и не замечен) → LivelyNear
    pub detection_range: f32,
    /// Базовое смещение для эвристик пряток (метры)
    pub min_hide_distance: f32,
    /// Зазор между краем препятствия и точкой укрытия
    pub hide_margin: f32,
    /// Snap radius для кандидатов за препятствиями
    pub obstacle_snap_radius: f32,
    /// Snap radius для directional fallback (щедрый)
    pub directional_snap_radius: f32,
    /// Snap radius для perpendicular fallback (узкий)
    pub perpendicular_snap_radius: f32,
    /// Множитель скорости во время пряток
    pub hide_speed_multiplier: f32,

    // --- Reaction ---
    pub reaction_duration_min: f32,
    pub reaction_duration_max: f32,
    /// Скорость разворота к наблюдателю во время реакции (градусы/сек)
    pub reaction_turn_rate_degrees: f32,
    /// Cooldown для "shocked" cue (секунды)
    pub shocked_cue_cooldown: f32,

    // --- Movement ---
    /// Базовая скорость (м/с)
    pub base_speed: f32,
    /// Скорость разворота по направлению движения (градусы/сек)
    pub movement_turn_rate_degrees: f32,
    /// Цель считается достигнутой ближе этой дистанции
    pub arrival_threshold: f32,

    // --- Lively actions ---
    pub lively_interval: f32,
    pub circle_radius: f32,
    pub circle_max_angle_degrees: f32,
    pub dart_distance_min: f32,
    pub dart_distance_max: f32,
    pub reposition_radius: f32,
    pub lively_snap_radius: f32,

    // --- Roam / explore ---
    pub roam_interval: f32,
    /// Радиус вокруг наблюдателя, когда границы комнаты неизвестны
    pub roam_radius: f32,
    pub roam_snap_radius: f32,
    pub explore_min_time: f32,
    pub explore_max_time: f32,
    /// Насколько близко roam target к препятствию, чтобы его "исследовать"
    pub explore_interest_radius: f32,
    pub explore_probability: f32,
    /// Рост вероятности nudge за секунду без nudge
    pub explore_nudge_rate: f32,
    pub explore_nudge_cap: f32,
    pub explore_nudge_radius: f32,

    // --- Lifecycle ---
    /// Задержка между смертью и возвратом в pool (секунды)
    pub despawn_delay: f32,
}

impl Default for SkulkerConfig {
    fn default() -> Self {
        Self {
            sample_interval: 0.1,
            field_of_view_degrees: 90.0,

            hide_distance: 8.0,
            detection_range: 5.0,
            min_hide_distance: 6.0,
            hide_margin: 1.0,
            obstacle_snap_radius: 2.0,
            directional_snap_radius: 10.0,
            perpendicular_snap_radius: 3.0,
            hide_speed_multiplier: 1.8,

            reaction_duration_min: 1.5,
            reaction_duration_max: 2.5,
            reaction_turn_rate_degrees: 360.0,
            shocked_cue_cooldown: 5.0,

            base_speed: 2.0,
            movement_turn_rate_degrees: 270.0,
            arrival_threshold: 0.5,

            lively_interval: 2.0,
            circle_radius: 2.5,
            circle_max_angle_degrees: 35.0,
            dart_distance_min: 2.0,
            dart_distance_max: 4.0,
            reposition_radius: 3.0,
            lively_snap_radius: 1.5,

            roam_interval: 4.0,
            roam_radius: 8.0,
            roam_snap_radius: 2.0,
            explore_min_time: 3.0,
            explore_max_time: 6.0,
            explore_interest_radius: 1.5,
            explore_probability: 0.5,
            explore_nudge_rate: 0.25,
            explore_nudge_cap: 0.5,
            explore_nudge_radius: 0.75,

            despawn_delay: 3.0,
        }
    }
}

/// Ошибки загрузки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SkulkerConfig {
    /// Загрузка из TOML файла (с валидацией)
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Парсинг из TOML строки (с валидацией)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Проверка инвариантов: интервалы > 0, min <= max, fov в (0, 360]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("sample_interval", self.sample_interval),
            ("lively_interval", self.lively_interval),
            ("roam_interval", self.roam_interval),
            ("base_speed", self.base_speed),
            ("hide_speed_multiplier", self.hide_speed_multiplier),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(field, format!("must be > 0, got {}", value)));
            }
        }

        let non_negative = [
            ("hide_distance", self.hide_distance),
            ("detection_range", self.detection_range),
            ("min_hide_distance", self.min_hide_distance),
            ("hide_margin", self.hide_margin),
            ("reaction_duration_min", self.reaction_duration_min),
            ("shocked_cue_cooldown", self.shocked_cue_cooldown),
            ("arrival_threshold", self.arrival_threshold),
            ("explore_min_time", self.explore_min_time),
            ("dart_distance_min", self.dart_distance_min),
            ("despawn_delay", self.despawn_delay),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(invalid(field, format!("must be >= 0, got {}", value)));
            }
        }

        let ranges = [
            ("reaction_duration_max", self.reaction_duration_min, self.reaction_duration_max),
            ("explore_max_time", self.explore_min_time, self.explore_max_time),
            ("dart_distance_max", self.dart_distance_min, self.dart_distance_max),
        ];
        for (field, min, max) in ranges {
            if max < min {
                return Err(invalid(field, format!("{} is below its minimum {}", max, min)));
            }
        }

        if !(self.field_of_view_degrees > 0.0 && self.field_of_view_degrees <= 360.0) {
            return Err(invalid(
                "field_of_view_degrees",
                format!("must be in (0, 360], got {}", self.field_of_view_degrees),
            ));
        }

        if !(0.0..=1.0).contains(&self.explore_probability) {
            return Err(invalid(
                "explore_probability",
                format!("must be in [0, 1], got {}", self.explore_probability),
            ));
        }

        Ok(())
    }

    pub fn half_fov_radians(&self) -> f32 {
        (self.field_of_view_degrees * 0.5).to_radians()
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
