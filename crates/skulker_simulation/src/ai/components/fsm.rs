//! FSM components (behavior state, timers).

use bevy::prelude::*;

/// Behavior state машины skulker'а
///
/// Инвариант: ровно одно состояние активно (enum).
#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum BehaviorState {
    /// Wandering: начальное состояние, бродим по комнате
    Wandering,

    /// Exploring: "изучаем" препятствие рядом с roam target
    Exploring {
        /// Индекс препятствия в RoomContext::obstacles (слабая ссылка)
        obstacle: usize,
        /// Точка, вокруг которой делаем nudge'и
        anchor: Vec3,
        /// Дедлайн исследования (clock skulker'а, секунды)
        until: f64,
    },

    /// LivelyNear: наблюдатель рядом и не смотрит
    LivelyNear,

    /// Hiding: нас видят, бежим в укрытие
    Hiding,

    /// ReactingToDetection: замерли и смотрим на наблюдателя (multi-tick)
    ReactingToDetection {
        /// Сколько длится реакция (секунды)
        duration: f32,
    },

    /// Dead: terminal, AI отключен
    Dead {
        /// Когда вернуть entity в pool (clock skulker'а, секунды)
        despawn_at: f64,
        /// despawn_due уже отдан хосту
        despawn_reported: bool,
    },
}

impl Default for BehaviorState {
    fn default() -> Self {
        Self::Wandering
    }
}

impl BehaviorState {
    pub fn mode(&self) -> BehaviorMode {
        match self {
            BehaviorState::Wandering => BehaviorMode::Wandering,
            BehaviorState::Exploring { .. } => BehaviorMode::Exploring,
            BehaviorState::LivelyNear => BehaviorMode::LivelyNear,
            BehaviorState::Hiding => BehaviorMode::Hiding,
            BehaviorState::ReactingToDetection { .. } => BehaviorMode::ReactingToDetection,
            BehaviorState::Dead { .. } => BehaviorMode::Dead,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, BehaviorState::Dead { .. })
    }
}

/// Вид состояния без данных (для логов, событий, тестов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BehaviorMode {
    Wandering,
    Exploring,
    LivelyNear,
    Hiding,
    ReactingToDetection,
    Dead,
}

/// Таймеры state machine
///
/// Длительности растут с delta каждого тика и сбрасываются на переходе,
/// который их "потребляет". `last_*`: отметки clock'а skulker'а.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct BehaviorTimers {
    /// С последнего выбора roam цели
    pub roam_timer: f32,
    /// С начала исследования / последнего nudge
    pub exploration_timer: f32,
    pub last_lively_action_time: f64,
    pub last_shocked_cue_time: f64,
    /// Сколько уже длится ReactingToDetection
    pub detection_reaction_elapsed: f32,
}

impl Default for BehaviorTimers {
    fn default() -> Self {
        Self {
            roam_timer: 0.0,
            exploration_timer: 0.0,
            // Первый lively action / shocked cue доступны сразу
            last_lively_action_time: f64::NEG_INFINITY,
            last_shocked_cue_time: f64::NEG_INFINITY,
            detection_reaction_elapsed: 0.0,
        }
    }
}

impl BehaviorTimers {
    pub fn advance(&mut self, delta: f32) {
        self.roam_timer += delta;
        self.exploration_timer += delta;
    }
}
