//! Movement компоненты: выход state machine для навигации

use bevy::prelude::*;

/// Зачем skulker идёт в точку (какой planner её выдал)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum TargetPurpose {
    Roam,
    Explore,
    Hide,
    Lively,
}

/// Что state machine отдала навигации в этом тике
///
/// Ровно один вариант за тик.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum MovementOrder {
    /// Двигаться к точке (уже snapped на navigable surface)
    MoveTo { target: Vec3, purpose: TargetPurpose },
    /// Движение приостановлено (ReactingToDetection)
    Suspended,
    /// Нет движения (до первого тика или после смерти)
    Halted,
}

impl Default for MovementOrder {
    fn default() -> Self {
        Self::Halted
    }
}

impl MovementOrder {
    pub fn target(&self) -> Option<Vec3> {
        match self {
            MovementOrder::MoveTo { target, .. } => Some(*target),
            MovementOrder::Suspended | MovementOrder::Halted => None,
        }
    }
}

/// Animation flags для визуального слоя
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimationFlags {
    pub is_moving: bool,
}
