//! AI Events: outbound cues + lifecycle signals
//!
//! Cue'ы: side effects для аудио/анимации хоста; ядро их только эмитит.

use bevy::prelude::*;

/// Named cue (audio / animation trigger)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Cue {
    /// Ambient wander звук включить
    WanderStart,
    /// Ambient wander звук выключить (прятки, реакция, смерть)
    WanderStop,
    /// One-shot "испуг" при обнаружении (с cooldown)
    Shocked,
    /// Смерть: звук + анимация
    Death,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::WanderStart => "wander-start",
            Cue::WanderStop => "wander-stop",
            Cue::Shocked => "shocked",
            Cue::Death => "death",
        }
    }
}

/// Cue от конкретного skulker'а
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SkulkerCue {
    pub entity: Entity,
    pub cue: Cue,
}

/// Внешний kill signal (урон, скрипт, scoring)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct KillSkulker {
    pub entity: Entity,
}

/// Skulker отработал despawn delay после смерти и убран из мира
///
/// Хост может вернуть его в pool (spawn заново через `spawn_skulker`).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SkulkerDespawned {
    pub entity: Entity,
}

/// Вернуть skulker'а из pool (только при `DespawnPolicy::Recycle`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RespawnSkulker {
    pub entity: Entity,
    pub position: Vec3,
}
