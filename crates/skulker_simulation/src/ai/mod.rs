//! Skulker AI: perception + behavior state machine + planners
//!
//! Чистая логика (brain, selectors) не знает про ECS: её можно гонять
//! с fake коллабораторами. Bevy systems в `systems` только переносят
//! данные между World и `Skulker::advance`.

use bevy::prelude::*;

pub mod brain;
pub mod components;
pub mod events;
pub mod hiding;
pub mod lively;
pub mod perception;
pub mod roam;
pub mod systems;

#[cfg(test)]
mod brain_tests;

// Re-export основных типов
pub use brain::{Skulker, TickContext, TickOutput};
pub use components::{BehaviorMode, BehaviorState, BehaviorTimers};
pub use events::{Cue, KillSkulker, RespawnSkulker, SkulkerCue, SkulkerDespawned};
pub use hiding::{select_hide_target, HideParams, HidePlan, HideSource};
pub use lively::{select_lively_action, LivelyAction, LivelyOutcome};
pub use perception::{Observation, PerceptionCache};
pub use systems::{spawn_skulker, DespawnPolicy};

/// Skulker Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. initialize_spawned_skulkers: room context + reset для новых entity
/// 2. respawn_pooled_skulkers: возврат из pool
/// 3. route_kill_signals: KillSkulker → Skulker::request_kill
/// 4. step_navigation_bodies: navigation oracle двигает тела
/// 5. advance_skulkers: perception → transitions → movement → cues
///
/// Backends (navigation, scene, tracer) ставит хост; пока их нет: системы не запускаются.
pub struct SkulkerPlugin;

/// Все AI системы skulker'ов (для ordering хост-систем: observer до, cue-слушатели после)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkulkerSystems;

impl Plugin for SkulkerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SkulkerCue>()
            .add_event::<KillSkulker>()
            .add_event::<RespawnSkulker>()
            .add_event::<SkulkerDespawned>()
            .init_resource::<crate::collaborators::ObserverState>()
            .init_resource::<DespawnPolicy>();

        app.add_systems(
            FixedUpdate,
            (
                systems::initialize_spawned_skulkers,
                systems::respawn_pooled_skulkers,
                systems::route_kill_signals,
                systems::step_navigation_bodies,
                systems::advance_skulkers,
            )
                .chain() // Последовательное выполнение для детерминизма
                .run_if(systems::backends_ready)
                .in_set(SkulkerSystems),
        );
    }
}
