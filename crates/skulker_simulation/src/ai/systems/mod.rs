//! AI systems (ECS glue вокруг `Skulker`)

pub mod lifecycle;
pub mod tick;

// Re-export all systems
pub use lifecycle::*;
pub use tick::*;

use bevy::prelude::*;

use crate::collaborators::{NavigationBackend, SceneBackend, TracerBackend};

/// Что делать с entity, когда после смерти истёк despawn delay
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DespawnPolicy {
    /// Удалить entity из мира
    #[default]
    Despawn,
    /// Оставить entity неактивной: хост вернёт её через RespawnSkulker
    Recycle,
}

/// Run condition: хост поставил все backends
pub fn backends_ready(
    navigation: Option<Res<NavigationBackend>>,
    scene: Option<Res<SceneBackend>>,
    tracer: Option<Res<TracerBackend>>,
) -> bool {
    navigation.is_some() && scene.is_some() && tracer.is_some()
}
