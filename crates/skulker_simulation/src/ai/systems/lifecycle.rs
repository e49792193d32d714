//! Lifecycle systems: spawn, respawn из pool, kill signals.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::events::{KillSkulker, RespawnSkulker};
use crate::ai::Skulker;
use crate::collaborators::{AgentHandle, NavigationBackend, SceneBackend};
use crate::components::{AnimationFlags, MovementOrder, RoomContext};
use crate::config::SkulkerConfig;
use crate::DeterministicRng;

/// Spawn skulker entity (brain инициализируется в `initialize_spawned_skulkers`)
///
/// Seed для личного RNG берём из сессионного DeterministicRng → детерминизм по seed'у сессии.
pub fn spawn_skulker(
    commands: &mut Commands,
    session_rng: &mut DeterministicRng,
    position: Vec3,
    config: SkulkerConfig,
) -> Entity {
    let seed: u64 = session_rng.rng.gen();
    let entity = commands
        .spawn((
            Transform::from_translation(position),
            config,
            MovementOrder::default(),
            AnimationFlags::default(),
        ))
        .id();
    commands.entity(entity).insert(Skulker::new(entity, seed));
    entity
}

/// System: новые skulker'ы → регистрация в навигации + room context + reset
pub fn initialize_spawned_skulkers(
    mut skulkers: Query<(Entity, &mut Skulker, &SkulkerConfig, &Transform), Added<Skulker>>,
    mut navigation: ResMut<NavigationBackend>,
    scene: Res<SceneBackend>,
) {
    for (entity, mut skulker, config, transform) in skulkers.iter_mut() {
        activate(entity, &mut skulker, config, transform.translation, &mut navigation, &scene);
    }
}

/// System: RespawnSkulker → вернуть неактивного skulker'а в игру
pub fn respawn_pooled_skulkers(
    mut requests: EventReader<RespawnSkulker>,
    mut skulkers: Query<(&mut Skulker, &SkulkerConfig, &mut Transform)>,
    mut navigation: ResMut<NavigationBackend>,
    scene: Res<SceneBackend>,
) {
    for request in requests.read() {
        let Ok((mut skulker, config, mut transform)) = skulkers.get_mut(request.entity) else {
            continue;
        };
        if skulker.is_active() {
            crate::logger::log_warning(&format!(
                "RespawnSkulker: {:?} is still active, ignoring",
                request.entity
            ));
            continue;
        }

        transform.translation = request.position;
        activate(request.entity, &mut skulker, config, request.position, &mut navigation, &scene);
    }
}

fn activate(
    entity: Entity,
    skulker: &mut Skulker,
    config: &SkulkerConfig,
    position: Vec3,
    navigation: &mut NavigationBackend,
    scene: &SceneBackend,
) {
    navigation.0.register_agent(entity, position);
    // Геометрию перечитываем на каждый spawn (комната могла поменяться)
    let room = RoomContext::capture(scene.0.as_ref());
    let mut agent = AgentHandle::new(navigation.0.as_mut(), entity);
    skulker.on_spawn(Some(room), position, config, &mut agent);
}

/// System: KillSkulker events → request_kill
pub fn route_kill_signals(mut kills: EventReader<KillSkulker>, mut skulkers: Query<&mut Skulker>) {
    for kill in kills.read() {
        if let Ok(mut skulker) = skulkers.get_mut(kill.entity) {
            skulker.request_kill();
        }
    }
}
