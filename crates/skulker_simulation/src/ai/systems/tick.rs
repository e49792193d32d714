//! Tick systems: движение тел + advance state machine.

use bevy::prelude::*;

use crate::ai::events::{SkulkerCue, SkulkerDespawned};
use crate::ai::{Skulker, TickContext};
use crate::collaborators::{AgentHandle, NavigationBackend, ObserverState, TracerBackend};
use crate::components::{AnimationFlags, MovementOrder};
use crate::config::SkulkerConfig;

use super::DespawnPolicy;

/// System: navigation oracle двигает тела → синхронизируем Transform
///
/// Oracle'ы, которые не владеют телами, возвращают None: Transform не трогаем.
pub fn step_navigation_bodies(
    mut navigation: ResMut<NavigationBackend>,
    mut bodies: Query<(Entity, &Skulker, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    navigation.0.step(time.delta_secs());

    for (entity, skulker, mut transform) in bodies.iter_mut() {
        if !skulker.is_active() {
            continue;
        }
        if let Some(position) = navigation.0.body_position(entity) {
            if transform.translation != position {
                transform.translation = position;
            }
        }
    }
}

/// System: один `Skulker::advance` на entity
///
/// Выход: MovementOrder + AnimationFlags компоненты, SkulkerCue events,
/// despawn (или деактивация для pool) после смерти.
#[allow(clippy::too_many_arguments)]
pub fn advance_skulkers(
    mut commands: Commands,
    mut skulkers: Query<(
        Entity,
        &mut Skulker,
        &SkulkerConfig,
        &mut Transform,
        &mut MovementOrder,
        &mut AnimationFlags,
    )>,
    observer: Res<ObserverState>,
    mut navigation: ResMut<NavigationBackend>,
    tracer: Res<TracerBackend>,
    policy: Res<DespawnPolicy>,
    time: Res<Time<Fixed>>,
    mut cues: EventWriter<SkulkerCue>,
    mut despawned: EventWriter<SkulkerDespawned>,
) {
    let delta = time.delta_secs();

    for (entity, mut skulker, config, mut transform, mut order, mut flags) in skulkers.iter_mut() {
        if !skulker.is_active() {
            continue;
        }

        let output = {
            let mut agent = AgentHandle::new(navigation.0.as_mut(), entity);
            let mut ctx = TickContext {
                observer: observer.pose,
                tracer: tracer.0.as_ref(),
                navigation: &mut agent,
            };
            skulker.advance(delta, config, &mut transform, &mut ctx)
        };

        // Пишем только при изменении (хост слушает Changed<>)
        if *order != output.movement {
            *order = output.movement;
        }
        if flags.is_moving != output.is_moving {
            flags.is_moving = output.is_moving;
        }

        for cue in output.cues {
            cues.write(SkulkerCue { entity, cue });
        }

        if output.despawn_due {
            skulker.on_despawn(&mut AgentHandle::new(navigation.0.as_mut(), entity));
            navigation.0.remove_agent(entity);
            despawned.write(SkulkerDespawned { entity });

            match *policy {
                DespawnPolicy::Despawn => {
                    crate::logger::log(&format!("Skulker {:?} despawned", entity));
                    commands.entity(entity).despawn();
                }
                DespawnPolicy::Recycle => {
                    crate::logger::log(&format!("Skulker {:?} returned to pool", entity));
                }
            }
        }
    }
}
