//! SKULKER Simulation Core
//!
//! Perception + behavior engine для "skulker" сущности на Bevy 0.16 ECS.
//!
//! Архитектура:
//! - ECS = decision layer (perception, state machine, planners, lifecycle)
//! - Хост = навигация, геометрия сцены, raycast, наблюдатель (за trait'ами в `collaborators`)

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod collaborators;
pub mod components;
pub mod config;
pub mod logger;
pub mod shared;

// Re-export базовых типов для удобства
pub use ai::{
    spawn_skulker, BehaviorMode, BehaviorState, Cue, DespawnPolicy, KillSkulker, RespawnSkulker, Skulker,
    SkulkerCue, SkulkerDespawned, SkulkerPlugin, SkulkerSystems, TickContext, TickOutput,
};
pub use collaborators::{
    HeadlessNavigation, NavigationBackend, ObserverState, ObserverPose, ObstacleTracer, SceneBackend, StaticScene,
    TracerBackend,
};
pub use components::*;
pub use config::{ConfigError, SkulkerConfig};
pub use logger::init_logger;

/// Частота simulation tick (FixedUpdate)
pub const TICK_HZ: f64 = 60.0;

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            // Детерминистичный RNG (seed по умолчанию, если хост не поставил свой)
            .init_resource::<DeterministicRng>()
            .add_plugins(SkulkerPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Из него берутся seed'ы личных RNG skulker'ов при spawn'е.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную: каждый `app.update()` = ровно один fixed tick
/// (кроме самого первого update, у которого delta нулевая).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / TICK_HZ)));

    app
}

/// Поставить headless backends: прямоугольная комната + коробки-препятствия
pub fn install_headless_room(app: &mut App, bounds: RoomBounds, obstacles: Vec<Obstacle>) {
    app.insert_resource(NavigationBackend(Box::new(HeadlessNavigation::new(
        bounds,
        obstacles.clone(),
    ))))
    .insert_resource(SceneBackend(Box::new(StaticScene::new(Some(bounds), obstacles.clone()))))
    .insert_resource(TracerBackend(Box::new(ObstacleTracer::new(obstacles))));
}

/// Spawn skulker'а прямо в World (main / тесты, без системы-спавнера)
pub fn spawn_skulker_in_world(world: &mut World, position: Vec3, config: SkulkerConfig) -> Entity {
    let entity = world.resource_scope(|world, mut session_rng: Mut<DeterministicRng>| {
        spawn_skulker(&mut world.commands(), &mut session_rng, position, config)
    });
    world.flush();
    entity
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Debug формат: простейшая стабильная сериализация
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
