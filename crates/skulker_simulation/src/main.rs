//! Headless симуляция SKULKER
//!
//! Комната 16x12 с тремя ящиками, наблюдатель ходит по кругу и
//! периодически оборачивается. Печатаем смену режимов и cue'ы.
//!
//! Usage: `skulker_simulation [config.toml]`

use bevy::prelude::*;
use skulker_simulation::logger::{self, LogLevel};
use skulker_simulation::*;
use std::path::Path;

/// Наблюдатель идёт по кругу радиусом 5m, смотрит по ходу движения
fn orbit_observer(mut observer: ResMut<ObserverState>, time: Res<Time<Fixed>>) {
    let t = time.elapsed_secs() * 0.4;
    let position = Vec3::new(t.cos() * 5.0, 1.6, t.sin() * 5.0);
    // Каждые ~8 секунд оборачивается назад
    let forward = if (time.elapsed_secs() / 8.0) as u32 % 2 == 0 {
        Vec3::new(-t.sin(), 0.0, t.cos())
    } else {
        Vec3::new(t.sin(), 0.0, -t.cos())
    };
    observer.pose = Some(ObserverPose::new(position, forward));
}

fn print_cues(mut cues: EventReader<SkulkerCue>, time: Res<Time<Fixed>>) {
    for event in cues.read() {
        println!("[{:7.2}s] {:?} cue: {}", time.elapsed_secs(), event.entity, event.cue.as_str());
    }
}

/// Config из файла (если передан), иначе defaults
fn load_config() -> SkulkerConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SkulkerConfig::default();
    };
    match SkulkerConfig::from_file(Path::new(&path)) {
        Ok(config) => config,
        Err(err) => {
            logger::log_error(&format!("Failed to load {}: {}, using defaults", path, err));
            SkulkerConfig::default()
        }
    }
}

fn main() {
    let seed = 42;
    println!("Starting SKULKER headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    // Debug логи переходов слишком шумные для демо
    logger::set_log_level(LogLevel::Info);
    let config = load_config();
    app.add_plugins(SimulationPlugin);
    app.add_systems(FixedUpdate, (orbit_observer.before(SkulkerSystems), print_cues.after(SkulkerSystems)));

    install_headless_room(
        &mut app,
        RoomBounds::new(Vec3::new(-8.0, 0.0, -6.0), Vec3::new(8.0, 3.0, 6.0)),
        vec![
            Obstacle::new(Vec3::new(3.0, 0.5, 2.0), Vec3::new(1.0, 1.0, 1.0)),
            Obstacle::new(Vec3::new(-4.0, 0.5, -3.0), Vec3::new(2.0, 1.0, 1.0)),
            Obstacle::new(Vec3::new(5.0, 0.5, -4.0), Vec3::new(1.5, 1.0, 1.5)),
        ],
    );

    let skulkers: Vec<Entity> = [Vec3::new(-6.0, 0.0, 4.0), Vec3::new(6.0, 0.0, 0.0)]
        .into_iter()
        .map(|position| spawn_skulker_in_world(app.world_mut(), position, config.clone()))
        .collect();

    let mut last_modes: Vec<Option<BehaviorMode>> = vec![None; skulkers.len()];

    // 60 секунд симуляции
    for tick in 0..3600 {
        app.update();

        for (index, entity) in skulkers.iter().enumerate() {
            let Some(skulker) = app.world().get::<Skulker>(*entity) else {
                continue;
            };
            let mode = skulker.mode();
            if last_modes[index] != Some(mode) {
                println!("Tick {}: {:?} → {:?}", tick, entity, mode);
                last_modes[index] = Some(mode);
            }
        }

        if tick == 2400 {
            println!("Tick {}: killing {:?}", tick, skulkers[0]);
            app.world_mut().send_event(KillSkulker { entity: skulkers[0] });
        }
    }

    println!("Simulation complete! {} entities left", app.world().entities().len());
}
