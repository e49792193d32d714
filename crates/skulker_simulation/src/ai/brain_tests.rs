//! Тесты behavior state machine (без ECS, с fake коллабораторами)

use super::*;
use crate::collaborators::{LineOfSightTracer, NavigationAgent, ObserverPose, TraceHit};
use crate::components::{MovementOrder, Obstacle, RoomBounds, RoomContext, TargetPurpose};
use crate::config::SkulkerConfig;
use std::cell::Cell;
use std::sync::Arc;

const DT: f32 = 0.1;

/// Навигация, которая принимает (или отвергает) любой snap и записывает команды
#[derive(Default)]
struct FakeNav {
    reject_snaps: bool,
    snap_calls: Cell<u32>,
    set_target_calls: u32,
    last_target: Option<Vec3>,
    stopped: bool,
    speed: f32,
    remaining: f32,
    velocity: Vec3,
}

impl NavigationAgent for FakeNav {
    fn snap_to_surface(&self, point: Vec3, _search_radius: f32) -> Option<Vec3> {
        self.snap_calls.set(self.snap_calls.get() + 1);
        (!self.reject_snaps).then_some(point)
    }
    fn set_target(&mut self, point: Vec3) {
        self.set_target_calls += 1;
        self.last_target = Some(point);
    }
    fn desired_velocity(&self) -> Vec3 {
        self.velocity
    }
    fn remaining_distance(&self) -> f32 {
        self.remaining
    }
    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }
    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

/// Пустая сцена: луч всегда свободен
struct ClearTracer;

impl LineOfSightTracer for ClearTracer {
    fn trace(&self, _from: Vec3, _direction: Vec3, _max_distance: f32) -> Option<TraceHit> {
        None
    }
}

struct Rig {
    skulker: Skulker,
    config: SkulkerConfig,
    transform: Transform,
    nav: FakeNav,
    observer: Option<ObserverPose>,
}

impl Rig {
    fn new(config: SkulkerConfig) -> Self {
        Self::in_room(config, None)
    }

    fn in_room(config: SkulkerConfig, room: Option<RoomContext>) -> Self {
        let mut nav = FakeNav::default();
        let mut skulker = Skulker::new(Entity::from_raw(1), 7);
        skulker.on_spawn(room.map(Arc::new), Vec3::ZERO, &config, &mut nav);
        Self {
            skulker,
            config,
            transform: Transform::from_translation(Vec3::ZERO),
            nav,
            observer: None,
        }
    }

    /// Наблюдатель в `distance` по -Z, смотрит на skulker'а
    fn watch_from(&mut self, distance: f32) {
        self.observer = Some(ObserverPose::new(Vec3::new(0.0, 0.0, -distance), Vec3::Z));
    }

    /// Наблюдатель там же, но отвернулся
    fn look_away_from(&mut self, distance: f32) {
        self.observer = Some(ObserverPose::new(Vec3::new(0.0, 0.0, -distance), Vec3::NEG_Z));
    }

    fn tick(&mut self) -> TickOutput {
        self.tick_with(DT)
    }

    fn tick_with(&mut self, delta: f32) -> TickOutput {
        let tracer = ClearTracer;
        let mut ctx = TickContext {
            observer: self.observer,
            tracer: &tracer,
            navigation: &mut self.nav,
        };
        self.skulker.advance(delta, &self.config, &mut self.transform, &mut ctx)
    }
}

fn fixed_reaction(seconds: f32) -> SkulkerConfig {
    SkulkerConfig {
        reaction_duration_min: seconds,
        reaction_duration_max: seconds,
        ..SkulkerConfig::default()
    }
}

/// Крошечная комната вокруг одного ящика: любая roam точка рядом с ним
fn box_room() -> RoomContext {
    RoomContext::new(
        Some(RoomBounds::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0))),
        vec![Obstacle::new(Vec3::ZERO, Vec3::splat(1.0))],
    )
}

fn exploring_config(dwell: f32) -> SkulkerConfig {
    SkulkerConfig {
        explore_probability: 1.0,
        explore_min_time: dwell,
        explore_max_time: dwell,
        ..SkulkerConfig::default()
    }
}

fn count(cues: &[Cue], cue: Cue) -> usize {
    cues.iter().filter(|c| **c == cue).count()
}

#[test]
fn test_spawn_resets_and_starts_wandering() {
    let mut rig = Rig::new(SkulkerConfig::default());
    assert!(rig.skulker.is_active());
    assert_eq!(rig.nav.speed, rig.config.base_speed);
    assert!(!rig.nav.stopped);

    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Wandering);
    assert_eq!(out.cues, vec![Cue::WanderStart]);
    assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Roam, .. }));
}

#[test]
fn test_inactive_skulker_does_nothing() {
    let config = SkulkerConfig::default();
    let mut skulker = Skulker::new(Entity::from_raw(3), 1);
    let mut nav = FakeNav::default();
    let mut transform = Transform::default();
    let tracer = ClearTracer;
    let mut ctx = TickContext { observer: None, tracer: &tracer, navigation: &mut nav };

    let out = skulker.advance(DT, &config, &mut transform, &mut ctx);
    assert_eq!(out.movement, MovementOrder::Halted);
    assert!(out.cues.is_empty());
    assert_eq!(skulker.now(), 0.0);
}

#[test]
fn test_scenario_close_and_observed_reacts() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.tick();

    rig.watch_from(3.0);
    let out = rig.tick();

    assert_eq!(out.mode, BehaviorMode::ReactingToDetection);
    assert_eq!(out.movement, MovementOrder::Suspended);
    assert!(!out.is_moving);
    assert!(rig.nav.stopped);
    assert_eq!(count(&out.cues, Cue::WanderStop), 1);
    assert_eq!(count(&out.cues, Cue::Shocked), 1);
}

#[test]
fn test_scenario_far_observer_keeps_wandering() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(10.0);

    for _ in 0..20 {
        assert_eq!(rig.tick().mode, BehaviorMode::Wandering);
    }
}

#[test]
fn test_observed_beyond_hide_distance_ignored() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.watch_from(rig.config.hide_distance + 2.0);

    for _ in 0..10 {
        assert_eq!(rig.tick().mode, BehaviorMode::Wandering);
    }
}

#[test]
fn test_reaction_lasts_exactly_twenty_ticks() {
    let mut rig = Rig::new(fixed_reaction(2.0));
    rig.tick();
    rig.watch_from(3.0);

    assert_eq!(rig.tick().mode, BehaviorMode::ReactingToDetection);

    for tick in 1..20 {
        let out = rig.tick();
        assert_eq!(out.mode, BehaviorMode::ReactingToDetection, "left reaction early at tick {}", tick);
    }

    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Hiding);
    assert!(!rig.nav.stopped);
    assert!((rig.nav.speed - rig.config.base_speed * rig.config.hide_speed_multiplier).abs() < 1e-5);
    assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Hide, .. }));
}

#[test]
fn test_reaction_does_not_touch_navigation_target() {
    let mut rig = Rig::new(fixed_reaction(1.0));
    rig.tick();
    rig.watch_from(3.0);
    rig.tick();

    let calls = rig.nav.set_target_calls;
    for _ in 0..5 {
        assert_eq!(rig.tick().movement, MovementOrder::Suspended);
    }
    assert_eq!(rig.nav.set_target_calls, calls);
}

#[test]
fn test_reaction_turns_toward_observer() {
    let mut rig = Rig::new(fixed_reaction(2.0));
    rig.tick();
    // Стоим спиной к наблюдателю
    rig.transform.look_to(Vec3::Z, Vec3::Y);
    rig.watch_from(3.0);

    for _ in 0..10 {
        rig.tick();
    }

    let facing = rig.transform.forward().as_vec3();
    assert!(facing.dot(Vec3::NEG_Z) > 0.99, "facing {:?}", facing);
}

#[test]
fn test_hiding_returns_to_wandering_when_unobserved() {
    let mut rig = Rig::new(fixed_reaction(0.5));
    rig.tick();
    rig.watch_from(3.0);
    for _ in 0..6 {
        rig.tick();
    }
    assert_eq!(rig.skulker.mode(), BehaviorMode::Hiding);

    // Ещё видят, но дошли → новое укрытие, режим тот же
    rig.nav.remaining = 0.0;
    assert_eq!(rig.tick().mode, BehaviorMode::Hiding);

    rig.look_away_from(3.0);
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Wandering);
    assert_eq!(count(&out.cues, Cue::WanderStart), 1);
    assert_eq!(rig.nav.speed, rig.config.base_speed);
}

#[test]
fn test_shocked_cue_respects_cooldown() {
    let mut rig = Rig::new(fixed_reaction(0.5));
    let mut shocked = 0;
    let mut reactions = 0;

    rig.tick();
    // Две детекции с паузой между ними, всё внутри cooldown'а (5s)
    for phase in 0..2 {
        rig.watch_from(3.0);
        for _ in 0..8 {
            let out = rig.tick();
            shocked += count(&out.cues, Cue::Shocked);
        }
        reactions += 1;
        rig.look_away_from(3.0);
        for _ in 0..3 {
            let out = rig.tick();
            shocked += count(&out.cues, Cue::Shocked);
        }
        assert_ne!(rig.skulker.mode(), BehaviorMode::ReactingToDetection, "phase {}", phase);
    }

    assert_eq!(reactions, 2);
    assert_eq!(shocked, 1);
    assert!(rig.skulker.now() < f64::from(rig.config.shocked_cue_cooldown));
}

#[test]
fn test_shocked_cue_fires_again_after_cooldown() {
    let mut rig = Rig::new(fixed_reaction(0.5));
    rig.tick();

    rig.watch_from(3.0);
    let first = rig.tick();
    assert_eq!(count(&first.cues, Cue::Shocked), 1);

    // Уходим далеко и ждём дольше cooldown'а
    rig.look_away_from(20.0);
    for _ in 0..60 {
        rig.tick();
    }

    rig.watch_from(3.0);
    let mut shocked = 0;
    for _ in 0..2 {
        shocked += count(&rig.tick().cues, Cue::Shocked);
    }
    assert_eq!(shocked, 1);
}

#[test]
fn test_unobserved_nearby_turns_lively() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(3.0);

    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::LivelyNear);
    assert!(out.lively.is_some());
    assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Lively, .. }));
}

#[test]
fn test_lively_waits_for_interval() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(3.0);
    assert!(rig.tick().lively.is_some());

    // lively_interval = 2s → 19 тиков ничего не выбираем
    for _ in 0..19 {
        assert!(rig.tick().lively.is_none());
    }
}

#[test]
fn test_scenario_lively_interval_elapsed_picks_action() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(3.0);
    rig.tick();
    assert_eq!(rig.skulker.mode(), BehaviorMode::LivelyNear);

    let next_now = rig.skulker.now() + f64::from(DT);
    rig.skulker.timers.last_lively_action_time = next_now - f64::from(rig.config.lively_interval) - 0.01;

    let out = rig.tick();
    assert!(out.lively.is_some());
    assert_eq!(rig.skulker.timers.last_lively_action_time, rig.skulker.now());
}

#[test]
fn test_lively_ends_when_observer_leaves() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(3.0);
    rig.tick();
    assert_eq!(rig.skulker.mode(), BehaviorMode::LivelyNear);

    rig.look_away_from(12.0);
    assert_eq!(rig.tick().mode, BehaviorMode::Wandering);
}

#[test]
fn test_lively_near_observed_reacts() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(3.0);
    rig.tick();

    rig.watch_from(3.0);
    assert_eq!(rig.tick().mode, BehaviorMode::ReactingToDetection);
}

#[test]
fn test_no_observer_keeps_wandering_and_clears_cache() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.watch_from(20.0);
    rig.tick();
    assert!(rig.skulker.perception.last_sample_time.is_some());

    rig.observer = None;
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Wandering);
    assert_eq!(rig.skulker.perception.last_sample_time, None);
    assert_eq!(rig.skulker.perception.observation().distance, f32::INFINITY);
}

#[test]
fn test_perception_is_throttled_inside_the_brain() {
    let config = SkulkerConfig {
        sample_interval: 0.5,
        ..SkulkerConfig::default()
    };
    let mut rig = Rig::new(config);
    rig.look_away_from(20.0);
    rig.tick();

    // Наблюдатель резко подошёл и смотрит, но кэш ещё жив
    rig.watch_from(3.0);
    assert_eq!(rig.tick().mode, BehaviorMode::Wandering);
    assert_eq!(rig.skulker.perception.observation().distance, 20.0);

    let mut reacted = false;
    for _ in 0..5 {
        reacted |= rig.tick().mode == BehaviorMode::ReactingToDetection;
    }
    assert!(reacted);
}

#[test]
fn test_moving_flag_follows_navigation_velocity() {
    let mut rig = Rig::new(SkulkerConfig::default());
    assert!(!rig.tick().is_moving);

    rig.nav.velocity = Vec3::new(2.0, 0.0, 0.0);
    let out = rig.tick();
    assert!(out.is_moving);
    assert!(rig.transform.forward().as_vec3().dot(Vec3::X) > 0.0);
}

#[test]
fn test_roam_replans_only_after_arrival_and_interval() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.look_away_from(20.0);
    rig.tick();
    let first = rig.skulker.current_target();

    // Ещё не дошли
    rig.nav.remaining = 5.0;
    for _ in 0..50 {
        rig.tick();
    }
    assert_eq!(rig.skulker.current_target(), first);

    rig.nav.remaining = 0.0;
    rig.tick();
    assert_ne!(rig.skulker.current_target(), first);
}

#[test]
fn test_every_tick_has_exactly_one_mode_and_order() {
    let mut rig = Rig::new(fixed_reaction(0.3));
    for step in 0..200 {
        match step % 40 {
            0 => rig.look_away_from(3.0),
            10 => rig.watch_from(4.0),
            25 => rig.look_away_from(15.0),
            35 => rig.observer = None,
            _ => {}
        }
        let out = rig.tick();
        assert_eq!(out.mode, rig.skulker.mode());
        match out.mode {
            BehaviorMode::ReactingToDetection => assert_eq!(out.movement, MovementOrder::Suspended),
            BehaviorMode::Dead => assert_eq!(out.movement, MovementOrder::Halted),
            _ => assert!(matches!(out.movement, MovementOrder::MoveTo { .. })),
        }
    }
}

#[test]
fn test_death_is_terminal() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.tick();
    rig.skulker.request_kill();

    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Dead);
    assert_eq!(out.movement, MovementOrder::Halted);
    assert_eq!(count(&out.cues, Cue::Death), 1);
    assert_eq!(count(&out.cues, Cue::WanderStop), 1);
    assert!(rig.nav.stopped);
    assert_eq!(rig.skulker.current_target(), None);

    let calls = rig.nav.set_target_calls;
    let mut despawns = 0;
    for step in 0..60 {
        match step % 3 {
            0 => rig.watch_from(2.0),
            1 => rig.look_away_from(3.0),
            _ => rig.skulker.request_kill(),
        }
        let out = rig.tick();
        assert_eq!(out.mode, BehaviorMode::Dead);
        assert!(out.cues.is_empty());
        despawns += out.despawn_due as u32;
    }

    assert_eq!(rig.nav.set_target_calls, calls);
    assert_eq!(despawns, 1);
}

#[test]
fn test_kill_during_reaction_cancels_it() {
    let mut rig = Rig::new(fixed_reaction(2.0));
    rig.tick();
    rig.watch_from(3.0);
    rig.tick();
    assert_eq!(rig.skulker.mode(), BehaviorMode::ReactingToDetection);

    rig.skulker.request_kill();
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Dead);
    // WanderStop уже был при входе в реакцию
    assert_eq!(out.cues, vec![Cue::Death]);

    for _ in 0..40 {
        assert_eq!(rig.tick().mode, BehaviorMode::Dead);
    }
}

#[test]
fn test_despawn_fires_after_delay() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.skulker.request_kill();
    rig.tick();

    // despawn_delay = 3s = 30 тиков
    for _ in 0..29 {
        assert!(!rig.tick().despawn_due);
    }
    assert!(rig.tick().despawn_due);
}

#[test]
fn test_respawn_after_despawn_starts_clean() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.skulker.request_kill();
    rig.tick();
    rig.skulker.on_despawn(&mut rig.nav);
    assert!(!rig.skulker.is_active());
    assert!(rig.nav.stopped);

    rig.skulker.on_spawn(None, Vec3::new(1.0, 0.0, 1.0), &rig.config, &mut rig.nav);
    rig.transform.translation = Vec3::new(1.0, 0.0, 1.0);
    let out = rig.tick();

    assert_eq!(out.mode, BehaviorMode::Wandering);
    assert_eq!(out.cues, vec![Cue::WanderStart]);
    assert!(!rig.nav.stopped);
    assert!(rig.skulker.now() < 0.2);
}

#[test]
fn test_roam_near_obstacle_starts_exploring() {
    let mut rig = Rig::in_room(exploring_config(1.0), Some(box_room()));

    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Exploring);
    assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Explore, .. }));
    assert!(matches!(rig.skulker.state, BehaviorState::Exploring { obstacle: 0, .. }));
}

#[test]
fn test_exploring_ends_at_dwell_deadline() {
    let mut rig = Rig::in_room(exploring_config(1.0), Some(box_room()));
    assert_eq!(rig.tick().mode, BehaviorMode::Exploring);

    // Dwell 1s = 10 тиков после входа
    for tick in 1..10 {
        assert_eq!(rig.tick().mode, BehaviorMode::Exploring, "left early at tick {}", tick);
    }
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::Wandering);
    // roam timer ещё не истёк → цель та же, но уже как roam
    assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Roam, .. }));
}

#[test]
fn test_exploring_unknown_obstacle_falls_back_to_wandering() {
    let mut rig = Rig::in_room(exploring_config(10.0), Some(box_room()));
    rig.tick();

    rig.skulker.state = BehaviorState::Exploring {
        obstacle: 5,
        anchor: Vec3::ZERO,
        until: 1000.0,
    };
    assert_eq!(rig.tick().mode, BehaviorMode::Wandering);
}

#[test]
fn test_exploring_nudges_grow_with_elapsed_time() {
    let config = SkulkerConfig {
        explore_nudge_rate: 100.0,
        explore_nudge_cap: 1.0,
        ..exploring_config(10.0)
    };
    let mut rig = Rig::in_room(config, Some(box_room()));
    rig.tick();
    let BehaviorState::Exploring { anchor, .. } = rig.skulker.state else {
        panic!("expected Exploring, got {:?}", rig.skulker.state);
    };

    // Вероятность упирается в cap = 1 → сдвигаемся каждый тик
    let mut previous = rig.skulker.current_target();
    for _ in 0..10 {
        let out = rig.tick();
        assert_eq!(out.mode, BehaviorMode::Exploring);
        let target = rig.skulker.current_target().expect("target");
        assert_ne!(Some(target), previous);
        assert!(target.distance(anchor) <= rig.config.explore_nudge_radius + 1e-4);
        assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Explore, .. }));
        previous = Some(target);
    }
}

#[test]
fn test_exploring_without_nudge_rate_holds_anchor() {
    let config = SkulkerConfig {
        explore_nudge_rate: 0.0,
        ..exploring_config(10.0)
    };
    let mut rig = Rig::in_room(config, Some(box_room()));
    rig.tick();
    let anchor = rig.skulker.current_target();

    for _ in 0..30 {
        assert_eq!(rig.tick().mode, BehaviorMode::Exploring);
    }
    assert_eq!(rig.skulker.current_target(), anchor);
}

#[test]
fn test_exploring_observer_nearby_turns_lively() {
    let mut rig = Rig::in_room(exploring_config(10.0), Some(box_room()));
    assert_eq!(rig.tick().mode, BehaviorMode::Exploring);

    rig.look_away_from(3.0);
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::LivelyNear);
    assert!(out.lively.is_some());
}

#[test]
fn test_exploring_observed_reacts() {
    let mut rig = Rig::in_room(exploring_config(10.0), Some(box_room()));
    assert_eq!(rig.tick().mode, BehaviorMode::Exploring);

    rig.watch_from(3.0);
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::ReactingToDetection);
    assert_eq!(count(&out.cues, Cue::Shocked), 1);
}

#[test]
fn test_lively_snap_failure_skips_until_next_interval() {
    let mut rig = Rig::new(SkulkerConfig::default());
    rig.tick();
    let target = rig.skulker.current_target();

    rig.nav.reject_snaps = true;
    rig.look_away_from(3.0);
    let out = rig.tick();
    assert_eq!(out.mode, BehaviorMode::LivelyNear);
    assert!(matches!(out.lively, Some(LivelyOutcome::Skipped { .. })));
    assert_eq!(rig.skulker.current_target(), target);
    assert_eq!(rig.skulker.timers.last_lively_action_time, rig.skulker.now());

    // Попытка потрачена: следующая только через lively_interval
    for _ in 0..19 {
        assert!(rig.tick().lively.is_none());
    }
    rig.nav.reject_snaps = false;
    let out = rig.tick();
    assert!(matches!(out.lively, Some(LivelyOutcome::Move { .. })));
    assert_ne!(rig.skulker.current_target(), target);
}

#[test]
fn test_rejected_hiding_spots_retry_at_a_slower_pace() {
    let mut rig = Rig::new(fixed_reaction(0.5));
    rig.tick();
    let target = rig.skulker.current_target();

    rig.nav.reject_snaps = true;
    rig.watch_from(3.0);
    for _ in 0..6 {
        rig.tick();
    }
    assert_eq!(rig.skulker.mode(), BehaviorMode::Hiding);

    // Ещё видят и "дошли": без паузы был бы поиск каждый тик (2 snap'а на поиск)
    let calls_before = rig.nav.snap_calls.get();
    for _ in 0..30 {
        assert_eq!(rig.tick().mode, BehaviorMode::Hiding);
    }
    let searches = (rig.nav.snap_calls.get() - calls_before) / 2;
    assert!((5..=7).contains(&searches), "searches: {}", searches);
    assert_eq!(rig.skulker.current_target(), target);
}

#[test]
fn test_spawn_off_surface_has_no_target_until_roam() {
    let config = SkulkerConfig::default();
    let mut nav = FakeNav {
        reject_snaps: true,
        ..FakeNav::default()
    };
    let mut skulker = Skulker::new(Entity::from_raw(2), 9);
    skulker.on_spawn(None, Vec3::new(50.0, 0.0, 50.0), &config, &mut nav);

    assert_eq!(skulker.current_target(), None);
    assert_eq!(nav.set_target_calls, 0);
    assert!(skulker.is_active());

    let mut rig = Rig {
        skulker,
        config,
        transform: Transform::from_translation(Vec3::new(50.0, 0.0, 50.0)),
        nav,
        observer: None,
    };
    let out = rig.tick();
    assert_eq!(out.movement, MovementOrder::Halted);
    assert_eq!(rig.nav.set_target_calls, 0);

    rig.nav.reject_snaps = false;
    let out = rig.tick();
    assert!(matches!(out.movement, MovementOrder::MoveTo { purpose: TargetPurpose::Roam, .. }));
    assert_eq!(rig.nav.set_target_calls, 1);
}

#[test]
fn test_despawn_deadline_fires_on_a_long_lived_clock() {
    let mut rig = Rig::new(SkulkerConfig::default());
    // ~7 суток непрерывной игры: f32 часы здесь уже не двигаются на 1/60s
    rig.skulker.clock = 600_000.0;
    let delta = 1.0 / 60.0;

    let before = rig.skulker.now();
    for _ in 0..60 {
        rig.tick_with(delta);
    }
    assert!((rig.skulker.now() - before - 1.0).abs() < 1e-3);

    rig.skulker.request_kill();
    assert_eq!(rig.tick_with(delta).mode, BehaviorMode::Dead);

    // despawn_delay = 3s = 180 тиков
    let fired_at = (1..=200).find(|_| rig.tick_with(delta).despawn_due);
    assert!(matches!(fired_at, Some(179..=181)), "fired at {:?}", fired_at);
}
