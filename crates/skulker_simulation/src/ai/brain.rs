//! Behavior state machine skulker'а.
//!
//! Один `advance(delta)` на entity на тик. Порядок внутри тика:
//! perception sample → transition → planner (ровно один) → output.
//!
//! Переходы (первый совпавший выигрывает):
//! 1. kill signal → Dead (terminal)
//! 2. Wandering/Exploring/LivelyNear → ReactingToDetection (видят и близко)
//! 3. ReactingToDetection → Hiding по истечении duration
//! 4. Hiding → Wandering когда перестали видеть
//! 5. Wandering/Exploring → LivelyNear (близко и не видят)
//! 6. LivelyNear → Wandering (наблюдатель далеко)
//! 7. иначе Wandering/Exploring через roam planner
//!
//! Multi-tick последовательности (реакция, despawn после смерти): дедлайны
//! в state, проверяем каждый тик. Никаких корутин.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use super::components::{BehaviorMode, BehaviorState, BehaviorTimers};
use super::events::Cue;
use super::hiding::{select_hide_target, HideParams};
use super::lively::{plan_lively_action, LivelyOutcome};
use super::perception::{Observation, PerceptionCache, SampleInput};
use super::roam;
use crate::collaborators::{LineOfSightTracer, NavigationAgent, ObserverPose};
use crate::components::{MovementOrder, RoomContext, TargetPurpose};
use crate::config::SkulkerConfig;
use crate::logger;
pub use crate::shared::TIMER_EPSILON;
use crate::shared::{facing_rotation, planar, range_or_min};

/// Скорость (м/с), ниже которой считаем что стоим
const MOVING_SPEED_THRESHOLD: f32 = 0.1;

/// Пауза перед повторным поиском укрытия, если все варианты отвергнуты (секунды)
const HIDE_RETRY_INTERVAL: f64 = 0.5;

/// Коллабораторы для одного тика
pub struct TickContext<'a> {
    pub observer: Option<ObserverPose>,
    pub tracer: &'a dyn LineOfSightTracer,
    pub navigation: &'a mut dyn NavigationAgent,
}

/// Выход одного тика
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub mode: BehaviorMode,
    pub movement: MovementOrder,
    pub cues: Vec<Cue>,
    pub is_moving: bool,
    /// Lively action, выбранный в этом тике (если был)
    pub lively: Option<LivelyOutcome>,
    /// true ровно один раз: despawn delay после смерти истёк
    pub despawn_due: bool,
}

impl TickOutput {
    fn new(mode: BehaviorMode) -> Self {
        Self {
            mode,
            movement: MovementOrder::Halted,
            cues: Vec::new(),
            is_moving: false,
            lively: None,
            despawn_due: false,
        }
    }
}

/// Мозг skulker'а: state, perception cache, таймеры, room context, RNG
///
/// Никакого shared mutable state между entity: у каждого свой RNG stream,
/// room context: read-only `Arc`.
#[derive(Component, Debug, Clone)]
pub struct Skulker {
    entity: Entity,
    pub state: BehaviorState,
    pub perception: PerceptionCache,
    pub timers: BehaviorTimers,
    room: Option<Arc<RoomContext>>,
    rng: ChaCha8Rng,
    /// Локальные часы (сумма delta с момента spawn'а), f64 как у bevy `Time`
    pub(crate) clock: f64,
    current_target: Option<(Vec3, TargetPurpose)>,
    kill_requested: bool,
    /// Раньше этого момента не ищем укрытие заново (после неудачного поиска)
    hide_retry_at: f64,
    wander_cue_active: bool,
    active: bool,
    pending_cues: Vec<Cue>,
}

impl Skulker {
    pub fn new(entity: Entity, seed: u64) -> Self {
        Self {
            entity,
            state: BehaviorState::default(),
            perception: PerceptionCache::default(),
            timers: BehaviorTimers::default(),
            room: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: 0.0,
            current_target: None,
            kill_requested: false,
            hide_retry_at: f64::NEG_INFINITY,
            wander_cue_active: false,
            active: false,
            pending_cues: Vec::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn mode(&self) -> BehaviorMode {
        self.state.mode()
    }

    /// Текущее время на часах skulker'а
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn room(&self) -> Option<&RoomContext> {
        self.room.as_deref()
    }

    pub fn current_target(&self) -> Option<Vec3> {
        self.current_target.map(|(target, _)| target)
    }

    /// Между `on_spawn` и `on_despawn`
    pub fn is_active(&self) -> bool {
        self.active
    }

    // ========================================================================
    // Lifecycle / reset
    // ========================================================================

    /// Spawn (первый или из pool): сбросить всё и занять room context
    pub fn on_spawn(
        &mut self,
        room: Option<Arc<RoomContext>>,
        position: Vec3,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
    ) {
        self.state = BehaviorState::Wandering;
        self.perception.invalidate();
        self.timers = BehaviorTimers {
            // Первый тик сразу выбирает roam цель
            roam_timer: config.roam_interval,
            ..BehaviorTimers::default()
        };
        self.room = room;
        self.clock = 0.0;
        self.kill_requested = false;
        self.hide_retry_at = f64::NEG_INFINITY;
        self.pending_cues.clear();
        self.active = true;

        navigation.set_speed(config.base_speed);
        navigation.set_stopped(false);

        // Стартовая цель: там, где стоим. Без snap'а цели нет до первого roam тика
        self.current_target = navigation
            .snap_to_surface(position, config.roam_snap_radius)
            .map(|start| (start, TargetPurpose::Roam));
        match self.current_target {
            Some((start, _)) => navigation.set_target(start),
            None => logger::log_warning(&format!(
                "Skulker {:?}: spawn point {:?} is off the navigable surface, waiting for roam target",
                self.entity, position
            )),
        }

        self.wander_cue_active = true;
        self.pending_cues.push(Cue::WanderStart);

        logger::log(&format!(
            "Skulker {:?} spawned at {:?} (bounds: {}, obstacles: {})",
            self.entity,
            position,
            self.room.as_ref().is_some_and(|room| room.bounds.is_some()),
            self.room.as_ref().map_or(0, |room| room.obstacles.len()),
        ));
    }

    /// Despawn (смерть + delay или возврат в pool): отпустить room context
    pub fn on_despawn(&mut self, navigation: &mut dyn NavigationAgent) {
        navigation.set_stopped(true);
        self.room = None;
        self.current_target = None;
        self.perception.invalidate();
        self.pending_cues.clear();
        self.kill_requested = false;
        self.active = false;
    }

    /// Внешний kill signal (обработается первым правилом следующего тика)
    pub fn request_kill(&mut self) {
        if !self.state.is_dead() {
            self.kill_requested = true;
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    pub fn advance(
        &mut self,
        delta: f32,
        config: &SkulkerConfig,
        transform: &mut Transform,
        ctx: &mut TickContext<'_>,
    ) -> TickOutput {
        let mut out = TickOutput::new(self.mode());
        out.cues.append(&mut self.pending_cues);

        if !self.active {
            return out;
        }

        let delta = delta.max(0.0);
        self.clock += f64::from(delta);
        let now = self.clock;

        // Dead: только ждём despawn deadline
        if let BehaviorState::Dead {
            despawn_at,
            despawn_reported,
        } = &mut self.state
        {
            if !*despawn_reported && now + f64::from(TIMER_EPSILON) >= *despawn_at {
                *despawn_reported = true;
                out.despawn_due = true;
            }
            return out;
        }

        // 1. Any → Dead
        if self.kill_requested {
            self.enter_dead(now, config, ctx.navigation, &mut out);
            out.mode = self.mode();
            return out;
        }

        self.timers.advance(delta);
        if matches!(self.state, BehaviorState::ReactingToDetection { .. }) {
            self.timers.detection_reaction_elapsed += delta;
        }

        let observation = self.perception.sample(SampleInput {
            entity: self.entity,
            entity_position: transform.translation,
            observer: ctx.observer.as_ref(),
            tracer: ctx.tracer,
            half_fov_radians: config.half_fov_radians(),
            sample_interval: config.sample_interval,
            now,
        });

        self.evaluate(now, observation, config, transform.translation, ctx, &mut out);
        self.emit_movement(config, transform, delta, ctx, &mut out);

        out.mode = self.mode();
        out
    }

    /// Transition + planner для текущего тика
    fn evaluate(
        &mut self,
        now: f64,
        observation: Observation,
        config: &SkulkerConfig,
        position: Vec3,
        ctx: &mut TickContext<'_>,
        out: &mut TickOutput,
    ) {
        let observer_pos = ctx.observer.map(|pose| pose.position);

        match self.state.clone() {
            BehaviorState::Dead { .. } => {}

            BehaviorState::ReactingToDetection { duration } => {
                if self.timers.detection_reaction_elapsed + TIMER_EPSILON >= duration {
                    self.enter_hiding(now, position, observer_pos, config, ctx.navigation);
                }
            }

            BehaviorState::Hiding => {
                if !observation.is_observed {
                    self.enter_wandering(config, ctx.navigation, out);
                    self.roam_tick(now, position, observer_pos, config, ctx.navigation);
                } else if ctx.navigation.remaining_distance() <= config.arrival_threshold && now >= self.hide_retry_at {
                    // Дошли, а нас всё ещё видят: ищем новое укрытие
                    self.plan_hide(now, position, observer_pos, config, ctx.navigation);
                }
            }

            BehaviorState::Wandering | BehaviorState::Exploring { .. } | BehaviorState::LivelyNear => {
                let is_lively = matches!(self.state, BehaviorState::LivelyNear);

                if observation.is_observed && observation.distance <= config.hide_distance {
                    self.enter_reacting(now, observation, config, ctx.navigation, out);
                } else if is_lively {
                    if observation.distance > config.detection_range {
                        self.enter_wandering(config, ctx.navigation, out);
                        self.roam_tick(now, position, observer_pos, config, ctx.navigation);
                    } else {
                        self.lively_tick(now, position, observer_pos, config, ctx.navigation, out);
                    }
                } else if !observation.is_observed && observation.distance <= config.detection_range {
                    logger::log(&format!(
                        "Skulker {:?} {:?} → LivelyNear (distance {:.1})",
                        self.entity,
                        self.mode(),
                        observation.distance
                    ));
                    self.state = BehaviorState::LivelyNear;
                    self.lively_tick(now, position, observer_pos, config, ctx.navigation, out);
                } else if let BehaviorState::Exploring { obstacle, anchor, until } = self.state {
                    self.explore_tick(now, obstacle, anchor, until, position, observer_pos, config, ctx.navigation);
                } else {
                    self.roam_tick(now, position, observer_pos, config, ctx.navigation);
                }
            }
        }
    }

    // ========================================================================
    // Entry actions
    // ========================================================================

    fn enter_reacting(
        &mut self,
        now: f64,
        observation: Observation,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
        out: &mut TickOutput,
    ) {
        let duration = range_or_min(&mut self.rng, config.reaction_duration_min, config.reaction_duration_max);
        logger::log(&format!(
            "Skulker {:?} {:?} → ReactingToDetection (distance {:.1}, {:.2}s)",
            self.entity,
            self.mode(),
            observation.distance,
            duration
        ));

        self.state = BehaviorState::ReactingToDetection { duration };
        self.timers.detection_reaction_elapsed = 0.0;
        navigation.set_stopped(true);

        self.stop_wander_cue(out);
        if now - self.timers.last_shocked_cue_time >= f64::from(config.shocked_cue_cooldown) {
            self.timers.last_shocked_cue_time = now;
            out.cues.push(Cue::Shocked);
        }
    }

    fn enter_hiding(
        &mut self,
        now: f64,
        position: Vec3,
        observer_pos: Option<Vec3>,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
    ) {
        logger::log(&format!("Skulker {:?} ReactingToDetection → Hiding", self.entity));
        self.state = BehaviorState::Hiding;
        self.timers.detection_reaction_elapsed = 0.0;
        navigation.set_stopped(false);
        navigation.set_speed(config.base_speed * config.hide_speed_multiplier);
        if !self.plan_hide(now, position, observer_pos, config, navigation) {
            logger::log_warning(&format!(
                "Skulker {:?}: no reachable hiding spot, keeping current target",
                self.entity
            ));
        }
    }

    fn enter_wandering(&mut self, config: &SkulkerConfig, navigation: &mut dyn NavigationAgent, out: &mut TickOutput) {
        logger::log(&format!("Skulker {:?} {:?} → Wandering", self.entity, self.mode()));
        self.state = BehaviorState::Wandering;
        navigation.set_stopped(false);
        navigation.set_speed(config.base_speed);

        if let Some((target, _)) = self.current_target {
            self.current_target = Some((target, TargetPurpose::Roam));
        }
        if !self.wander_cue_active {
            self.wander_cue_active = true;
            out.cues.push(Cue::WanderStart);
        }
    }

    fn enter_dead(&mut self, now: f64, config: &SkulkerConfig, navigation: &mut dyn NavigationAgent, out: &mut TickOutput) {
        logger::log_info(&format!("Skulker {:?} {:?} → Dead", self.entity, self.mode()));

        // Отменяем всё: цель, реакцию, исследование, отложенные действия
        self.state = BehaviorState::Dead {
            despawn_at: now + f64::from(config.despawn_delay),
            despawn_reported: false,
        };
        self.kill_requested = false;
        self.current_target = None;
        self.timers.detection_reaction_elapsed = 0.0;
        self.perception.invalidate();
        navigation.set_stopped(true);

        self.stop_wander_cue(out);
        out.cues.push(Cue::Death);
        out.movement = MovementOrder::Halted;
        out.is_moving = false;
    }

    fn stop_wander_cue(&mut self, out: &mut TickOutput) {
        if self.wander_cue_active {
            self.wander_cue_active = false;
            out.cues.push(Cue::WanderStop);
        }
    }

    // ========================================================================
    // Planners
    // ========================================================================

    /// false → укрытие не найдено, текущая цель остаётся
    fn plan_hide(
        &mut self,
        now: f64,
        position: Vec3,
        observer_pos: Option<Vec3>,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
    ) -> bool {
        let Some(observer_pos) = observer_pos else {
            return false;
        };
        let obstacles = self.room.as_ref().map_or(&[][..], |room| room.obstacles.as_slice());

        match select_hide_target(
            position,
            observer_pos,
            obstacles,
            &HideParams::from_config(config),
            &*navigation,
            &mut self.rng,
        ) {
            Some(plan) => {
                logger::log(&format!(
                    "Skulker {:?} hide target {:?} via {:?}",
                    self.entity, plan.target, plan.source
                ));
                self.current_target = Some((plan.target, TargetPurpose::Hide));
                self.hide_retry_at = f64::NEG_INFINITY;
                true
            }
            None => {
                // Degraded: все варианты отвергнуты → оставляем текущую цель
                self.hide_retry_at = now + HIDE_RETRY_INTERVAL;
                logger::log(&format!(
                    "Skulker {:?}: hide candidates rejected, retry in {:.1}s",
                    self.entity, HIDE_RETRY_INTERVAL
                ));
                false
            }
        }
    }

    fn lively_tick(
        &mut self,
        now: f64,
        position: Vec3,
        observer_pos: Option<Vec3>,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
        out: &mut TickOutput,
    ) {
        if now - self.timers.last_lively_action_time < f64::from(config.lively_interval) {
            return;
        }
        let Some(observer_pos) = observer_pos else {
            return;
        };
        self.timers.last_lively_action_time = now;

        let outcome = plan_lively_action(position, observer_pos, config, &*navigation, &mut self.rng);
        match outcome {
            LivelyOutcome::Move { action, target } => {
                logger::log(&format!("Skulker {:?} lively {:?} → {:?}", self.entity, action, target));
                self.current_target = Some((target, TargetPurpose::Lively));
            }
            LivelyOutcome::Skipped { action } => {
                logger::log(&format!(
                    "Skulker {:?} lively {:?} skipped (snap failed)",
                    self.entity, action
                ));
            }
        }
        out.lively = Some(outcome);
    }

    fn roam_tick(
        &mut self,
        now: f64,
        position: Vec3,
        observer_pos: Option<Vec3>,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
    ) {
        if !roam::should_replan(navigation.remaining_distance(), self.timers.roam_timer, config) {
            return;
        }

        let Some(target) = roam::plan_roam_target(
            position,
            self.room.as_deref(),
            observer_pos,
            config,
            &*navigation,
            &mut self.rng,
        ) else {
            logger::log(&format!("Skulker {:?}: roam target rejected, keeping current", self.entity));
            return;
        };
        self.timers.roam_timer = 0.0;

        let interest = self
            .room
            .as_ref()
            .and_then(|room| roam::obstacle_of_interest(target, &room.obstacles, config.explore_interest_radius));

        if let Some(obstacle) = interest {
            if self.rng.gen::<f32>() < config.explore_probability {
                let until = now + f64::from(roam::explore_duration(config, &mut self.rng));
                logger::log(&format!(
                    "Skulker {:?} Wandering → Exploring obstacle #{} until {:.2}",
                    self.entity, obstacle, until
                ));
                self.state = BehaviorState::Exploring {
                    obstacle,
                    anchor: target,
                    until,
                };
                self.timers.exploration_timer = 0.0;
                self.current_target = Some((target, TargetPurpose::Explore));
                return;
            }
        }

        self.current_target = Some((target, TargetPurpose::Roam));
    }

    #[allow(clippy::too_many_arguments)]
    fn explore_tick(
        &mut self,
        now: f64,
        obstacle: usize,
        anchor: Vec3,
        until: f64,
        position: Vec3,
        observer_pos: Option<Vec3>,
        config: &SkulkerConfig,
        navigation: &mut dyn NavigationAgent,
    ) {
        let obstacle_known = self
            .room
            .as_ref()
            .is_some_and(|room| room.obstacles.get(obstacle).is_some());

        if now + f64::from(TIMER_EPSILON) >= until || !obstacle_known {
            logger::log(&format!("Skulker {:?} Exploring → Wandering", self.entity));
            self.state = BehaviorState::Wandering;
            if let Some((target, _)) = self.current_target {
                self.current_target = Some((target, TargetPurpose::Roam));
            }
            self.roam_tick(now, position, observer_pos, config, navigation);
            return;
        }

        let chance = roam::nudge_probability(self.timers.exploration_timer, config);
        if self.rng.gen::<f32>() >= chance {
            return;
        }

        let candidate = roam::explore_nudge_candidate(anchor, config, &mut self.rng);
        if let Some(target) = navigation.snap_to_surface(candidate, config.roam_snap_radius) {
            self.timers.exploration_timer = 0.0;
            self.current_target = Some((target, TargetPurpose::Explore));
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Ровно одна команда навигации + ориентация + animation flag
    fn emit_movement(
        &mut self,
        config: &SkulkerConfig,
        transform: &mut Transform,
        delta: f32,
        ctx: &mut TickContext<'_>,
        out: &mut TickOutput,
    ) {
        match self.state {
            BehaviorState::Dead { .. } => {
                out.movement = MovementOrder::Halted;
                out.is_moving = false;
            }

            BehaviorState::ReactingToDetection { .. } => {
                out.movement = MovementOrder::Suspended;
                out.is_moving = false;
                if let Some(observer) = ctx.observer {
                    let max_turn = config.reaction_turn_rate_degrees.to_radians() * delta;
                    turn_towards(transform, observer.position - transform.translation, max_turn);
                }
            }

            _ => {
                out.movement = match self.current_target {
                    Some((target, purpose)) => {
                        ctx.navigation.set_target(target);
                        MovementOrder::MoveTo { target, purpose }
                    }
                    None => MovementOrder::Halted,
                };

                let velocity = planar(ctx.navigation.desired_velocity());
                out.is_moving = velocity.length() > MOVING_SPEED_THRESHOLD;
                if out.is_moving {
                    let max_turn = config.movement_turn_rate_degrees.to_radians() * delta;
                    turn_towards(transform, velocity, max_turn);
                }
            }
        }
    }
}

/// Плавный поворот к направлению (не больше `max_radians` за тик)
fn turn_towards(transform: &mut Transform, direction: Vec3, max_radians: f32) {
    if let Some(target) = facing_rotation(direction) {
        transform.rotation = transform.rotation.rotate_towards(target, max_radians);
    }
}
