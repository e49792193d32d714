//! ECS Components для skulker entity
//!
//! Организация по доменам:
//! - world: геометрия комнаты (RoomBounds, Obstacle, RoomContext)
//! - movement: выход state machine для навигации (MovementOrder, TargetPurpose, AnimationFlags)

pub mod movement;
pub mod world;

pub use movement::*;
pub use world::*;
