//! Shared planar math helpers (XZ plane, Y = up).
//!
//! Используются selector'ами (hiding, lively, roam): все смещения
//! планарные, высоту оставляем как есть и отдаём snap'у навигации.

use bevy::prelude::*;
use rand::Rng;

/// Допуск при сравнении накопленных таймеров с дедлайнами (f32 drift)
pub const TIMER_EPSILON: f32 = 1e-4;

/// Проекция на плоскость XZ
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Нормализованное планарное направление (или ZERO для вырожденного вектора)
pub fn planar_direction(v: Vec3) -> Vec3 {
    planar(v).normalize_or_zero()
}

/// Перпендикуляр в плоскости XZ (поворот на +90° вокруг Y)
pub fn perpendicular(v: Vec3) -> Vec3 {
    Vec3::new(-v.z, 0.0, v.x)
}

/// Планарная дистанция (игнорируем высоту)
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a - b).length()
}

/// Равномерная точка в диске радиуса `radius` (XZ, y = 0)
pub fn random_in_disk<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    // sqrt → равномерная плотность по площади
    let distance = radius * rng.gen::<f32>().sqrt();
    Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}

/// Случайное направление в плоскости XZ
pub fn random_planar_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// `gen_range` без паники на вырожденном диапазоне (min == max)
pub fn range_or_min<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Rotation, при которой `forward()` смотрит вдоль `direction` (в плоскости XZ)
pub fn facing_rotation(direction: Vec3) -> Option<Quat> {
    let dir = planar_direction(direction);
    if dir == Vec3::ZERO {
        return None;
    }
    Some(Transform::IDENTITY.looking_to(dir, Vec3::Y).rotation)
}
