//! Collision queries к внешнему окружению
//!
//! Симуляция не знает, как устроен мир, и только задаёт вопросы:
//! - segment cast (continuous collision для каждой вершины)
//! - sphere overlap (поиск тел при лопании)
//!
//! Реализации: `NoCollision` (headless), `RapierCollisionQuery` (bevy_rapier3d).

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, QueryFilter, RapierContext};

/// Результат segment cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    /// Точка контакта
    pub point: Vec3,
    /// Нормаль поверхности (наружу от препятствия)
    pub normal: Vec3,
    /// Во что попали (None: статическая геометрия без entity)
    pub entity: Option<Entity>,
}

pub trait CollisionQuery {
    /// Первое пересечение отрезка `start → end`, исключая `exclude`
    fn cast_segment(&self, start: Vec3, end: Vec3, exclude: Option<Entity>) -> Option<CollisionHit>;

    /// Динамические тела внутри сферы
    fn overlap_sphere(&self, center: Vec3, radius: f32, exclude: Option<Entity>) -> Vec<Entity>;
}

/// Пустой мир: ни одного препятствия
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollision;

impl CollisionQuery for NoCollision {
    fn cast_segment(&self, _start: Vec3, _end: Vec3, _exclude: Option<Entity>) -> Option<CollisionHit> {
        None
    }

    fn overlap_sphere(&self, _center: Vec3, _radius: f32, _exclude: Option<Entity>) -> Vec<Entity> {
        Vec::new()
    }
}

/// Collision queries через Rapier query pipeline
pub struct RapierCollisionQuery<'a> {
    context: RapierContext<'a>,
}

impl<'a> RapierCollisionQuery<'a> {
    pub fn new(context: RapierContext<'a>) -> Self {
        Self { context }
    }
}

impl CollisionQuery for RapierCollisionQuery<'_> {
    fn cast_segment(&self, start: Vec3, end: Vec3, exclude: Option<Entity>) -> Option<CollisionHit> {
        let delta = end - start;
        let length = delta.length();
        if length <= f32::EPSILON {
            return None;
        }

        let mut filter = QueryFilter::default();
        if let Some(entity) = exclude {
            filter = filter.exclude_collider(entity).exclude_rigid_body(entity);
        }

        // Нормализованное направление → time of impact в метрах
        self.context
            .cast_ray_and_get_normal(start, delta / length, length, true, filter)
            .map(|(entity, intersection)| CollisionHit {
                point: intersection.point,
                normal: intersection.normal,
                entity: Some(entity),
            })
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, exclude: Option<Entity>) -> Vec<Entity> {
        let shape = Collider::ball(radius);
        let mut filter = QueryFilter::only_dynamic();
        if let Some(entity) = exclude {
            filter = filter.exclude_collider(entity).exclude_rigid_body(entity);
        }

        let mut hits = Vec::new();
        self.context
            .intersections_with_shape(center, Quat::IDENTITY, &shape, filter, |entity| {
                hits.push(entity);
                true // продолжаем поиск
            });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_collision_never_hits() {
        let world = NoCollision;
        assert!(world.cast_segment(Vec3::ZERO, Vec3::X * 100.0, None).is_none());
        assert!(world.overlap_sphere(Vec3::ZERO, 1000.0, None).is_empty());
    }
}
