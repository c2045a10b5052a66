//! Тестовые хелперы: простые препятствия и локаторы

use std::cell::Cell;
use std::collections::HashMap;

use bevy::prelude::*;

use super::body::SoftBody;
use super::collision::{CollisionHit, CollisionQuery};
use super::config::BubbleConfig;
use crate::mesh::BasePolyhedron;

/// Бесконечная плоскость: препятствие с нормалью `normal` через `point`
pub struct PlaneObstacle {
    pub point: Vec3,
    pub normal: Vec3,
    pub entity: Option<Entity>,
    pub queries: Cell<usize>,
}

impl PlaneObstacle {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            entity: None,
            queries: Cell::new(0),
        }
    }
}

impl CollisionQuery for PlaneObstacle {
    fn cast_segment(&self, start: Vec3, end: Vec3, _exclude: Option<Entity>) -> Option<CollisionHit> {
        self.queries.set(self.queries.get() + 1);
        let start_side = (start - self.point).dot(self.normal);
        let end_side = (end - self.point).dot(self.normal);
        if start_side >= 0.0 && end_side < 0.0 {
            let t = start_side / (start_side - end_side);
            Some(CollisionHit {
                point: start + (end - start) * t,
                normal: self.normal,
                entity: self.entity,
            })
        } else {
            None
        }
    }

    fn overlap_sphere(&self, _center: Vec3, _radius: f32, _exclude: Option<Entity>) -> Vec<Entity> {
        Vec::new()
    }
}

/// Фиксированный список тел для overlap (pop тесты)
pub struct FixedOverlap(pub Vec<Entity>);

impl CollisionQuery for FixedOverlap {
    fn cast_segment(&self, _start: Vec3, _end: Vec3, _exclude: Option<Entity>) -> Option<CollisionHit> {
        None
    }

    fn overlap_sphere(&self, _center: Vec3, _radius: f32, exclude: Option<Entity>) -> Vec<Entity> {
        self.0.iter().copied().filter(|e| Some(*e) != exclude).collect()
    }
}

pub fn actor(index: u32) -> Entity {
    Entity::from_raw(index)
}

pub fn locator(entries: &[(Entity, Vec3)]) -> HashMap<Entity, Vec3> {
    entries.iter().copied().collect()
}

/// Маленький тихий пузырь (без давления и шума)
pub fn quiet_body(radius: f32, subdivisions: u32) -> SoftBody {
    let config = BubbleConfig {
        radius,
        subdivisions,
        base: BasePolyhedron::Icosahedron,
        ..BubbleConfig::quiet()
    };
    SoftBody::new(config, Vec3::ZERO, 42).unwrap_or_else(|e| panic!("invalid test config: {}", e))
}
