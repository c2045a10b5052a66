//! Точки расширения: per-actor множители толчка и поиск позиций акторов

use std::collections::HashMap;

use bevy::prelude::*;

/// Стратегия силы толчка для разных типов ударяющих тел
///
/// Дефолт: 1.0 для обоих множителей. Инжектится per-bubble
/// (например, игрок толкает сильнее, чем снаряд).
pub trait PushStrengthModifier: Send + Sync {
    fn vertex_push_multiplier(&self, _actor: Entity) -> f32 {
        1.0
    }

    fn global_push_multiplier(&self, _actor: Entity) -> f32 {
        1.0
    }
}

/// Без модификаций (1.0 / 1.0)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPushModifier;

impl PushStrengthModifier for DefaultPushModifier {}

/// Фиксированные множители для конкретных акторов, остальные: 1.0
#[derive(Debug, Clone, Default)]
pub struct PerActorPushModifier {
    pub vertex: HashMap<Entity, f32>,
    pub global: HashMap<Entity, f32>,
}

impl PushStrengthModifier for PerActorPushModifier {
    fn vertex_push_multiplier(&self, actor: Entity) -> f32 {
        self.vertex.get(&actor).copied().unwrap_or(1.0)
    }

    fn global_push_multiplier(&self, actor: Entity) -> f32 {
        self.global.get(&actor).copied().unwrap_or(1.0)
    }
}

/// Позиция внешнего актора; None: актор больше не существует
pub trait ActorLocator {
    fn actor_position(&self, actor: Entity) -> Option<Vec3>;
}

/// ECS: позиция из GlobalTransform (despawned entity → None)
impl ActorLocator for Query<'_, '_, &GlobalTransform> {
    fn actor_position(&self, actor: Entity) -> Option<Vec3> {
        self.get(actor).ok().map(|transform| transform.translation())
    }
}

/// Headless/тесты: явная таблица позиций
impl ActorLocator for HashMap<Entity, Vec3> {
    fn actor_position(&self, actor: Entity) -> Option<Vec3> {
        self.get(&actor).copied()
    }
}
