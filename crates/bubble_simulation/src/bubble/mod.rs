//! Bubble: soft-body пузырь (mass-spring модель на сферической сетке)
//!
//! Компоненты (снизу вверх):
//! - config: параметры + валидация
//! - state: позиции/скорости/rest lengths/центр масс
//! - noise: per-body RNG + big noise
//! - forces: force pass (давление, пружины, шум, глобальная сила, толчки)
//! - integrator: скорости/позиции + collision response
//! - impact: длящиеся толчки от внешних акторов
//! - collision / hooks: внешние интерфейсы (queries, модификаторы, позиции акторов)
//! - body: SoftBody = всё вместе, порядок тика
//! - systems: bevy plugin + события

pub mod body;
pub mod collision;
pub mod config;
pub mod forces;
pub mod hooks;
pub mod impact;
pub mod integrator;
pub mod noise;
pub mod render;
pub mod state;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod body_tests;

pub use body::{BubbleLifecycle, HitNotification, PopImpulse, PopOutcome, SoftBody, TickReport};
pub use collision::{CollisionHit, CollisionQuery, NoCollision, RapierCollisionQuery};
pub use config::{BubbleConfig, ConfigError, MAX_TIME_STEP};
pub use hooks::{ActorLocator, DefaultPushModifier, PerActorPushModifier, PushStrengthModifier};
pub use impact::{ImpactContribution, ImpactRecord, ImpactTracker};
pub use noise::{BubbleRng, NoiseState};
pub use render::{BubbleTint, RenderSnapshot};
pub use state::SoftBodyState;
pub use systems::{
    queue_pop_impulse, spawn_bubble, spawn_bubble_with_modifiers, Bubble, BubbleHit, BubblePlugin, BubblePopped, GrowBubble,
    PopBubble,
};
