//! ECS слой пузырей (bevy)
//!
//! Внешний мир общается с пузырями только через события:
//! - BubbleHit  → толчок (notifier движка: грань/точка/нормаль/направление)
//! - GrowBubble → рост радиуса
//! - PopBubble  → лопание (обрабатывается ПОСЛЕ тика, на границе)
//! - BubblePopped ← результат лопания (для VFX/звука в движке)
//!
//! Collision queries: Rapier если есть контекст, иначе NoCollision (headless).

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalImpulse, ReadRapierContext};

use super::body::{HitNotification, SoftBody};
use super::collision::{CollisionQuery, NoCollision, RapierCollisionQuery};
use super::config::{BubbleConfig, ConfigError};
use super::hooks::PushStrengthModifier;
use crate::logger::{log_info, log_warning};
use crate::DeterministicRng;

/// Пузырь на сцене. Вершины хранятся в world space;
/// Transform синхронизируется с центром масс после каждого тика.
#[derive(Component, Debug)]
pub struct Bubble {
    pub body: SoftBody,
}

/// Событие: внешнее тело ударило пузырь
#[derive(Event, Debug, Clone, Copy)]
pub struct BubbleHit {
    pub bubble: Entity,
    pub actor: Entity,
    pub face: Option<usize>,
    pub point: Vec3,
    pub normal: Vec3,
    pub direction: Vec3,
}

/// Событие: увеличить радиус пузыря
#[derive(Event, Debug, Clone, Copy)]
pub struct GrowBubble {
    pub bubble: Entity,
    pub amount: f32,
}

/// Событие: лопнуть пузырь
#[derive(Event, Debug, Clone, Copy)]
pub struct PopBubble {
    pub bubble: Entity,
}

/// Событие: пузырь лопнул (entity уже despawned)
#[derive(Event, Debug, Clone, Copy)]
pub struct BubblePopped {
    pub bubble: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub strength: f32,
    pub affected_bodies: usize,
}

/// Bubble Plugin
///
/// Порядок выполнения (FixedUpdate, chain):
/// 1. apply_bubble_growth: рост (one-shot мутация параметров)
/// 2. apply_bubble_hits: новые толчки
/// 3. tick_bubbles: основной pipeline
/// 4. pop_bubbles: лопание на границе тика
pub struct BubblePlugin;

impl Plugin for BubblePlugin {
    fn build(&self, app: &mut App) {
        use bevy_rapier3d::plugin::PhysicsSet;

        app.add_event::<BubbleHit>()
            .add_event::<GrowBubble>()
            .add_event::<PopBubble>()
            .add_event::<BubblePopped>();

        app.add_systems(
            FixedUpdate,
            (apply_bubble_growth, apply_bubble_hits, tick_bubbles, pop_bubbles)
                .chain()
                .before(PhysicsSet::SyncBackend), // До rapier physics step
        );
    }
}

/// Spawn helper: пузырь с per-body seed из мирового DeterministicRng
pub fn spawn_bubble(
    commands: &mut Commands,
    world_rng: &mut DeterministicRng,
    config: BubbleConfig,
    position: Vec3,
) -> Result<Entity, ConfigError> {
    spawn_bubble_with_modifiers(commands, world_rng, config, position, None)
}

pub fn spawn_bubble_with_modifiers(
    commands: &mut Commands,
    world_rng: &mut DeterministicRng,
    config: BubbleConfig,
    position: Vec3,
    modifiers: Option<Box<dyn PushStrengthModifier>>,
) -> Result<Entity, ConfigError> {
    let seed = world_rng.next_seed();
    let mut body = SoftBody::new(config, position, seed)?;
    if let Some(modifiers) = modifiers {
        body = body.with_modifiers(modifiers);
    }

    let mut entity_commands = commands.spawn(Transform::from_translation(position));
    let entity = entity_commands.id();
    body.set_entity(entity);

    log_info(&format!(
        "🫧 Spawned bubble {:?} at {:?} ({} vertices, seed {})",
        entity,
        position,
        body.state().vertex_count(),
        seed
    ));

    entity_commands.insert(Bubble { body });
    Ok(entity)
}

/// Система: рост пузырей
pub fn apply_bubble_growth(mut grow_events: EventReader<GrowBubble>, mut bubbles: Query<&mut Bubble>) {
    for event in grow_events.read() {
        if let Ok(mut bubble) = bubbles.get_mut(event.bubble) {
            bubble.body.grow(event.amount);
        }
    }
}

/// Система: толчки от столкновений
pub fn apply_bubble_hits(
    mut hit_events: EventReader<BubbleHit>,
    mut bubbles: Query<&mut Bubble>,
    actors: Query<&GlobalTransform>,
) {
    for event in hit_events.read() {
        let Ok(mut bubble) = bubbles.get_mut(event.bubble) else {
            log_warning(&format!("BubbleHit for missing bubble {:?}", event.bubble));
            continue;
        };

        bubble.body.on_hit(
            &HitNotification {
                actor: event.actor,
                face: event.face,
                point: event.point,
                normal: event.normal,
                direction: event.direction,
            },
            &actors,
        );
    }
}

/// Система: основной тик всех пузырей
///
/// Пузыри независимы; обходим последовательно.
pub fn tick_bubbles(
    time: Res<Time<Fixed>>,
    rapier_context: ReadRapierContext,
    actors: Query<&GlobalTransform>,
    mut bubbles: Query<(&mut Bubble, &mut Transform)>,
) {
    let delta = time.delta_secs();
    let rapier_query = rapier_context.single().ok().map(RapierCollisionQuery::new);
    let collision: &dyn CollisionQuery = match rapier_query.as_ref() {
        Some(query) => query,
        None => &NoCollision,
    };

    for (mut bubble, mut transform) in bubbles.iter_mut() {
        bubble.body.tick(delta, collision, &actors);
        transform.translation = bubble.body.state().center_of_mass();
    }
}

/// Добавляет импульс к уже поставленному в очередь ExternalImpulse (не перетирает)
pub fn queue_pop_impulse(commands: &mut Commands, entity: Entity, impulse: Vec3) {
    let Ok(mut entity_commands) = commands.get_entity(entity) else {
        return;
    };
    entity_commands
        .entry::<ExternalImpulse>()
        .and_modify(move |mut existing| existing.impulse += impulse)
        .or_insert(ExternalImpulse {
            impulse,
            torque_impulse: Vec3::ZERO,
        });
}

/// Система: лопание пузырей
///
/// Импульсы применяются через Rapier ExternalImpulse, entity пузыря удаляется.
pub fn pop_bubbles(
    mut commands: Commands,
    mut pop_events: EventReader<PopBubble>,
    mut popped_events: EventWriter<BubblePopped>,
    rapier_context: ReadRapierContext,
    actors: Query<&GlobalTransform>,
    mut bubbles: Query<&mut Bubble>,
) {
    let rapier_query = rapier_context.single().ok().map(RapierCollisionQuery::new);
    let collision: &dyn CollisionQuery = match rapier_query.as_ref() {
        Some(query) => query,
        None => &NoCollision,
    };

    for event in pop_events.read() {
        let Ok(mut bubble) = bubbles.get_mut(event.bubble) else {
            continue;
        };
        let Some(outcome) = bubble.body.pop(collision, &actors) else {
            continue;
        };

        for impulse in &outcome.impulses {
            queue_pop_impulse(&mut commands, impulse.entity, impulse.impulse);
        }

        commands.entity(event.bubble).despawn();

        popped_events.write(BubblePopped {
            bubble: event.bubble,
            center: outcome.center,
            radius: outcome.radius,
            strength: outcome.strength,
            affected_bodies: outcome.impulses.len(),
        });
    }
}
