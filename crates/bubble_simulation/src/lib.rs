//! Bubble Simulation Core
//!
//! Soft-body пузыри на Bevy 0.16: mass-spring модель на сферической сетке.
//!
//! Слои:
//! - mesh: геометрия (икосаэдр/октаэдр + subdivision, adjacency)
//! - bubble: физика пузыря (силы, интегратор, толчки) + ECS plugin
//! - logger: глобальный logger (движок подставляет свой LogPrinter)
//!
//! Рендер и коллизии снаружи: симуляция отдаёт снапшоты и задаёт вопросы
//! через `CollisionQuery` (Rapier или headless заглушка).

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod bubble;
pub mod logger;
pub mod math;
pub mod mesh;

// Re-export для удобства
pub use bubble::{
    spawn_bubble, spawn_bubble_with_modifiers, Bubble, BubbleConfig, BubbleHit, BubblePlugin, BubblePopped,
    ConfigError, GrowBubble, PopBubble, SoftBody,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use mesh::{BasePolyhedron, MeshTopology, SphereMesh};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .init_resource::<DeterministicRng>()
            .add_plugins(BubblePlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Каждый пузырь получает собственный seed отсюда при спавне,
/// дальше живёт со своим RNG (порядок тиков других пузырей не влияет).
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed для нового per-body RNG
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen::<u64>()
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// `SimulationPlugin` не добавляется: тесты решают сами, что им нужно.
/// DeterministicRng уже вставлен, поэтому `init_resource` в plugin его не перетрёт.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot всех пузырей для сравнения детерминизма
///
/// Побитовые позиции вершин: любое расхождение float даёт другой snapshot.
pub fn bubble_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &Bubble)>();
    let mut bubbles: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    bubbles.sort_by_key(|(entity, _)| entity.index());

    for (entity, bubble) in bubbles {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        for position in bubble.body.state().positions() {
            for component in position.to_array() {
                snapshot.extend_from_slice(&component.to_bits().to_le_bytes());
            }
        }
    }

    snapshot
}
