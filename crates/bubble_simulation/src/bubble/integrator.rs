//! Integrator: semi-implicit Euler + damping + continuous collision
//!
//! Write pass после force pass:
//! 1. v += F·dt (масса = 1, см. ниже)
//! 2. segment cast p → p + v·dt (v ещё без затухания)
//! 3. попали: отражаем v с restitution, позиция не двигается
//!    не попали: коммитим позицию
//! 4. сохраняем v × damping: один раз за тик, НЕ масштабируется dt
//! 5. суммарный отскок × multiplier → глобальная отдача на следующий тик
//!
//! Масса вершины (1/3 площади треугольников) пересчитывается в state,
//! но сила на неё не делится (как в игре).

use bevy::prelude::*;

use super::collision::CollisionQuery;
use super::config::BubbleConfig;
use super::state::SoftBodyState;

/// Итог одного шага интеграции
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntegrationReport {
    /// Фактический (обрезанный) dt
    pub time_step: f32,
    /// Сколько вершин отскочило
    pub bounces: usize,
    /// Сумма коррекций скорости от отражений
    pub total_bounce: Vec3,
}

/// Коррекция скорости при ударе о поверхность с нормалью `normal`
///
/// Только если вершина движется внутрь поверхности; компонента вдоль
/// нормали после отражения = (restitution - 1) × |v·n| ≥ 0.
pub fn bounce_correction(velocity: Vec3, normal: Vec3, restitution: f32) -> Vec3 {
    let into_surface = velocity.dot(normal);
    if into_surface >= 0.0 {
        return Vec3::ZERO;
    }
    -restitution * into_surface * normal
}

/// Шаг интеграции всех вершин
///
/// `time_step` уже обрезан (`BubbleConfig::clamp_time_step`).
pub fn integrate(
    state: &mut SoftBodyState,
    forces: &[Vec3],
    time_step: f32,
    config: &BubbleConfig,
    collision: &dyn CollisionQuery,
    self_entity: Option<Entity>,
) -> IntegrationReport {
    let mut report = IntegrationReport {
        time_step,
        ..default()
    };

    state.update_vertex_masses();

    for vertex in 0..state.vertex_count() {
        let force = forces.get(vertex).copied().unwrap_or(Vec3::ZERO);

        let mut velocity = state.velocities[vertex] + force * time_step;

        let position = state.positions[vertex];
        let candidate = position + velocity * time_step;

        let hit = if candidate != position {
            collision.cast_segment(position, candidate, self_entity)
        } else {
            None
        };

        match hit {
            Some(hit) => {
                let correction = bounce_correction(velocity, hit.normal, config.bounce_restitution);
                velocity += correction;
                report.total_bounce += correction;
                report.bounces += 1;
            }
            None => {
                state.positions[vertex] = candidate;
            }
        }

        state.velocities[vertex] = velocity * config.velocity_damping;
    }

    state.global_force += report.total_bounce * config.global_bounce_multiplier;
    report
}
