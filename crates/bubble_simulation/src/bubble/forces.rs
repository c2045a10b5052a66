//! ForceField: сила на каждую вершину
//!
//! Чистый read pass: все силы считаются из одного снапшота позиций,
//! state не мутируется. Слагаемые:
//! 1. Давление воздуха: k / d² от центра масс наружу
//! 2. Пружины рёбер: Hooke к rest length (× рост радиуса)
//! 3. Мелкий шум: per-vertex jitter (сэмплируется заранее)
//! 4. Крупный шум: когерентная деформация вдоль big noise вектора
//! 5. Глобальная сила: накопленный импульс / dt
//! 6. Толчки от ImpactTracker: на три вершины ударенной грани

use bevy::prelude::*;

use super::config::BubbleConfig;
use super::impact::ImpactContribution;
use super::state::SoftBodyState;
use crate::math::safe_normalize;

/// Минимальная дистанция до центра масс для 1/d² (защита от деления на 0)
pub const MIN_PRESSURE_DISTANCE: f32 = 1.0e-3;

/// Внешние входы force pass (всё случайное сэмплировано до него)
#[derive(Debug, Clone, Copy)]
pub struct ForceInputs<'a> {
    /// Мелкий шум на каждую вершину (уже × magnitude)
    pub jitter: &'a [Vec3],
    pub big_noise_vector: Vec3,
    pub impacts: &'a ImpactContribution,
    /// Обрезанный шаг интеграции
    pub time_step: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceOutput {
    pub forces: Vec<Vec3>,
    /// Глобальная сила на следующий тик (текущая потреблена, осталась только
    /// добавка от длящихся толчков)
    pub carried_global_force: Vec3,
}

/// Давление воздуха на вершину
pub fn air_pressure_force(position: Vec3, normal: Vec3, center_of_mass: Vec3, config: &BubbleConfig) -> Vec3 {
    if config.air_pressure_force == 0.0 {
        return Vec3::ZERO;
    }

    let offset = position - center_of_mass;
    let radial = safe_normalize(offset);
    let direction = if config.pressure_normal_blend > 0.0 {
        safe_normalize(radial.lerp(normal, config.pressure_normal_blend))
    } else {
        radial
    };

    let distance = offset.length().max(MIN_PRESSURE_DISTANCE);
    direction * (config.air_pressure_force / (distance * distance))
}

/// Сумма пружин по всем рёбрам вершины
pub fn spring_force(state: &SoftBodyState, vertex: usize, spring_coefficient: f32) -> Vec3 {
    let position = state.positions[vertex];
    state
        .topology
        .vertex_edges(vertex)
        .iter()
        .map(|&edge_index| {
            let neighbor = state.positions[state.topology.neighbor(vertex, edge_index)];
            let offset = neighbor - position;
            let stretch = offset.length() - state.target_edge_length(edge_index);
            safe_normalize(offset) * (stretch * spring_coefficient)
        })
        .sum()
}

/// Крупный шум: (2|dot(p - com, noise)| - 1) × magnitude к центру
pub fn big_noise_force(position: Vec3, center_of_mass: Vec3, big_noise_vector: Vec3, magnitude: f32) -> Vec3 {
    if magnitude == 0.0 {
        return Vec3::ZERO;
    }
    let alignment = 2.0 * (position - center_of_mass).dot(big_noise_vector).abs() - 1.0;
    safe_normalize(center_of_mass - position) * (alignment * magnitude)
}

/// Полный force pass
pub fn compute_forces(state: &SoftBodyState, config: &BubbleConfig, inputs: &ForceInputs<'_>) -> ForceOutput {
    let vertex_count = state.vertex_count();
    let com = state.center_of_mass;

    let global = if inputs.time_step > 0.0 {
        state.global_force / inputs.time_step
    } else {
        Vec3::ZERO
    };

    let mut forces: Vec<Vec3> = (0..vertex_count)
        .map(|vertex| {
            let position = state.positions[vertex];
            let mut force = air_pressure_force(position, state.normals[vertex], com, config);
            force += spring_force(state, vertex, config.spring_coefficient);
            force += inputs.jitter.get(vertex).copied().unwrap_or(Vec3::ZERO);
            force += big_noise_force(position, com, inputs.big_noise_vector, config.force_big_noise_magnitude);
            force + global
        })
        .collect();

    for &(vertex, push) in &inputs.impacts.vertex_forces {
        if let Some(force) = forces.get_mut(vertex) {
            *force += push;
        }
    }

    ForceOutput {
        forces,
        carried_global_force: inputs.impacts.global_force,
    }
}
