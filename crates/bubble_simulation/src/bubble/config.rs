//! Параметры пузыря (data-driven, serde)
//!
//! Дефолты: тюнинг из игры (радиус 100 units, 3 подразбиения икосаэдра).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::BasePolyhedron;

/// Потолок подразбиений (~4x вершин на уровень, 7 уровней = 163842 вершины)
pub const MAX_SUBDIVISIONS: u32 = 7;

/// Максимальный шаг интеграции (секунды): защита от фризов кадра
pub const MAX_TIME_STEP: f32 = 1.0 / 15.0;

/// Ошибки конфигурации пузыря
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("{requested} subdivisions requested, at most {max} supported")]
    TooManySubdivisions { requested: u32, max: u32 },
    #[error("velocity damping must be in (0, 1], got {0}")]
    DampingOutOfRange(f32),
    #[error("big noise change interval must be positive, got {0}")]
    InvalidNoiseInterval(f32),
    #[error("pressure normal blend must be in [0, 1], got {0}")]
    InvalidNormalBlend(f32),
    #[error("color metric range is empty: min {min} > max {max}")]
    InvalidColorRange { min: f32, max: f32 },
    #[error("max time step must be positive, got {0}")]
    InvalidTimeStep(f32),
    #[error("impact release factor must be non-negative, got {0}")]
    InvalidReleaseFactor(f32),
    #[error("pop radius multiplier must be positive, got {0}")]
    InvalidPopRadius(f32),
    #[error("{0} must be finite")]
    NotFinite(&'static str),
    #[error("failed to parse bubble config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Полная конфигурация одного пузыря
///
/// Силы в "units/s²" на вершину (масса вершины = 1, см. integrator).
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Базовый многогранник для subdivision
    pub base: BasePolyhedron,
    /// Количество подразбиений (0 = голый многогранник)
    pub subdivisions: u32,
    /// Начальный радиус
    pub radius: f32,
    /// Коэффициент давления воздуха (сила = k / distance²)
    pub air_pressure_force: f32,
    /// Доля смешивания направления давления с нормалью вершины (0 = чисто радиально)
    pub pressure_normal_blend: f32,
    /// Жёсткость пружин рёбер
    pub spring_coefficient: f32,
    /// Множитель скорости за тик (< 1)
    pub velocity_damping: f32,
    /// Мелкий per-vertex шум
    pub force_noise_magnitude: f32,
    /// Крупный когерентный шум ("дыхание")
    pub force_big_noise_magnitude: f32,
    /// Интервал смены big noise вектора (секунды)
    pub big_noise_change_interval: f32,
    /// Сила толчка вершин от удара
    pub impact_vertex_push_strength: f32,
    /// Сила толчка всего пузыря от удара
    pub impact_global_push_strength: f32,
    /// Во сколько раз актор должен отойти (от capture distance), чтобы толчок прекратился
    pub impact_release_factor: f32,
    /// Доля суммарного отскока вершин, уходящая в глобальную отдачу
    pub global_bounce_multiplier: f32,
    /// Коэффициент отражения скорости при столкновении (>1: супер-упругий)
    pub bounce_restitution: f32,
    /// Максимальный шаг интеграции
    pub max_time_step: f32,
    /// Радиус ниже которого лопание не даёт импульса
    pub pop_radius_threshold: f32,
    /// Масштаб импульса лопания
    pub pop_impulse_scale: f32,
    /// Радиус поиска тел при лопании (× actual radius)
    pub pop_radius_multiplier: f32,
    /// Диапазон clamp для метрики vertexArea / averageVertexArea
    pub color_metric_min: f32,
    pub color_metric_max: f32,
    /// Случайный оттенок при спавне
    pub randomize_color: bool,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            base: BasePolyhedron::Icosahedron,
            subdivisions: 3,
            radius: 100.0,
            air_pressure_force: 500_000.0,
            pressure_normal_blend: 0.0,
            spring_coefficient: 10.0,
            velocity_damping: 0.999,
            force_noise_magnitude: 10.0,
            force_big_noise_magnitude: 0.08,
            big_noise_change_interval: 0.5,
            impact_vertex_push_strength: 300.0,
            impact_global_push_strength: 75.0,
            impact_release_factor: 1.5,
            global_bounce_multiplier: 0.5,
            bounce_restitution: 1.9,
            max_time_step: MAX_TIME_STEP,
            pop_radius_threshold: 30.0,
            pop_impulse_scale: 1.0,
            pop_radius_multiplier: 3.0,
            color_metric_min: 0.5,
            color_metric_max: 1.5,
            randomize_color: false,
        }
    }
}

impl BubbleConfig {
    /// Конфиг без шума/давления/ударов: для детерминированных проверок равновесия
    pub fn quiet() -> Self {
        Self {
            air_pressure_force: 0.0,
            force_noise_magnitude: 0.0,
            force_big_noise_magnitude: 0.0,
            ..default()
        }
    }

    /// Парсит JSON и валидирует
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("air_pressure_force", self.air_pressure_force),
            ("spring_coefficient", self.spring_coefficient),
            ("force_noise_magnitude", self.force_noise_magnitude),
            ("force_big_noise_magnitude", self.force_big_noise_magnitude),
            ("impact_vertex_push_strength", self.impact_vertex_push_strength),
            ("impact_global_push_strength", self.impact_global_push_strength),
            ("impact_release_factor", self.impact_release_factor),
            ("global_bounce_multiplier", self.global_bounce_multiplier),
            ("bounce_restitution", self.bounce_restitution),
            ("max_time_step", self.max_time_step),
            ("pop_radius_threshold", self.pop_radius_threshold),
            ("pop_impulse_scale", self.pop_impulse_scale),
            ("pop_radius_multiplier", self.pop_radius_multiplier),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NotFinite(name));
        }

        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if self.subdivisions > MAX_SUBDIVISIONS {
            return Err(ConfigError::TooManySubdivisions {
                requested: self.subdivisions,
                max: MAX_SUBDIVISIONS,
            });
        }
        if !(self.velocity_damping > 0.0 && self.velocity_damping <= 1.0) {
            return Err(ConfigError::DampingOutOfRange(self.velocity_damping));
        }
        if !(self.big_noise_change_interval > 0.0) {
            return Err(ConfigError::InvalidNoiseInterval(self.big_noise_change_interval));
        }
        if self.max_time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep(self.max_time_step));
        }
        if self.impact_release_factor < 0.0 {
            return Err(ConfigError::InvalidReleaseFactor(self.impact_release_factor));
        }
        if self.pop_radius_multiplier <= 0.0 {
            return Err(ConfigError::InvalidPopRadius(self.pop_radius_multiplier));
        }
        if !(0.0..=1.0).contains(&self.pressure_normal_blend) {
            return Err(ConfigError::InvalidNormalBlend(self.pressure_normal_blend));
        }
        if !(self.color_metric_min <= self.color_metric_max) {
            return Err(ConfigError::InvalidColorRange {
                min: self.color_metric_min,
                max: self.color_metric_max,
            });
        }
        Ok(())
    }

    /// Шаг интеграции: delta, обрезанная до [0, max_time_step]
    pub fn clamp_time_step(&self, delta: f32) -> f32 {
        if !delta.is_finite() {
            return 0.0;
        }
        delta.min(self.max_time_step).min(MAX_TIME_STEP).max(0.0)
    }
}
