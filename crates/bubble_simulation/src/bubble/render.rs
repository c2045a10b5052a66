//! Данные для рендера (write-only со стороны симуляции)
//!
//! Симуляция отдаёт позиции, нормали, метрику площади и оттенок;
//! обратно из рендера ничего не читается.

use bevy::prelude::*;

use super::noise::BubbleRng;

/// Оттенок пузыря (HSL hue в градусах)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct BubbleTint {
    pub hue: f32,
}

impl Default for BubbleTint {
    fn default() -> Self {
        Self { hue: 200.0 } // голубой
    }
}

impl BubbleTint {
    pub fn random(rng: &mut BubbleRng) -> Self {
        Self {
            hue: rng.range(0.0, 360.0),
        }
    }

    pub fn color(&self) -> Color {
        Color::hsl(self.hue, 0.7, 0.6)
    }
}

/// Снапшот одного пузыря для рендер-слоя
#[derive(Debug, Clone, Default)]
pub struct RenderSnapshot {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// vertexArea / averageVertexArea, clamp в диапазон конфига
    pub area_metrics: Vec<f32>,
    pub tint: BubbleTint,
}
