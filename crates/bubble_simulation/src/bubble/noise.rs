//! Шум для пузыря: per-body RNG + big noise генератор
//!
//! RNG принадлежит конкретному пузырю (не глобальный stream):
//! одинаковый seed даёт одинаковую деформацию.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Детерминированный RNG одного пузыря
#[derive(Debug, Clone)]
pub struct BubbleRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl BubbleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Равномерное число в [0, 1)
    pub fn fraction(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Случайный единичный вектор (rejection sampling в единичном шаре)
    pub fn unit_vector(&mut self) -> Vec3 {
        loop {
            let candidate = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            let length_squared = candidate.length_squared();
            if length_squared > 1.0e-4 && length_squared <= 1.0 {
                return candidate / length_squared.sqrt();
            }
        }
    }
}

/// Когерентный "big noise": один вектор на весь пузырь
///
/// Меняется когда таймер истёк, или раньше, с вероятностью
/// `dt * (1 - timer / interval)`, которая растёт к концу интервала.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseState {
    pub big_noise_vector: Vec3,
    pub big_noise_timer: f32,
}

impl Default for NoiseState {
    fn default() -> Self {
        Self {
            big_noise_vector: Vec3::Y,
            big_noise_timer: 0.0,
        }
    }
}

impl NoiseState {
    /// Обновляет big noise; возвращает true если вектор сменился
    pub fn update(&mut self, delta: f32, interval: f32, rng: &mut BubbleRng) -> bool {
        let early_chance = delta * (1.0 - self.big_noise_timer / interval);
        let resampled = self.big_noise_timer <= 0.0 || rng.fraction() < early_chance;

        if resampled {
            self.big_noise_vector = rng.unit_vector();
            self.big_noise_timer = interval;
        }
        self.big_noise_timer -= delta;
        resampled
    }

    /// Мелкий шум: независимый единичный вектор на каждую вершину
    pub fn sample_jitter(rng: &mut BubbleRng, vertex_count: usize, magnitude: f32) -> Vec<Vec3> {
        if magnitude == 0.0 {
            return vec![Vec3::ZERO; vertex_count];
        }
        (0..vertex_count).map(|_| rng.unit_vector() * magnitude).collect()
    }
}
