//! Геометрические хелперы для soft-body симуляции
//!
//! Все нормализации в симуляции идут через `safe_normalize`:
//! вырожденный вектор даёт ноль, а не NaN.

use bevy::prelude::*;

/// Минимальная длина, ниже которой вектор считается нулевым
pub const NORMALIZE_EPSILON: f32 = 1.0e-8;

/// Safe-normalize: нулевой (или почти нулевой) вектор → Vec3::ZERO
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let length_squared = v.length_squared();
    if !length_squared.is_finite() || length_squared <= NORMALIZE_EPSILON * NORMALIZE_EPSILON {
        return Vec3::ZERO;
    }
    v / length_squared.sqrt()
}

/// Площадь треугольника (половина модуля векторного произведения)
pub fn triangle_area(v0: Vec3, v1: Vec3, v2: Vec3) -> f32 {
    (v1 - v0).cross(v2 - v0).length() * 0.5
}

/// Нормаль треугольника по CCW winding (наружу для сферы)
pub fn triangle_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    safe_normalize((v1 - v0).cross(v2 - v0))
}

pub fn triangle_center(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v0 + v1 + v2) / 3.0
}

/// Ray–triangle intersection (Möller–Trumbore)
///
/// Возвращает параметр `t` вдоль луча (в единицах `direction`) или None.
/// Пересечения с обеих сторон треугольника считаются (без backface culling).
pub fn ray_triangle_intersection(
    origin: Vec3,
    direction: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < NORMALIZE_EPSILON {
        return None; // луч параллелен плоскости
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}
