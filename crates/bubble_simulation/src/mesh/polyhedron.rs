//! Базовые многогранники для subdivision

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::sphere::{Edge, Face, SphereMesh};

/// Тип базового многогранника
///
/// Икосаэдр даёт более равномерную сетку, октаэдр: меньше вершин
/// на том же уровне подразбиения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasePolyhedron {
    Octahedron,
    #[default]
    Icosahedron,
}

impl BasePolyhedron {
    pub fn build(self) -> SphereMesh {
        match self {
            BasePolyhedron::Octahedron => octahedron(),
            BasePolyhedron::Icosahedron => icosahedron(),
        }
    }

    /// (V, E, F) базового многогранника
    pub fn counts(self) -> (usize, usize, usize) {
        match self {
            BasePolyhedron::Octahedron => (6, 12, 8),
            BasePolyhedron::Icosahedron => (12, 30, 20),
        }
    }
}

fn octahedron() -> SphereMesh {
    let positions = vec![
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
    ];

    let faces = vec![
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 4, 2],
        [1, 3, 4],
        [1, 5, 3],
        [1, 2, 5],
    ];

    assemble("Octahedron", positions, faces, BasePolyhedron::Octahedron.counts().1)
}

fn icosahedron() -> SphereMesh {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let positions = vec![
        Vec3::new(phi, 1.0, 0.0),
        Vec3::new(-phi, 1.0, 0.0),
        Vec3::new(phi, -1.0, 0.0),
        Vec3::new(-phi, -1.0, 0.0),
        Vec3::new(1.0, 0.0, phi),
        Vec3::new(1.0, 0.0, -phi),
        Vec3::new(-1.0, 0.0, phi),
        Vec3::new(-1.0, 0.0, -phi),
        Vec3::new(0.0, phi, 1.0),
        Vec3::new(0.0, -phi, 1.0),
        Vec3::new(0.0, phi, -1.0),
        Vec3::new(0.0, -phi, -1.0),
    ];

    let faces = vec![
        [0, 8, 4], [0, 5, 10], [2, 4, 9], [2, 11, 5], [1, 6, 8],
        [1, 10, 7], [3, 9, 6], [3, 7, 11], [0, 10, 8], [1, 8, 10],
        [2, 9, 11], [3, 11, 9], [4, 2, 0], [5, 0, 2], [6, 1, 3],
        [7, 3, 1], [8, 6, 4], [9, 4, 6], [10, 5, 7], [11, 7, 5],
    ];

    assemble("Icosahedron", positions, faces, BasePolyhedron::Icosahedron.counts().1)
}

/// Проверяет winding и собирает рёбра из граней
///
/// При согласованном CCW winding каждое ребро встречается в соседних гранях
/// в противоположных направлениях, поэтому `a < b` берёт его ровно один раз.
///
/// # Panics
/// Грань с нормалью внутрь или неожиданное число рёбер: ошибка в таблицах
/// многогранника, продолжать с битой топологией нельзя.
fn assemble(name: &str, positions: Vec<Vec3>, faces: Vec<Face>, expected_edges: usize) -> SphereMesh {
    let mut edges: Vec<Edge> = Vec::with_capacity(expected_edges);

    for &[a, b, c] in &faces {
        let (v0, v1, v2) = (positions[a], positions[b], positions[c]);
        let normal = crate::math::safe_normalize((v1 - v0).cross(v2 - v0));
        assert!(
            v0.dot(normal) >= 0.0,
            "{} face {} {} {} is not CCW",
            name,
            a,
            b,
            c
        );

        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from < to {
                edges.push([from, to]);
            }
        }
    }

    assert!(
        edges.len() == expected_edges,
        "{} has {} edges, expected {}",
        name,
        edges.len(),
        expected_edges
    );

    SphereMesh {
        positions,
        edges,
        faces,
    }
}
