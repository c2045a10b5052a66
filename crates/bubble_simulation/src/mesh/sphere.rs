//! SphereMesh: позиции + рёбра + грани, subdivision, проекция на сферу

use std::collections::HashMap;

use bevy::prelude::*;

use super::polyhedron::BasePolyhedron;
use crate::math::safe_normalize;

/// Неориентированное ребро (индексы вершин)
pub type Edge = [usize; 2];

/// Треугольная грань, CCW если смотреть снаружи
pub type Face = [usize; 3];

/// Треугольная сетка замкнутой поверхности
///
/// Инварианты:
/// - каждое ребро присутствует в `edges` ровно один раз
/// - все три ребра каждой грани есть в `edges`
/// - нормаль грани (cross(v1 - v0, v2 - v0)) смотрит наружу
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SphereMesh {
    pub positions: Vec<Vec3>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
}

impl SphereMesh {
    /// Базовый многогранник → N подразбиений → проекция на сферу радиуса `radius`
    pub fn sphere(radius: f32, subdivisions: u32, base: BasePolyhedron) -> Self {
        let mut mesh = base.build();
        for _ in 0..subdivisions {
            mesh.subdivide();
        }
        mesh.rescale_to_sphere(radius);
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Одна итерация подразбиения (каждый треугольник → 4)
    ///
    /// Для каждого ребра создаётся вершина в середине; map (min, max) → index
    /// гарантирует, что общее для двух граней ребро делится один раз.
    ///
    /// ```text
    ///          v2
    ///         /  \
    ///       v5 -- v4
    ///       / \  / \
    ///     v0 -- v3 -- v1
    /// ```
    ///
    /// V' = V + E, F' = 4F, E' = 2E + 3F.
    pub fn subdivide(&mut self) {
        let mut edge_to_vertex: HashMap<Edge, usize> = HashMap::with_capacity(self.edges.len());
        self.positions.reserve(self.edges.len());

        for &[a, b] in &self.edges {
            let midpoint = (self.positions[a] + self.positions[b]) / 2.0;
            edge_to_vertex.insert(edge_key(a, b), self.positions.len());
            self.positions.push(midpoint);
        }

        let midpoint_of = |a: usize, b: usize| -> usize {
            *edge_to_vertex
                .get(&edge_key(a, b))
                .unwrap_or_else(|| panic!("edge {}-{} of a face is missing from the edge set", a, b))
        };

        let mut new_edges: Vec<Edge> = Vec::with_capacity(self.edges.len() * 2 + self.faces.len() * 3);
        let mut new_faces: Vec<Face> = Vec::with_capacity(self.faces.len() * 4);

        for &[v0, v1, v2] in &self.faces {
            let v3 = midpoint_of(v0, v1);
            let v4 = midpoint_of(v1, v2);
            let v5 = midpoint_of(v2, v0);

            let children: [Face; 4] = [[v0, v3, v5], [v1, v4, v3], [v2, v5, v4], [v3, v4, v5]];

            // 12 кандидатов; ориентированная пара (a < b) встречается ровно
            // в одной из двух граней, которые делят ребро
            for [a, b, c] in children {
                for (from, to) in [(a, b), (b, c), (c, a)] {
                    if from < to {
                        new_edges.push([from, to]);
                    }
                }
            }

            new_faces.extend_from_slice(&children);
        }

        self.edges = new_edges;
        self.faces = new_faces;
    }

    /// Нормализует все позиции и масштабирует на `radius`
    pub fn rescale_to_sphere(&mut self, radius: f32) {
        for position in &mut self.positions {
            *position = safe_normalize(*position) * radius;
        }
    }
}

/// Ключ неориентированного ребра
pub fn edge_key(a: usize, b: usize) -> Edge {
    [a.min(b), a.max(b)]
}
