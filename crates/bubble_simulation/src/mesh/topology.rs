//! Read-only топология сетки для force/integration проходов

use bevy::prelude::*;

use super::sphere::{Edge, Face, SphereMesh};
use crate::math::{triangle_area, triangle_normal};

/// Смежность вершин, построенная один раз при генерации
///
/// - `vertex_edges[i]`: индексы рёбер, инцидентных вершине i
/// - `vertex_faces[i]`: индексы граней, содержащих вершину i
#[derive(Debug, Clone, Default)]
pub struct MeshTopology {
    edges: Vec<Edge>,
    faces: Vec<Face>,
    vertex_edges: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
}

impl MeshTopology {
    pub fn from_mesh(mesh: &SphereMesh) -> Self {
        let vertex_count = mesh.vertex_count();
        let mut vertex_edges = vec![Vec::new(); vertex_count];
        let mut vertex_faces = vec![Vec::new(); vertex_count];

        for (edge_index, &[a, b]) in mesh.edges.iter().enumerate() {
            vertex_edges[a].push(edge_index);
            vertex_edges[b].push(edge_index);
        }

        for (face_index, face) in mesh.faces.iter().enumerate() {
            for &vertex in face {
                vertex_faces[vertex].push(face_index);
            }
        }

        Self {
            edges: mesh.edges.clone(),
            faces: mesh.faces.clone(),
            vertex_edges,
            vertex_faces,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_edges.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, index: usize) -> Option<Face> {
        self.faces.get(index).copied()
    }

    pub fn vertex_edges(&self, vertex: usize) -> &[usize] {
        &self.vertex_edges[vertex]
    }

    pub fn vertex_faces(&self, vertex: usize) -> &[usize] {
        &self.vertex_faces[vertex]
    }

    /// Соседняя вершина по ребру
    pub fn neighbor(&self, vertex: usize, edge_index: usize) -> usize {
        let [a, b] = self.edges[edge_index];
        if a == vertex {
            b
        } else {
            a
        }
    }

    pub fn face_positions(&self, positions: &[Vec3], face_index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[face_index];
        [positions[a], positions[b], positions[c]]
    }

    pub fn face_area(&self, positions: &[Vec3], face_index: usize) -> f32 {
        let [v0, v1, v2] = self.face_positions(positions, face_index);
        triangle_area(v0, v1, v2)
    }

    pub fn face_normal(&self, positions: &[Vec3], face_index: usize) -> Vec3 {
        let [v0, v1, v2] = self.face_positions(positions, face_index);
        triangle_normal(v0, v1, v2)
    }

    /// Площадь вершины: 1/3 суммы площадей инцидентных треугольников
    pub fn vertex_areas(&self, positions: &[Vec3]) -> Vec<f32> {
        (0..self.vertex_count())
            .map(|vertex| {
                self.vertex_faces[vertex]
                    .iter()
                    .map(|&face| self.face_area(positions, face))
                    .sum::<f32>()
                    / 3.0
            })
            .collect()
    }

    /// Сколько граней касается каждого ребра (для проверки manifold)
    pub fn edge_face_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.edges.len()];
        for face in &self.faces {
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                if let Some(edge_index) = self.find_edge(a, b) {
                    counts[edge_index] += 1;
                }
            }
        }
        counts
    }

    /// Индекс ребра между двумя вершинами
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        self.vertex_edges
            .get(a)?
            .iter()
            .copied()
            .find(|&edge_index| self.neighbor(a, edge_index) == b)
    }
}
