//! SoftBodyState: кинематика вершин + производные скаляры
//!
//! Владелец: только симуляция. Наружу (рендер) уходят позиции,
//! нормали и метрика площади через read-only геттеры.

use bevy::prelude::*;

use crate::math::{safe_normalize, triangle_area, triangle_center};
use crate::mesh::{MeshTopology, SphereMesh};

#[derive(Debug, Clone)]
pub struct SoftBodyState {
    pub(crate) topology: MeshTopology,
    pub(crate) positions: Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    /// Масса вершины: 1/3 площади инцидентных треугольников.
    /// Считается каждый тик, но сила на неё не делится (масса = 1).
    pub(crate) vertex_masses: Vec<f32>,
    /// Длины рёбер при генерации (до масштабирования радиусом)
    pub(crate) rest_lengths: Vec<f32>,
    pub(crate) center_of_mass: Vec3,
    pub(crate) average_vertex_area: f32,
    pub(crate) actual_radius: f32,
    pub(crate) initial_radius: f32,
    pub(crate) target_radius: f32,
    /// Импульс на всё тело, применяется в следующем тике и обнуляется
    pub(crate) global_force: Vec3,
}

impl SoftBodyState {
    /// Строит состояние из сферической сетки, сдвинутой в `origin`
    pub fn from_mesh(mesh: &SphereMesh, radius: f32, origin: Vec3) -> Self {
        let topology = MeshTopology::from_mesh(mesh);
        let positions: Vec<Vec3> = mesh.positions.iter().map(|&p| p + origin).collect();

        let rest_lengths = topology
            .edges()
            .iter()
            .map(|&[a, b]| positions[a].distance(positions[b]))
            .collect();

        let vertex_count = positions.len();
        let vertex_masses = topology.vertex_areas(&positions);
        let average_vertex_area = if vertex_count > 0 {
            vertex_masses.iter().sum::<f32>() / vertex_count as f32
        } else {
            0.0
        };

        let mut state = Self {
            topology,
            positions,
            velocities: vec![Vec3::ZERO; vertex_count],
            normals: vec![Vec3::ZERO; vertex_count],
            vertex_masses,
            rest_lengths,
            center_of_mass: origin,
            average_vertex_area,
            actual_radius: radius,
            initial_radius: radius,
            target_radius: radius,
            global_force: Vec3::ZERO,
        };

        state.update_center_of_mass();
        state.update_actual_radius();
        state.update_normals();
        state
    }

    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_masses(&self) -> &[f32] {
        &self.vertex_masses
    }

    pub fn center_of_mass(&self) -> Vec3 {
        self.center_of_mass
    }

    pub fn average_vertex_area(&self) -> f32 {
        self.average_vertex_area
    }

    pub fn actual_radius(&self) -> f32 {
        self.actual_radius
    }

    pub fn initial_radius(&self) -> f32 {
        self.initial_radius
    }

    pub fn target_radius(&self) -> f32 {
        self.target_radius
    }

    pub fn global_force(&self) -> Vec3 {
        self.global_force
    }

    /// Масштаб rest length при росте пузыря (target / initial)
    pub fn rest_length_scale(&self) -> f32 {
        if self.initial_radius > 0.0 {
            self.target_radius / self.initial_radius
        } else {
            1.0
        }
    }

    /// Целевая длина ребра с учётом роста
    pub fn target_edge_length(&self, edge_index: usize) -> f32 {
        self.rest_lengths[edge_index] * self.rest_length_scale()
    }

    /// Текущая длина ребра
    pub fn edge_length(&self, edge_index: usize) -> f32 {
        let [a, b] = self.topology.edges()[edge_index];
        self.positions[a].distance(self.positions[b])
    }

    /// Центр масс: центры треугольников, взвешенные площадью
    ///
    /// Вырожденная сетка (нулевая площадь) → среднее позиций.
    pub fn update_center_of_mass(&mut self) {
        let mut weighted = Vec3::ZERO;
        let mut total_area = 0.0;

        for &[a, b, c] in self.topology.faces() {
            let (v0, v1, v2) = (self.positions[a], self.positions[b], self.positions[c]);
            let area = triangle_area(v0, v1, v2);
            weighted += triangle_center(v0, v1, v2) * area;
            total_area += area;
        }

        if total_area > f32::EPSILON {
            self.center_of_mass = weighted / total_area;
        } else if !self.positions.is_empty() {
            self.center_of_mass = self.positions.iter().copied().sum::<Vec3>() / self.positions.len() as f32;
        }
    }

    /// Средняя дистанция вершин до центра масс
    pub fn update_actual_radius(&mut self) {
        if self.positions.is_empty() {
            return;
        }
        let com = self.center_of_mass;
        let total: f32 = self.positions.iter().map(|p| p.distance(com)).sum();
        self.actual_radius = total / self.positions.len() as f32;
    }

    /// Нормали вершин: среднее нормалей граней, взвешенное площадью
    ///
    /// Сумма ненормированных cross-произведений = сумма (2 * area * normal).
    pub fn update_normals(&mut self) {
        for vertex in 0..self.positions.len() {
            let weighted: Vec3 = self
                .topology
                .vertex_faces(vertex)
                .iter()
                .map(|&face| {
                    let [v0, v1, v2] = self.topology.face_positions(&self.positions, face);
                    (v1 - v0).cross(v2 - v0)
                })
                .sum();
            self.normals[vertex] = safe_normalize(weighted);
        }
    }

    /// Масса-прокси вершин (1/3 площади инцидентных треугольников)
    pub fn update_vertex_masses(&mut self) {
        self.vertex_masses = self.topology.vertex_areas(&self.positions);
    }

    /// Метрика для рендера: vertexArea / averageVertexArea, clamp в [min, max]
    pub fn area_metrics(&self, min: f32, max: f32) -> Vec<f32> {
        if self.average_vertex_area <= f32::EPSILON {
            return vec![min.max(0.0).min(max); self.positions.len()];
        }
        self.vertex_masses
            .iter()
            .map(|&area| (area / self.average_vertex_area).clamp(min, max))
            .collect()
    }

    /// Сдвиг скорости одной вершины (импульс от удара)
    pub(crate) fn push_vertex(&mut self, vertex: usize, delta_velocity: Vec3) {
        if let Some(velocity) = self.velocities.get_mut(vertex) {
            *velocity += delta_velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BasePolyhedron;

    fn sphere_state(radius: f32, origin: Vec3) -> SoftBodyState {
        let mesh = SphereMesh::sphere(radius, 2, BasePolyhedron::Icosahedron);
        SoftBodyState::from_mesh(&mesh, radius, origin)
    }

    #[test]
    fn test_center_of_mass_at_origin_offset() {
        let origin = Vec3::new(10.0, -5.0, 3.0);
        let state = sphere_state(20.0, origin);
        assert!(state.center_of_mass().distance(origin) < 1e-3, "com = {:?}", state.center_of_mass());
    }

    #[test]
    fn test_actual_radius_matches_generation() {
        let state = sphere_state(20.0, Vec3::ZERO);
        assert!((state.actual_radius() - 20.0).abs() < 1e-3);
        assert_eq!(state.initial_radius(), 20.0);
        assert_eq!(state.rest_length_scale(), 1.0);
    }

    #[test]
    fn test_normals_point_outward() {
        let state = sphere_state(5.0, Vec3::ONE);
        for (position, normal) in state.positions().iter().zip(state.normals()) {
            let radial = (*position - Vec3::ONE).normalize();
            assert!((normal.length() - 1.0).abs() < 1e-4);
            assert!(normal.dot(radial) > 0.95, "normal {:?} vs radial {:?}", normal, radial);
        }
    }

    #[test]
    fn test_rest_lengths_equal_initial_edges() {
        let state = sphere_state(5.0, Vec3::ZERO);
        for edge in 0..state.topology().edges().len() {
            assert!((state.edge_length(edge) - state.target_edge_length(edge)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_area_metrics_clamped() {
        let state = sphere_state(5.0, Vec3::ZERO);
        let metrics = state.area_metrics(0.9, 1.1);
        assert_eq!(metrics.len(), state.vertex_count());
        assert!(metrics.iter().all(|m| (0.9..=1.1).contains(m)));
    }

    #[test]
    fn test_average_vertex_area() {
        let state = sphere_state(1.0, Vec3::ZERO);
        let total: f32 = state.vertex_masses().iter().sum();
        let expected = total / state.vertex_count() as f32;
        assert!((state.average_vertex_area() - expected).abs() < 1e-6);
    }
}
