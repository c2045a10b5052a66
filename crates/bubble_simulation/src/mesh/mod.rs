//! Mesh generation для пузыря
//!
//! Архитектура:
//! - polyhedron: базовые многогранники (октаэдр, икосаэдр) с проверкой winding
//! - sphere: SphereMesh + рекурсивное подразбиение + проекция на сферу
//! - topology: read-only смежность (vertex → edges/faces) для симуляции
//!
//! Топология строится один раз при генерации и дальше не меняется:
//! двигаются только позиции вершин.

pub mod polyhedron;
pub mod sphere;
pub mod topology;


pub use polyhedron::BasePolyhedron;
pub use sphere::{Edge, Face, SphereMesh};
pub use topology::MeshTopology;
