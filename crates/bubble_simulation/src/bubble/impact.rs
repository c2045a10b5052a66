//! ImpactTracker: длящиеся толчки от внешних акторов
//!
//! State machine per actor: absent → active (hit) → absent (ушёл/исчез).
//!
//! Пока актор рядом (≤ release_factor × capture distance от центра масс),
//! его толчок повторяется каждый тик: это не одиночный импульс,
//! а давление тела, которое продолжает упираться в пузырь.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::config::BubbleConfig;
use super::hooks::{ActorLocator, PushStrengthModifier};
use crate::mesh::MeshTopology;

/// Запись о толчке от одного актора
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactRecord {
    /// Индекс грани, в которую попали
    pub face: usize,
    /// Направление импульса
    pub direction: Vec3,
    /// Дистанция актор ↔ центр масс в момент удара
    pub capture_distance: f32,
}

/// Вклад толчков в силы текущего тика
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactContribution {
    /// (vertex, force): уже отмасштабировано
    pub vertex_forces: Vec<(usize, Vec3)>,
    /// Добавка к глобальной силе следующего тика
    pub global_force: Vec3,
}

/// Активные толчки, ключ: стабильный id актора
///
/// BTreeMap: порядок обхода детерминирован (важно для float-суммирования).
#[derive(Debug, Clone, Default)]
pub struct ImpactTracker {
    entries: BTreeMap<Entity, ImpactRecord>,
}

impl ImpactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, actor: Entity) -> bool {
        self.entries.contains_key(&actor)
    }

    pub fn get(&self, actor: Entity) -> Option<&ImpactRecord> {
        self.entries.get(&actor)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// absent → active (или refresh если актор уже отслеживается)
    ///
    /// Возвращает true для нового актора.
    pub fn capture(&mut self, actor: Entity, record: ImpactRecord) -> bool {
        self.entries.insert(actor, record).is_none()
    }

    /// active → absent для ушедших/исчезнувших акторов
    ///
    /// Read pass собирает список, удаление: отдельным проходом.
    pub fn sweep(&mut self, locator: &dyn ActorLocator, center_of_mass: Vec3, release_factor: f32) -> Vec<Entity> {
        let released: Vec<Entity> = self
            .entries
            .iter()
            .filter(|(actor, record)| match locator.actor_position(**actor) {
                None => true,
                Some(position) => position.distance(center_of_mass) > record.capture_distance * release_factor,
            })
            .map(|(actor, _)| *actor)
            .collect();

        for actor in &released {
            self.entries.remove(actor);
        }
        released
    }

    /// Длящийся толчок: direction/3 × vertex push на вершины грани,
    /// direction × global push в глобальную силу
    pub fn contributions(
        &self,
        topology: &MeshTopology,
        config: &BubbleConfig,
        modifiers: &dyn PushStrengthModifier,
    ) -> ImpactContribution {
        let mut contribution = ImpactContribution::default();

        for (actor, record) in &self.entries {
            let Some(face) = topology.face(record.face) else {
                continue;
            };

            let vertex_push = record.direction / 3.0
                * config.impact_vertex_push_strength
                * modifiers.vertex_push_multiplier(*actor);
            for vertex in face {
                contribution.vertex_forces.push((vertex, vertex_push));
            }

            contribution.global_force +=
                record.direction * config.impact_global_push_strength * modifiers.global_push_multiplier(*actor);
        }

        contribution
    }
}
