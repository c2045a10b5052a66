//! SoftBody: один пузырь целиком (state + толчки + шум + конфиг)
//!
//! Порядок тика (строго последовательно):
//! 1. update_center_of_mass
//! 2. big noise update + сэмплинг jitter
//! 3. sweep ImpactTracker (ушедшие акторы удаляются до force pass)
//! 4. compute_forces (read-only)
//! 5. integrate + collision response
//! 6. нормали, массы, центр масс, радиус для рендера и следующего тика
//!
//! После `pop` пузырь в терминальном состоянии: тики no-op.

use bevy::prelude::*;

use super::collision::CollisionQuery;
use super::config::{BubbleConfig, ConfigError};
use super::forces::{compute_forces, ForceInputs};
use super::hooks::{ActorLocator, DefaultPushModifier, PushStrengthModifier};
use super::impact::{ImpactRecord, ImpactTracker};
use super::integrator::integrate;
use super::noise::{BubbleRng, NoiseState};
use super::render::{BubbleTint, RenderSnapshot};
use super::state::SoftBodyState;
use crate::logger::{log, log_info, log_warning};
use crate::math::{ray_triangle_intersection, safe_normalize};
use crate::mesh::SphereMesh;

/// Длина пробы для поиска грани (× actual radius) если notifier её не знает
pub const HIT_FACE_PROBE_FRACTION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BubbleLifecycle {
    #[default]
    Active,
    Popped,
}

/// Уведомление о столкновении внешнего тела с пузырём
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitNotification {
    /// Кто ударил
    pub actor: Entity,
    /// Грань пузыря (None: notifier не смог определить)
    pub face: Option<usize>,
    /// Точка контакта
    pub point: Vec3,
    /// Нормаль контакта (для поиска грани)
    pub normal: Vec3,
    /// Направление (и величина) толчка
    pub direction: Vec3,
}

/// Результат одного тика
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub time_step: f32,
    pub bounces: usize,
    pub noise_resampled: bool,
    /// Акторы, чьи толчки закончились в этом тике
    pub released: Vec<Entity>,
}

/// Импульс лопания для одного внешнего тела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopImpulse {
    pub entity: Entity,
    pub impulse: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopOutcome {
    pub center: Vec3,
    pub radius: f32,
    /// max(radius - threshold, 0)^2.5 × scale
    pub strength: f32,
    pub impulses: Vec<PopImpulse>,
}

pub struct SoftBody {
    config: BubbleConfig,
    state: SoftBodyState,
    impacts: ImpactTracker,
    noise: NoiseState,
    rng: BubbleRng,
    modifiers: Box<dyn PushStrengthModifier>,
    tint: BubbleTint,
    lifecycle: BubbleLifecycle,
    entity: Option<Entity>,
}

impl std::fmt::Debug for SoftBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftBody")
            .field("vertices", &self.state.vertex_count())
            .field("center_of_mass", &self.state.center_of_mass())
            .field("actual_radius", &self.state.actual_radius())
            .field("impacts", &self.impacts.len())
            .field("lifecycle", &self.lifecycle)
            .field("seed", &self.rng.seed())
            .finish()
    }
}

impl SoftBody {
    /// Генерирует пузырь вокруг `origin`
    pub fn new(config: BubbleConfig, origin: Vec3, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = BubbleRng::new(seed);
        let tint = if config.randomize_color {
            BubbleTint::random(&mut rng)
        } else {
            BubbleTint::default()
        };

        let mesh = SphereMesh::sphere(config.radius, config.subdivisions, config.base);
        let state = SoftBodyState::from_mesh(&mesh, config.radius, origin);

        Ok(Self {
            config,
            state,
            impacts: ImpactTracker::new(),
            noise: NoiseState::default(),
            rng,
            modifiers: Box::new(DefaultPushModifier),
            tint,
            lifecycle: BubbleLifecycle::Active,
            entity: None,
        })
    }

    pub fn with_modifiers(mut self, modifiers: Box<dyn PushStrengthModifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Собственный entity (исключается из collision queries)
    pub fn set_entity(&mut self, entity: Entity) {
        self.entity = Some(entity);
    }

    pub fn config(&self) -> &BubbleConfig {
        &self.config
    }

    pub fn state(&self) -> &SoftBodyState {
        &self.state
    }

    pub fn impacts(&self) -> &ImpactTracker {
        &self.impacts
    }

    pub fn noise(&self) -> &NoiseState {
        &self.noise
    }

    pub fn tint(&self) -> BubbleTint {
        self.tint
    }

    pub fn lifecycle(&self) -> BubbleLifecycle {
        self.lifecycle
    }

    pub fn is_popped(&self) -> bool {
        self.lifecycle == BubbleLifecycle::Popped
    }

    /// Пересоздаёт сетку и состояние из конфига (толчки и шум сбрасываются)
    pub fn regenerate(&mut self, origin: Vec3) {
        let mesh = SphereMesh::sphere(self.config.radius, self.config.subdivisions, self.config.base);
        self.state = SoftBodyState::from_mesh(&mesh, self.config.radius, origin);
        self.impacts.clear();
        self.noise = NoiseState::default();
        self.lifecycle = BubbleLifecycle::Active;
    }

    pub fn randomize_color(&mut self) {
        self.tint = BubbleTint::random(&mut self.rng);
    }

    /// Один тик симуляции. `delta`: внешний dt (обрезается внутри).
    pub fn tick(
        &mut self,
        delta: f32,
        collision: &dyn CollisionQuery,
        locator: &dyn ActorLocator,
    ) -> TickReport {
        let time_step = self.config.clamp_time_step(delta);
        if self.is_popped() || time_step <= 0.0 {
            return TickReport::default();
        }

        self.state.update_center_of_mass();

        let noise_resampled = self
            .noise
            .update(delta.max(0.0), self.config.big_noise_change_interval, &mut self.rng);
        let jitter = NoiseState::sample_jitter(
            &mut self.rng,
            self.state.vertex_count(),
            self.config.force_noise_magnitude,
        );

        let released = self.impacts.sweep(
            locator,
            self.state.center_of_mass(),
            self.config.impact_release_factor,
        );
        if noise_resampled {
            log(&format!("🫧 Bubble big noise resampled: {:?}", self.noise.big_noise_vector));
        }
        for actor in &released {
            log(&format!("🫧 Bubble released push from {:?}", actor));
        }

        let contribution = self
            .impacts
            .contributions(self.state.topology(), &self.config, self.modifiers.as_ref());

        let output = compute_forces(
            &self.state,
            &self.config,
            &ForceInputs {
                jitter: &jitter,
                big_noise_vector: self.noise.big_noise_vector,
                impacts: &contribution,
                time_step,
            },
        );

        // Глобальная сила потреблена; остаётся только добавка от длящихся толчков
        self.state.global_force = output.carried_global_force;

        let integration = integrate(
            &mut self.state,
            &output.forces,
            time_step,
            &self.config,
            collision,
            self.entity,
        );

        self.state.update_normals();
        // Метрика площади для рендера по новым позициям
        self.state.update_vertex_masses();
        self.state.update_center_of_mass();
        self.state.update_actual_radius();

        TickReport {
            time_step: integration.time_step,
            bounces: integration.bounces,
            noise_resampled,
            released,
        }
    }

    /// absent → active: мгновенный импульс + запись в ImpactTracker
    ///
    /// Возвращает грань, к которой применён толчок, или None если грань
    /// найти не удалось (событие отброшено).
    pub fn on_hit(&mut self, hit: &HitNotification, locator: &dyn ActorLocator) -> Option<usize> {
        if self.is_popped() {
            return None;
        }

        let Some(face_index) = self.resolve_face(hit) else {
            log_warning(&format!(
                "Bubble hit from {:?} at {:?}: no face resolved, event dropped",
                hit.actor, hit.point
            ));
            return None;
        };
        let face = self.state.topology().face(face_index)?;

        let vertex_push = hit.direction / 3.0
            * self.config.impact_vertex_push_strength
            * self.modifiers.vertex_push_multiplier(hit.actor);
        for vertex in face {
            self.state.push_vertex(vertex, vertex_push);
        }
        self.state.global_force +=
            hit.direction * self.config.impact_global_push_strength * self.modifiers.global_push_multiplier(hit.actor);

        let actor_position = locator.actor_position(hit.actor).unwrap_or(hit.point);
        let record = ImpactRecord {
            face: face_index,
            direction: hit.direction,
            capture_distance: actor_position.distance(self.state.center_of_mass()),
        };

        if self.impacts.capture(hit.actor, record) {
            log(&format!(
                "🫧 Bubble captured push from {:?} (face {}, distance {:.1})",
                hit.actor, face_index, record.capture_distance
            ));
        }

        Some(face_index)
    }

    /// Грань из уведомления, иначе: короткий луч вдоль нормали контакта
    fn resolve_face(&self, hit: &HitNotification) -> Option<usize> {
        let topology = self.state.topology();
        if let Some(face) = hit.face.filter(|&face| face < topology.faces().len()) {
            return Some(face);
        }

        let mut normal = safe_normalize(hit.normal);
        if normal == Vec3::ZERO {
            normal = safe_normalize(hit.point - self.state.center_of_mass());
        }
        if normal == Vec3::ZERO {
            return None;
        }

        let probe = (self.state.actual_radius() * HIT_FACE_PROBE_FRACTION).max(1.0e-3);
        let origin = hit.point - normal * probe;
        let ray = normal * (2.0 * probe);

        // t = 0.5 соответствует самой точке контакта
        (0..topology.faces().len())
            .filter_map(|face| {
                let [v0, v1, v2] = topology.face_positions(self.state.positions(), face);
                ray_triangle_intersection(origin, ray, v0, v1, v2)
                    .filter(|t| *t <= 1.0)
                    .map(|t| (face, (t - 0.5).abs()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(face, _)| face)
    }

    /// Рост пузыря: target radius += amount, давление × (new/old)^4
    ///
    /// Возвращает новый радиус; некорректный результат игнорируется.
    pub fn grow(&mut self, amount: f32) -> Option<f32> {
        let old_radius = self.state.target_radius;
        let new_radius = old_radius + amount;
        if !(new_radius.is_finite() && new_radius > 0.0 && old_radius > 0.0) {
            log_warning(&format!(
                "Bubble growth by {} rejected (radius {} → {})",
                amount, old_radius, new_radius
            ));
            return None;
        }

        self.config.air_pressure_force *= (new_radius / old_radius).powi(4);
        self.state.target_radius = new_radius;

        log_info(&format!(
            "🫧 Bubble grew to radius {:.1} (pressure {:.0})",
            new_radius, self.config.air_pressure_force
        ));
        Some(new_radius)
    }

    /// Сила взрыва для текущего радиуса
    pub fn pop_strength(&self) -> f32 {
        (self.state.actual_radius() - self.config.pop_radius_threshold)
            .max(0.0)
            .powf(2.5)
            * self.config.pop_impulse_scale
    }

    /// Лопание: радиальные импульсы для тел рядом, дальше пузырь мёртв
    pub fn pop(&mut self, collision: &dyn CollisionQuery, locator: &dyn ActorLocator) -> Option<PopOutcome> {
        if self.is_popped() {
            return None;
        }

        let center = self.state.center_of_mass();
        let radius = self.state.actual_radius();
        let strength = self.pop_strength();
        let search_radius = radius * self.config.pop_radius_multiplier;

        let impulses = collision
            .overlap_sphere(center, search_radius, self.entity)
            .into_iter()
            .filter_map(|entity| {
                let position = locator.actor_position(entity)?;
                Some(PopImpulse {
                    entity,
                    impulse: safe_normalize(position - center) * strength,
                })
            })
            .collect::<Vec<_>>();

        self.lifecycle = BubbleLifecycle::Popped;
        self.impacts.clear();

        log_info(&format!(
            "💥 Bubble popped at {:?} (radius {:.1}, strength {:.1}, {} bodies)",
            center,
            radius,
            strength,
            impulses.len()
        ));

        Some(PopOutcome {
            center,
            radius,
            strength,
            impulses,
        })
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            positions: self.state.positions().to_vec(),
            normals: self.state.normals().to_vec(),
            area_metrics: self
                .state
                .area_metrics(self.config.color_metric_min, self.config.color_metric_max),
            tint: self.tint,
        }
    }

    /// Тестовый/отладочный доступ к мутабельному state
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SoftBodyState {
        &mut self.state
    }
}
