//! Tests for SoftBody: порядок тика, толчки, рост, лопание.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bevy::prelude::*;

    use crate::bubble::body::{BubbleLifecycle, HitNotification, SoftBody};
    use crate::bubble::collision::NoCollision;
    use crate::bubble::config::{BubbleConfig, ConfigError, MAX_TIME_STEP};
    use crate::bubble::test_support::{actor, locator, quiet_body, FixedOverlap};
    use crate::math::{triangle_center, triangle_normal};
    use crate::mesh::BasePolyhedron;

    const DT: f32 = 1.0 / 60.0;

    fn hit_on_face(actor_id: u32, face: usize) -> HitNotification {
        HitNotification {
            actor: actor(actor_id),
            face: Some(face),
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            direction: Vec3::X,
        }
    }

    fn face_vertices(body: &SoftBody, face: usize) -> [usize; 3] {
        body.state()
            .topology()
            .face(face)
            .unwrap_or_else(|| panic!("face {} exists", face))
    }

    fn noisy_body(seed: u64) -> SoftBody {
        let config = BubbleConfig {
            subdivisions: 2,
            ..default()
        };
        SoftBody::new(config, Vec3::ZERO, seed).unwrap_or_else(|e| panic!("{}", e))
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BubbleConfig {
            radius: -1.0,
            ..default()
        };
        assert!(SoftBody::new(config, Vec3::ZERO, 1).is_err());

        let negative_step = BubbleConfig {
            max_time_step: -0.1,
            ..default()
        };
        assert!(matches!(
            SoftBody::new(negative_step, Vec3::ZERO, 1),
            Err(ConfigError::InvalidTimeStep(_))
        ));
    }

    #[test]
    fn test_quiet_body_stays_at_rest() {
        let mut body = quiet_body(10.0, 2);
        let before = body.state().positions().to_vec();
        let no_actors: HashMap<Entity, Vec3> = HashMap::new();

        for _ in 0..10 {
            body.tick(DT, &NoCollision, &no_actors);
        }

        for (after, before) in body.state().positions().iter().zip(&before) {
            assert!(after.distance(*before) < 1e-3, "drift {:?} → {:?}", before, after);
        }
    }

    #[test]
    fn test_hit_applies_immediate_impulse() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);

        assert_eq!(body.on_hit(&hit_on_face(1, 0), &actors), Some(0));

        // direction/3 × 300 на каждую вершину грани
        let face = face_vertices(&body, 0);
        for vertex in 0..body.state().vertex_count() {
            let velocity = body.state().velocities()[vertex];
            if face.contains(&vertex) {
                assert!((velocity - Vec3::X * 100.0).length() < 1e-4, "vertex {} {:?}", vertex, velocity);
            } else {
                assert_eq!(velocity, Vec3::ZERO);
            }
        }
        assert!((body.state().global_force() - Vec3::X * 75.0).length() < 1e-4);

        let record = body.impacts().get(actor(1)).copied();
        assert!(record.is_some_and(|r| (r.capture_distance - 15.0).abs() < 1e-3));
    }

    #[test]
    fn test_sustained_push_while_actor_near() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(1, 0), &actors);

        let report = body.tick(DT, &NoCollision, &actors);
        assert!(report.released.is_empty());
        assert!(body.impacts().contains(actor(1)));

        // (100 импульс + 75 глобальная + 100·dt длящийся толчок) × damping
        let damping = body.config().velocity_damping;
        let expected = (100.0 + 75.0 + 100.0 * DT) * damping;
        let [vertex, _, _] = face_vertices(&body, 0);
        let velocity = body.state().velocities()[vertex];
        assert!((velocity.x - expected).abs() < 1e-2, "velocity {:?}, expected {}", velocity, expected);

        // Длящийся толчок переносит глобальную силу на следующий тик
        assert!((body.state().global_force() - Vec3::X * 75.0).length() < 1e-4);
    }

    #[test]
    fn test_departed_actor_is_released() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(1, 0), &actors);

        // 1.5 × 15 = 22.5 → 23 уже далеко
        let moved = locator(&[(actor(1), Vec3::X * 23.0)]);
        let report = body.tick(DT, &NoCollision, &moved);

        assert_eq!(report.released, vec![actor(1)]);
        assert!(body.impacts().is_empty());

        // Только импульс удара и глобальная сила, без длящегося вклада
        let damping = body.config().velocity_damping;
        let [vertex, _, _] = face_vertices(&body, 0);
        let velocity = body.state().velocities()[vertex];
        assert!((velocity.x - 175.0 * damping).abs() < 1e-2, "velocity {:?}", velocity);
        assert_eq!(body.state().global_force(), Vec3::ZERO);
    }

    #[test]
    fn test_despawned_actor_is_released() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(4), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(4, 2), &actors);

        let gone: HashMap<Entity, Vec3> = HashMap::new();
        let report = body.tick(DT, &NoCollision, &gone);

        assert_eq!(report.released, vec![actor(4)]);
        assert!(body.impacts().is_empty());
    }

    #[test]
    fn test_repeated_hit_refreshes_record() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(1, 0), &actors);
        body.on_hit(&hit_on_face(1, 3), &actors);

        assert_eq!(body.impacts().len(), 1);
        assert_eq!(body.impacts().get(actor(1)).map(|r| r.face), Some(3));
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut body = quiet_body(10.0, 1);
        let report = body.tick(1.0, &NoCollision, &HashMap::new());

        assert!(report.time_step <= MAX_TIME_STEP);
        assert!((report.time_step - 1.0 / 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_delta_is_noop() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(1, 0), &actors);
        let before = body.state().positions().to_vec();

        let report = body.tick(0.0, &NoCollision, &actors);
        assert_eq!(report.time_step, 0.0);
        assert_eq!(body.state().positions(), before.as_slice());

        body.tick(f32::NAN, &NoCollision, &actors);
        assert_eq!(body.state().positions(), before.as_slice());
    }

    #[test]
    fn test_unknown_face_resolved_by_probe() {
        let mut body = quiet_body(10.0, 1);
        let target = 5;
        let [v0, v1, v2] = body.state().topology().face_positions(body.state().positions(), target);

        let hit = HitNotification {
            actor: actor(2),
            face: None,
            point: triangle_center(v0, v1, v2),
            normal: triangle_normal(v0, v1, v2),
            direction: Vec3::NEG_Y,
        };

        assert_eq!(body.on_hit(&hit, &HashMap::new()), Some(target));
        assert!(body.impacts().contains(actor(2)));
    }

    #[test]
    fn test_unresolved_hit_is_dropped() {
        let mut body = quiet_body(10.0, 1);
        let hit = HitNotification {
            actor: actor(2),
            face: None,
            point: Vec3::X * 1000.0,
            normal: Vec3::X,
            direction: Vec3::NEG_X,
        };

        assert_eq!(body.on_hit(&hit, &HashMap::new()), None);
        assert!(body.impacts().is_empty());
        assert!(body.state().velocities().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_grow_scales_pressure() {
        let config = BubbleConfig {
            radius: 10.0,
            subdivisions: 1,
            air_pressure_force: 100.0,
            ..BubbleConfig::quiet()
        };
        let mut body = SoftBody::new(config, Vec3::ZERO, 7).unwrap_or_else(|e| panic!("{}", e));

        assert_eq!(body.grow(10.0), Some(20.0));
        // (20/10)^4 = 16
        assert!((body.config().air_pressure_force - 1600.0).abs() < 1e-2);
        assert_eq!(body.state().target_radius(), 20.0);
        assert!((body.state().rest_length_scale() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_growth_rejected() {
        let mut body = quiet_body(10.0, 1);

        assert_eq!(body.grow(-10.0), None);
        assert_eq!(body.grow(f32::NAN), None);
        assert_eq!(body.state().target_radius(), 10.0);
    }

    #[test]
    fn test_pop_pushes_nearby_bodies() {
        let mut body = quiet_body(50.0, 1);
        let strength = body.pop_strength();
        // (50 - 30)^2.5
        assert!((strength - 20.0_f32.powf(2.5)).abs() < 1.0, "strength {}", strength);

        // actor(2) без позиции: пропускается
        let overlap = FixedOverlap(vec![actor(1), actor(2)]);
        let actors = locator(&[(actor(1), Vec3::X * 100.0)]);
        let outcome = body
            .pop(&overlap, &actors)
            .unwrap_or_else(|| panic!("first pop succeeds"));

        assert_eq!(outcome.impulses.len(), 1);
        assert_eq!(outcome.impulses[0].entity, actor(1));
        assert!((outcome.impulses[0].impulse.normalize() - Vec3::X).length() < 1e-3);
        assert!((outcome.impulses[0].impulse.length() - strength).abs() < 1e-2);

        assert_eq!(body.lifecycle(), BubbleLifecycle::Popped);
        assert!(body.pop(&overlap, &actors).is_none());
    }

    #[test]
    fn test_small_bubble_pops_without_force() {
        let mut body = quiet_body(10.0, 1);
        assert_eq!(body.pop_strength(), 0.0);

        let outcome = body.pop(&NoCollision, &HashMap::new());
        assert!(outcome.is_some_and(|o| o.strength == 0.0 && o.impulses.is_empty()));
    }

    #[test]
    fn test_popped_body_ignores_ticks_and_hits() {
        let mut body = noisy_body(3);
        body.pop(&NoCollision, &HashMap::new());
        let before = body.state().positions().to_vec();

        let report = body.tick(DT, &NoCollision, &HashMap::new());
        assert_eq!(report.time_step, 0.0);
        assert_eq!(body.state().positions(), before.as_slice());

        let actors = locator(&[(actor(1), Vec3::X * 150.0)]);
        assert_eq!(body.on_hit(&hit_on_face(1, 0), &actors), None);
        assert!(body.impacts().is_empty());
    }

    #[test]
    fn test_render_snapshot_matches_state() {
        let body = quiet_body(10.0, 2);
        let snapshot = body.render_snapshot();
        let count = body.state().vertex_count();

        assert_eq!(snapshot.positions.len(), count);
        assert_eq!(snapshot.normals.len(), count);
        assert_eq!(snapshot.area_metrics.len(), count);
        assert!(snapshot.area_metrics.iter().all(|m| (0.5..=1.5).contains(m)));
        assert!(snapshot
            .normals
            .iter()
            .zip(&snapshot.positions)
            .all(|(n, p)| n.dot(*p) > 0.0));
    }

    #[test]
    fn test_area_metrics_follow_current_positions() {
        let config = BubbleConfig {
            radius: 10.0,
            subdivisions: 1,
            color_metric_min: 0.0,
            color_metric_max: 100.0,
            ..BubbleConfig::quiet()
        };
        let mut body = SoftBody::new(config, Vec3::ZERO, 1).unwrap_or_else(|e| panic!("{}", e));
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(1, 0), &actors);
        body.tick(DT, &NoCollision, &HashMap::new());

        // Грань 0 вдавлена: метрика должна считаться по позициям после тика
        let state = body.state();
        let fresh = state.topology().vertex_areas(state.positions());
        let metrics = body.render_snapshot().area_metrics;
        for (metric, area) in metrics.iter().zip(&fresh) {
            let expected = area / state.average_vertex_area();
            assert!((metric - expected).abs() < 1e-5, "metric {} expected {}", metric, expected);
        }
    }

    #[test]
    fn test_first_tick_resamples_big_noise() {
        let mut body = noisy_body(5);
        let report = body.tick(DT, &NoCollision, &HashMap::new());
        assert!(report.noise_resampled);
        assert!((body.noise().big_noise_vector.length() - 1.0).abs() < 1e-4);
        assert!(body.noise().big_noise_timer > 0.0);
    }

    #[test]
    fn test_regenerate_resets_body() {
        let mut body = quiet_body(10.0, 1);
        let actors = locator(&[(actor(1), Vec3::X * 15.0)]);
        body.on_hit(&hit_on_face(1, 0), &actors);
        body.tick(DT, &NoCollision, &actors);
        body.pop(&NoCollision, &actors);

        body.regenerate(Vec3::Y * 5.0);

        assert_eq!(body.lifecycle(), BubbleLifecycle::Active);
        assert!(body.impacts().is_empty());
        assert!(body.state().velocities().iter().all(|v| *v == Vec3::ZERO));
        assert!((body.state().center_of_mass() - Vec3::Y * 5.0).length() < 1e-3);
    }

    #[test]
    fn test_octahedron_base_body() {
        let config = BubbleConfig {
            base: BasePolyhedron::Octahedron,
            subdivisions: 2,
            radius: 5.0,
            ..BubbleConfig::quiet()
        };
        let body = SoftBody::new(config, Vec3::ZERO, 1).unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(body.state().vertex_count(), 66);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = noisy_body(1234);
        let mut b = noisy_body(1234);
        let no_actors: HashMap<Entity, Vec3> = HashMap::new();

        for _ in 0..30 {
            a.tick(DT, &NoCollision, &no_actors);
            b.tick(DT, &NoCollision, &no_actors);
        }

        assert_eq!(a.state().positions(), b.state().positions());
        assert_eq!(a.noise().big_noise_vector, b.noise().big_noise_vector);
    }

    #[test]
    fn test_different_seed_diverges() {
        let mut a = noisy_body(1);
        let mut b = noisy_body(2);
        let no_actors: HashMap<Entity, Vec3> = HashMap::new();

        for _ in 0..5 {
            a.tick(DT, &NoCollision, &no_actors);
            b.tick(DT, &NoCollision, &no_actors);
        }

        assert_ne!(a.state().positions(), b.state().positions());
    }

    #[test]
    fn test_randomized_tint_is_seeded() {
        let config = BubbleConfig {
            subdivisions: 0,
            randomize_color: true,
            ..BubbleConfig::quiet()
        };
        let a = SoftBody::new(config.clone(), Vec3::ZERO, 99).unwrap_or_else(|e| panic!("{}", e));
        let b = SoftBody::new(config, Vec3::ZERO, 99).unwrap_or_else(|e| panic!("{}", e));

        assert_eq!(a.tint(), b.tint());
        assert!((0.0..360.0).contains(&a.tint().hue));
    }
}
