//! Headless симуляция пузыря
//!
//! Запускает Bevy App без рендера: один пузырь, периодические толчки,
//! рост и лопание в конце. Полезно для проверки стабильности и детерминизма.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bubble_simulation::{
    bubble_snapshot, create_headless_app, log_error, log_info, spawn_bubble, Bubble, BubbleConfig, BubbleHit,
    DeterministicRng, GrowBubble, PopBubble, SimulationPlugin,
};

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        // Каждый update = ровно один fixed tick
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)));

    log_info(&format!("Starting headless bubble simulation (seed: {})", seed));

    // Пузырь + "актор", который будет в него толкаться
    let spawned = app
        .world_mut()
        .resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            spawn_bubble(&mut world.commands(), &mut rng, BubbleConfig::default(), Vec3::ZERO)
        });
    let bubble = match spawned {
        Ok(entity) => entity,
        Err(error) => {
            log_error(&format!("Invalid bubble config: {}", error));
            return;
        }
    };
    let pusher = app
        .world_mut()
        .spawn(GlobalTransform::from_translation(Vec3::new(120.0, 0.0, 0.0)))
        .id();
    app.world_mut().flush();

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        if tick % 200 == 50 {
            app.world_mut().send_event(BubbleHit {
                bubble,
                actor: pusher,
                face: Some(0),
                point: Vec3::new(100.0, 0.0, 0.0),
                normal: Vec3::X,
                direction: Vec3::NEG_X,
            });
        }
        if tick == 500 {
            app.world_mut().send_event(GrowBubble { bubble, amount: 20.0 });
        }
        if tick == 999 {
            app.world_mut().send_event(PopBubble { bubble });
        }

        app.update();

        if tick % 100 == 0 {
            if let Some(body) = app.world().get::<Bubble>(bubble).map(|b| &b.body) {
                log_info(&format!(
                    "Tick {}: center {:?}, radius {:.2}, impacts {}",
                    tick,
                    body.state().center_of_mass(),
                    body.state().actual_radius(),
                    body.impacts().len()
                ));
            }
        }
    }

    // После PopBubble пузыря в мире нет → пустой snapshot
    let snapshot = bubble_snapshot(app.world_mut());
    log_info(&format!("Simulation complete! (bubble popped: {})", snapshot.is_empty()));
}
