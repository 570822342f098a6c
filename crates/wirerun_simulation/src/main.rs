//! Headless симуляция WIRERUN
//!
//! Скриптованный прогон без рендера: прыжок, зацеп за башню обеими
//! руками, gas к якорям, отпускание. Позиции тела пишутся в лог.
//!
//! Usage: `wirerun_simulation [gameplay.json]`

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use wirerun_simulation::*;

fn build_world() -> StaticWorld {
    StaticWorld::default()
        // Пол, верхняя грань на y = 0
        .with_box(StaticBox::from_center(Vec3::new(0.0, -0.5, 0.0), Vec3::new(200.0, 0.5, 200.0)))
        // Башня впереди (forward = -Z), передняя грань на z = -30
        .with_box(StaticBox::from_center(Vec3::new(0.0, 40.0, -35.0), Vec3::new(10.0, 40.0, 5.0)))
}

fn send(app: &mut App, event: ControlEvent) {
    app.world_mut().send_event(event);
}

fn main() {
    let config_path = std::env::args().nth(1);
    println!("Starting WIRERUN headless simulation");

    let mut app = create_headless_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .insert_resource(build_world())
        .add_plugins(match config_path {
            Some(path) => SimulationPlugin::with_config(path),
            None => SimulationPlugin::default(),
        });

    let config = app.world().resource::<GameplayConfig>().clone();

    let player = {
        let mut commands = app.world_mut().commands();
        let player = spawn_headless_player(&mut commands, Vec3::new(0.0, 0.9, 0.0), &config);
        let camera = spawn_chase_camera(&mut commands, player, &config);
        commands.entity(camera).insert(Name::new("ChaseCamera"));
        player
    };
    app.world_mut().flush();

    // Смотрим чуть вверх на башню
    let mut cameras = app.world_mut().query::<&mut ChaseCamera>();
    for mut camera in cameras.iter_mut(app.world_mut()) {
        camera.set_angles(0.0, -20.0);
    }

    // Запускаем 600 тиков (10 sec при 60Hz)
    for tick in 0..600 {
        match tick {
            10 => send(&mut app, ControlEvent::pressed(player, ControlAction::Reel)),
            12 => send(&mut app, ControlEvent::released(player, ControlAction::Reel)),
            30 => {
                send(&mut app, ControlEvent::pressed(player, ControlAction::Fire(Hand::Left)));
                send(&mut app, ControlEvent::pressed(player, ControlAction::Fire(Hand::Right)));
            }
            40 => send(&mut app, ControlEvent::pressed(player, ControlAction::Boost)),
            240 => send(&mut app, ControlEvent::released(player, ControlAction::Boost)),
            400 => {
                send(&mut app, ControlEvent::released(player, ControlAction::Fire(Hand::Left)));
                send(&mut app, ControlEvent::released(player, ControlAction::Fire(Hand::Right)));
            }
            _ => {}
        }

        app.update();

        if tick % 60 == 0 {
            let world = app.world();
            let (Some(transform), Some(rig), Some(locomotion)) = (
                world.get::<Transform>(player),
                world.get::<GrappleRig>(player),
                world.get::<LocomotionController>(player),
            ) else {
                continue;
            };
            println!(
                "Tick {}: position {:?}, grounded {}, wires {}, gas {}",
                tick,
                transform.translation,
                locomotion.grounded,
                rig.attached().count(),
                locomotion.is_using_gas()
            );
        }
    }

    println!("Simulation complete!");
}
