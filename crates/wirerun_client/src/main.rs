use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use wirerun_simulation::SimulationPlugin;

mod controls;
mod rendering;
mod scene;

use controls::ControlsPlugin;
use rendering::RenderingSyncPlugin;

/// Gameplay tuning рядом с бинарником; отсутствует → defaults
const CONFIG_PATH: &str = "assets/gameplay.json";

fn main() {
    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "WIRERUN - Grapple Prototype".to_string(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Rapier в FixedUpdate - тот же тик, что и simulation
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        // Simulation (grapple, locomotion, chase camera)
        .add_plugins(SimulationPlugin::with_config(CONFIG_PATH))
        // Keyboard/mouse → ControlEvent, MoveAxis, LookAxis
        .add_plugins(ControlsPlugin)
        // Rendering sync (ropes, FOV, boost)
        .add_plugins(RenderingSyncPlugin)
        // Setup scene
        .add_systems(Startup, scene::setup_scene)
        .run();
}
