//! Chase camera + coordinator
//!
//! Камера - источник aim direction для крюков и camera-relative
//! basis для движения. Пушит их в тело через `sync_camera_to_controls`.

pub mod chase;
pub mod systems;

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;

pub use chase::{smooth_damp, smooth_damp_vec3, ChaseCamera, SphereCaster};
pub use systems::{sync_camera_to_controls, update_chase_camera};

use crate::config::GameplayConfig;
use crate::SimulationSet;

pub struct ChaseCameraPlugin;

impl Plugin for ChaseCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, sync_camera_to_controls.in_set(SimulationSet::Coordinate))
            .add_systems(
                PostUpdate,
                update_chase_camera
                    .after(PhysicsSet::Writeback)
                    .before(bevy::transform::TransformSystem::TransformPropagate),
            );
    }
}

/// Камера, следующая за `target`. Render компоненты (Camera3d) добавляет клиент.
pub fn spawn_chase_camera(commands: &mut Commands, target: Entity, config: &GameplayConfig) -> Entity {
    commands
        .spawn(ChaseCamera::new(Some(target), config.camera.clone()))
        .id()
}
