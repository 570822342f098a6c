//! Locomotion - бег, прыжок, air control и gas поверх grapple wires
//!
//! Ground probe приходит от physics collaborator'а (`GroundProbe`),
//! здесь только решения по движению.

pub mod controller;
pub mod systems;

use bevy::prelude::*;

pub use controller::{
    blend_ground_velocity, heading_rotation, is_walkable_normal, turn_toward, BoostVisual, GroundProbe, LocomotionController,
    LocomotionFrame, LocomotionOutput,
};
pub use systems::{detect_ground, drive_locomotion};

use crate::SimulationSet;

pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<LocomotionController>()
            .register_type::<BoostVisual>()
            .add_systems(
                FixedUpdate,
                (
                    detect_ground.in_set(SimulationSet::Sense),
                    drive_locomotion.in_set(SimulationSet::Drive),
                ),
            );
    }
}
