//! Grapple system - две руки, wires, reel, верёвки
//!
//! Чистые типы (без ECS):
//! - `target` - куда цепляется крюк
//! - `wire` - WireConstraint + spring primitive
//! - `reel` - Manual / Auto политики
//! - `rope` - провисающая дуга для визуала
//! - `rig` - per-hand state machine (`GrappleRig` component)
//!
//! ECS слой - `systems` + `GrapplePlugin`.

pub mod hand;
pub mod reel;
pub mod rig;
pub mod rope;
pub mod systems;
pub mod target;
pub mod wire;

#[cfg(test)]
mod rig_tests;

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;

pub use hand::{Hand, HandSlots};
pub use reel::{auto_reel, manual_reel, velocity_toward_anchor, ReelController, ReelInput, ReelMode};
pub use rig::{BodyPose, FireOutcome, FireSettings, GrappleRig};
pub use rope::{sample_rope, RopeCurveRenderer, RopeSample, RopeVisual};
pub use systems::{
    apply_tether_forces, clear_orphaned_tethers, handle_control_events, handle_release_all, reel_wires,
    update_rope_visuals,
};
pub use target::{find_target, RayCaster, RayHit, TargetMask};
pub use wire::{tether_force, JointHandle, SpringJointBackend, SpringJointParams, TetherSet, WireConstraint};

// Headless мир удобен в тестах rig'а
pub use crate::physics::{StaticBox, StaticWorld};

use crate::SimulationSet;

/// Plugin для grapple систем
///
/// FixedUpdate: input events (+ teardown снятых rig'ов) → reel → tether forces.
/// PostUpdate: точки верёвок (late tick, после всех simulation тиков кадра).
pub struct GrapplePlugin;

impl Plugin for GrapplePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Hand>()
            .register_type::<ReelMode>()
            .add_systems(
                FixedUpdate,
                (
                    (handle_control_events, handle_release_all, clear_orphaned_tethers)
                        .chain()
                        .in_set(SimulationSet::Control),
                    reel_wires.in_set(SimulationSet::Reel),
                    apply_tether_forces.in_set(SimulationSet::Forces),
                ),
            )
            .add_systems(PostUpdate, update_rope_visuals.after(PhysicsSet::Writeback));
    }
}
