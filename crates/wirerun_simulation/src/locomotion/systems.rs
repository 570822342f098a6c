//! Locomotion ECS systems (FixedUpdate, до Rapier step)

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, ReadRapierContext, Velocity};

use super::controller::{BoostVisual, GroundProbe, LocomotionController, LocomotionFrame};
use crate::config::GameplayConfig;
use crate::grapple::{BodyPose, GrappleRig, TetherSet};
use crate::input::MoveAxis;
use crate::physics::{PhysicsQueries, StaticWorld};

/// Ground probe от центра тела вниз, до ступней + skin
pub fn detect_ground(
    rapier: ReadRapierContext,
    static_world: Option<Res<StaticWorld>>,
    config: Res<GameplayConfig>,
    mut bodies: Query<(Entity, &Transform, &mut LocomotionController)>,
) {
    let context = rapier.single().ok();
    let settings = &config.locomotion;
    let probe_distance = settings.ground_probe_distance();

    for (entity, transform, mut controller) in bodies.iter_mut() {
        let queries = PhysicsQueries::resolve(context.as_ref(), static_world.as_deref(), Some(entity));
        let grounded = queries.probe_ground(transform.translation, settings.probe_radius, probe_distance);

        if grounded != controller.grounded {
            controller.grounded = grounded;
        }
    }
}

/// Locomotion step → Velocity / ExternalForce / rotation
///
/// ExternalForce обнулён в `reset_external_forces`; locomotion вклад
/// добавляется здесь, tether силы позже в `apply_tether_forces`.
pub fn drive_locomotion(
    mut bodies: Query<(
        &mut Transform,
        &mut Velocity,
        &mut ExternalForce,
        &MoveAxis,
        &mut LocomotionController,
        &mut GrappleRig,
        &mut TetherSet,
        &mut BoostVisual,
    )>,
    config: Res<GameplayConfig>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut velocity, mut force, axis, mut controller, mut rig, mut tethers, mut boost) in
        bodies.iter_mut()
    {
        let frame = LocomotionFrame {
            dt: delta,
            move_axis: axis.0,
            velocity: velocity.linvel,
            pose: BodyPose::from(&*transform),
        };

        let output = controller.step(&frame, &config.locomotion, &mut rig, &mut *tethers);

        if let Some(linvel) = output.velocity {
            velocity.linvel = linvel;
        }
        force.force += output.force;
        if transform.rotation != output.rotation {
            transform.rotation = output.rotation;
        }
        boost.set_if_neq(BoostVisual {
            active: output.gas_applied,
        });
    }
}
