//! Camera ↔ simulation coordinator
//!
//! Порядок за кадр:
//! 1. FixedUpdate: `sync_camera_to_controls` - aim и camera basis в тело,
//!    до любых fire / reel / locomotion
//! 2. PostUpdate: `update_chase_camera` - камера догоняет тело

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ReadRapierContext, Velocity};

use super::chase::ChaseCamera;
use crate::grapple::GrappleRig;
use crate::input::LookAxis;
use crate::locomotion::LocomotionController;
use crate::physics::{PhysicsQueries, StaticWorld};

/// Push кадровых входов камеры в rig и locomotion
pub fn sync_camera_to_controls(
    cameras: Query<&ChaseCamera>,
    mut bodies: Query<(&mut GrappleRig, Option<&mut LocomotionController>)>,
) {
    for camera in cameras.iter() {
        let Some(target) = camera.target else {
            continue;
        };
        let Ok((mut rig, locomotion)) = bodies.get_mut(target) else {
            continue;
        };

        rig.set_aim_direction(camera.aim_direction());
        if let Some(mut locomotion) = locomotion {
            locomotion.set_camera_basis(camera.forward(), camera.right());
        }
    }
}

/// Look input + follow тела + collision
pub fn update_chase_camera(
    mut cameras: Query<(&mut ChaseCamera, &mut LookAxis, &mut Transform)>,
    targets: Query<(&Transform, Option<&Velocity>), Without<ChaseCamera>>,
    rapier: ReadRapierContext,
    static_world: Option<Res<StaticWorld>>,
    time: Res<Time>,
) {
    let context = rapier.single().ok();
    let delta = time.delta_secs();

    for (mut camera, mut look, mut transform) in cameras.iter_mut() {
        if look.0 != Vec2::ZERO {
            camera.apply_look(look.0);
            look.0 = Vec2::ZERO;
        }

        let Some(target) = camera.target else {
            continue;
        };
        let Ok((target_transform, velocity)) = targets.get(target) else {
            continue;
        };

        let velocity = velocity.map(|v| v.linvel).unwrap_or(Vec3::ZERO);
        let queries = PhysicsQueries::resolve(context.as_ref(), static_world.as_deref(), Some(target));
        camera.update(delta, target_transform.translation, velocity, &queries);

        *transform = camera.transform();
    }
}
