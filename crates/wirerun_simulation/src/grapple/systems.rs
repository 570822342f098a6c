//! Grapple ECS systems
//!
//! Все simulation системы читают `Time<Fixed>` и идут до Rapier step.
//! Physics queries: Rapier context если он есть, иначе `StaticWorld`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, ReadRapierContext, Velocity};

use super::rig::{BodyPose, GrappleRig};
use super::rope::RopeVisual;
use super::wire::TetherSet;
use crate::input::{ControlAction, ControlEvent, ReleaseAllWires};
use crate::locomotion::LocomotionController;
use crate::logger;
use crate::physics::{PhysicsQueries, StaticWorld};

/// Edge-triggered input → fire / release / reel / boost
pub fn handle_control_events(
    mut events: EventReader<ControlEvent>,
    rapier: ReadRapierContext,
    static_world: Option<Res<StaticWorld>>,
    mut bodies: Query<(
        &Transform,
        &mut GrappleRig,
        &mut TetherSet,
        Option<&mut LocomotionController>,
    )>,
) {
    let context = rapier.single().ok();

    for event in events.read() {
        let Ok((transform, mut rig, mut tethers, locomotion)) = bodies.get_mut(event.entity) else {
            continue;
        };
        let pressed = event.edge.is_pressed();

        match event.action {
            ControlAction::Fire(hand) if pressed => {
                let queries = PhysicsQueries::resolve(context.as_ref(), static_world.as_deref(), Some(event.entity));
                rig.fire(hand, &BodyPose::from(transform), &queries, &mut *tethers);
            }
            ControlAction::Fire(hand) => {
                rig.release(hand, &mut *tethers);
            }
            ControlAction::Reel => {
                rig.set_manual_reel(pressed);
                if let Some(mut locomotion) = locomotion {
                    locomotion.set_reel_held(pressed);
                }
            }
            ControlAction::Boost => {
                if let Some(mut locomotion) = locomotion {
                    locomotion.set_boost_held(pressed);
                }
            }
        }
    }
}

/// Cleanup: отпустить оба wires (смена режима)
pub fn handle_release_all(
    mut events: EventReader<ReleaseAllWires>,
    mut bodies: Query<(&mut GrappleRig, &mut TetherSet)>,
) {
    for event in events.read() {
        if let Ok((mut rig, mut tethers)) = bodies.get_mut(event.entity) {
            rig.release_all(&mut *tethers);
        }
    }
}

/// Teardown: rig снят с тела, его joints больше некому отпускать
///
/// Despawn удаляет TetherSet вместе с rig'ом; здесь случай
/// `remove::<GrappleRig>()`, когда тело остаётся.
pub fn clear_orphaned_tethers(
    mut removed: RemovedComponents<GrappleRig>,
    mut bodies: Query<(&mut TetherSet, Option<&mut RopeVisual>), Without<GrappleRig>>,
) {
    for entity in removed.read() {
        let Ok((mut tethers, visual)) = bodies.get_mut(entity) else {
            continue;
        };

        if !tethers.is_empty() {
            logger::log_info(&format!(
                "Grapple: rig removed from {:?}, dropping {} tethers",
                entity,
                tethers.len()
            ));
            tethers.clear();
        }
        if let Some(mut visual) = visual {
            *visual = RopeVisual::default();
        }
    }
}

/// Simulation tick: reel всех wires по velocity snapshot тела
pub fn reel_wires(
    mut bodies: Query<(&Transform, &Velocity, &mut GrappleRig, &mut TetherSet)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (transform, velocity, mut rig, mut tethers) in bodies.iter_mut() {
        rig.tick(delta, velocity.linvel, transform.translation, &mut *tethers);
    }
}

/// Spring forces добавляются к силе этого тика (сброшена в `SimulationSet::Sense`)
pub fn apply_tether_forces(mut bodies: Query<(&Transform, &Velocity, &TetherSet, &mut ExternalForce)>) {
    for (transform, velocity, tethers, mut force) in bodies.iter_mut() {
        if tethers.is_empty() {
            continue;
        }
        force.force += tethers.total_force(transform.translation, transform.rotation, velocity.linvel);
    }
}

/// Late tick: верёвки от текущего origin до якоря
pub fn update_rope_visuals(mut bodies: Query<(&Transform, &GrappleRig, &mut RopeVisual)>) {
    for (transform, rig, mut visual) in bodies.iter_mut() {
        visual.lines = rig.late_tick(&BodyPose::from(transform));
    }
}
