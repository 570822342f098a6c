//! Physics collaborator
//!
//! Gameplay код видит физику только через traits:
//! - `RayCaster` (grapple target)
//! - `GroundProbe` (locomotion)
//! - `SphereCaster` (camera collision)
//! - `SpringJointBackend` (wires, реализован `TetherSet`)
//!
//! Источник queries выбирается в runtime: Rapier context если он есть,
//! иначе `StaticWorld` resource (headless), иначе пустой мир.

pub mod headless;
pub mod rapier;
pub mod static_world;

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, RapierContext};

use crate::camera::SphereCaster;
use crate::grapple::{RayCaster, RayHit, TargetMask};
use crate::locomotion::GroundProbe;

pub use headless::{integrate_headless_bodies, spawn_headless_player, HeadlessBody};
pub use rapier::RapierQueries;
pub use static_world::{StaticBox, StaticWorld};

pub enum PhysicsQueries<'a, 'w> {
    Rapier(RapierQueries<'a, 'w>),
    Static(&'a StaticWorld),
    /// Ни Rapier, ни StaticWorld: все queries промахиваются
    Empty,
}

impl<'a, 'w> PhysicsQueries<'a, 'w> {
    /// Rapier имеет приоритет над StaticWorld
    pub fn resolve(
        rapier: Option<&'a RapierContext<'w>>,
        static_world: Option<&'a StaticWorld>,
        exclude: Option<Entity>,
    ) -> Self {
        match (rapier, static_world) {
            (Some(context), _) => PhysicsQueries::Rapier(RapierQueries::new(context, exclude)),
            (None, Some(world)) => PhysicsQueries::Static(world),
            (None, None) => PhysicsQueries::Empty,
        }
    }
}

/// Обнуляет `ExternalForce` в начале тика
///
/// Locomotion и tether системы дальше только добавляют свои вклады,
/// поэтому сила не копится между тиками у тел без locomotion.
pub fn reset_external_forces(mut forces: Query<&mut ExternalForce>) {
    for mut force in forces.iter_mut() {
        if force.force != Vec3::ZERO || force.torque != Vec3::ZERO {
            *force = ExternalForce::default();
        }
    }
}

impl RayCaster for PhysicsQueries<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_range: f32, mask: TargetMask) -> Option<RayHit> {
        match self {
            PhysicsQueries::Rapier(queries) => queries.cast_ray(origin, direction, max_range, mask),
            PhysicsQueries::Static(world) => world.cast_ray(origin, direction, max_range, mask),
            PhysicsQueries::Empty => None,
        }
    }
}

impl GroundProbe for PhysicsQueries<'_, '_> {
    fn probe_ground(&self, origin: Vec3, radius: f32, max_distance: f32) -> bool {
        match self {
            PhysicsQueries::Rapier(queries) => queries.probe_ground(origin, radius, max_distance),
            PhysicsQueries::Static(world) => world.probe_ground(origin, radius, max_distance),
            PhysicsQueries::Empty => false,
        }
    }
}

impl SphereCaster for PhysicsQueries<'_, '_> {
    fn sphere_cast(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32> {
        match self {
            PhysicsQueries::Rapier(queries) => queries.sphere_cast(origin, radius, direction, max_distance),
            PhysicsQueries::Static(world) => world.sphere_cast(origin, radius, direction, max_distance),
            PhysicsQueries::Empty => None,
        }
    }
}
