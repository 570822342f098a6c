//! Rapier queries - ray/shape casts через `RapierContext`
//!
//! Тело, которое стреляет, исключается из запросов (иначе луч
//! попадает в собственный capsule collider).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::camera::SphereCaster;
use crate::grapple::{RayCaster, RayHit, TargetMask};
use crate::locomotion::{is_walkable_normal, GroundProbe};

pub struct RapierQueries<'a, 'w> {
    pub context: &'a RapierContext<'w>,
    pub exclude: Option<Entity>,
}

impl<'a, 'w> RapierQueries<'a, 'w> {
    pub fn new(context: &'a RapierContext<'w>, exclude: Option<Entity>) -> Self {
        Self { context, exclude }
    }

    fn filter(&self, mask: TargetMask) -> QueryFilter<'static> {
        let mut filter = QueryFilter::default()
            .exclude_sensors()
            .groups(CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask.0)));

        if let Some(entity) = self.exclude {
            filter = filter.exclude_rigid_body(entity);
        }

        filter
    }

    /// (time of impact, нормаль поверхности, в которую попали)
    fn cast_ball(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<(f32, Option<Vec3>)> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ball = Collider::ball(radius);
        self.context
            .cast_shape(
                origin,
                Quat::IDENTITY,
                direction,
                &*ball.raw,
                ShapeCastOptions {
                    max_time_of_impact: max_distance,
                    stop_at_penetration: false,
                    ..default()
                },
                self.filter(TargetMask::ALL),
            )
            .map(|(_, hit)| (hit.time_of_impact, hit.details.map(|details| details.normal1)))
    }
}

impl RayCaster for RapierQueries<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_range: f32, mask: TargetMask) -> Option<RayHit> {
        self.context
            .cast_ray_and_get_normal(origin, direction, max_range, true, self.filter(mask))
            .map(|(_, intersection)| RayHit {
                point: intersection.point,
                normal: intersection.normal,
                distance: intersection.time_of_impact,
            })
    }
}

impl GroundProbe for RapierQueries<'_, '_> {
    fn probe_ground(&self, origin: Vec3, radius: f32, max_distance: f32) -> bool {
        // Penetration (toi 0) и стены не считаются опорой
        self.cast_ball(origin, radius, Vec3::NEG_Y, max_distance)
            .is_some_and(|(distance, normal)| distance > 0.0 && normal.is_some_and(is_walkable_normal))
    }
}

impl SphereCaster for RapierQueries<'_, '_> {
    fn sphere_cast(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32> {
        self.cast_ball(origin, radius, direction, max_distance)
            .map(|(distance, _)| distance)
    }
}
