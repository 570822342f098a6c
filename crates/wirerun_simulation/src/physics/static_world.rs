//! Headless physics world: набор static boxes
//!
//! Используется когда Rapier не подключен (headless бинарник, тесты).
//! Все queries - аналитические slab тесты, без broad phase.

use bevy::prelude::*;

use crate::camera::SphereCaster;
use crate::grapple::{RayCaster, RayHit, TargetMask};
use crate::locomotion::{is_walkable_normal, GroundProbe};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBox {
    pub min: Vec3,
    pub max: Vec3,
    pub layers: u32,
}

impl StaticBox {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
            layers: u32::MAX,
        }
    }

    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Slab test. Возвращает (distance, normal) входа луча в box,
    /// раздутый на `inflate`. Origin внутри box → попадание на distance 0.
    fn intersect(&self, origin: Vec3, direction: Vec3, inflate: f32) -> Option<(f32, Vec3)> {
        let min = self.min - Vec3::splat(inflate);
        let max = self.max + Vec3::splat(inflate);

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut normal = -direction;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];

            if d.abs() < 1e-8 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t1 = (min[axis] - o) * inv;
            let mut t2 = (max[axis] - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 > t_near {
                t_near = t1;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_far = t_far.min(t2);

            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }

        if t_near < 0.0 {
            Some((0.0, -direction))
        } else {
            Some((t_near, normal))
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct StaticWorld {
    pub boxes: Vec<StaticBox>,
}

impl StaticWorld {
    pub fn new(boxes: Vec<StaticBox>) -> Self {
        Self { boxes }
    }

    pub fn with_box(mut self, static_box: StaticBox) -> Self {
        self.boxes.push(static_box);
        self
    }

    /// Луч, раздутый на `radius` (Minkowski sum box + sphere без скругления углов)
    pub fn cast_inflated(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_range: f32,
        radius: f32,
        mask: TargetMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.boxes
            .iter()
            .filter(|b| mask.matches(b.layers))
            .filter_map(|b| b.intersect(origin, direction, radius))
            .filter(|(distance, _)| *distance <= max_range)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, normal)| RayHit {
                point: origin + direction * distance,
                normal,
                distance,
            })
    }
}

impl RayCaster for StaticWorld {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_range: f32, mask: TargetMask) -> Option<RayHit> {
        self.cast_inflated(origin, direction, max_range, 0.0, mask)
    }
}

impl GroundProbe for StaticWorld {
    fn probe_ground(&self, origin: Vec3, radius: f32, max_distance: f32) -> bool {
        // Каждый box отдельно: стена, в которую тело уже влезло (distance 0),
        // не должна закрывать пол под ним
        self.boxes
            .iter()
            .filter_map(|b| b.intersect(origin, Vec3::NEG_Y, radius))
            .any(|(distance, normal)| distance > 0.0 && distance <= max_distance && is_walkable_normal(normal))
    }
}

impl SphereCaster for StaticWorld {
    fn sphere_cast(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32> {
        self.cast_inflated(origin, direction, max_distance, radius, TargetMask::ALL)
            .map(|hit| hit.distance)
    }
}
