//! Ray target finder - куда цепляется крюк
//!
//! Physics collaborator даёт `RayCaster` (Rapier в клиенте, `StaticWorld`
//! в headless, см. `crate::physics`). Сама логика выбора цели - чистая
//! функция `find_target`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Битовая маска collision layers, в которые можно стрелять
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetMask(pub u32);

impl TargetMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub fn matches(self, layers: u32) -> bool {
        self.0 & layers != 0
    }
}

impl Default for TargetMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Расстояние от origin вдоль луча
    pub distance: f32,
}

/// Physics query: ближайшее blocking попадание луча
pub trait RayCaster {
    /// `direction` уже нормализован
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_range: f32, mask: TargetMask) -> Option<RayHit>;
}

/// Ближайшая точка поверхности в `[0, max_range]`, совпадающая с `mask`
///
/// Промах - не ошибка, просто `None`.
pub fn find_target<C: RayCaster + ?Sized>(
    caster: &C,
    origin: Vec3,
    direction: Vec3,
    max_range: f32,
    mask: TargetMask,
) -> Option<Vec3> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO || max_range < 0.0 {
        return None;
    }

    caster
        .cast_ray(origin, direction, max_range, mask)
        .filter(|hit| (0.0..=max_range).contains(&hit.distance))
        .map(|hit| hit.point)
}
