//! WireConstraint - одно активное зацепление крюка
//!
//! Архитектура:
//! - `WireConstraint` хранит геометрию и длины (чистые данные)
//! - Физическая пружина живёт в `SpringJointBackend` (external primitive)
//! - Wire владеет handle на joint: create → set_max_distance → destroy
//!
//! Backend в этом crate - `TetherSet`: force-based spring, который работает
//! одинаково поверх Rapier (ExternalForce) и headless интеграции.

use bevy::prelude::*;

/// Handle на joint внутри backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(u32);

/// Параметры spring constraint (как у SpringJoint: сила только вне [min, max])
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringJointParams {
    /// Якорь в world space
    pub anchor: Vec3,
    /// Точка крепления на теле (local space)
    pub local_offset: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub spring: f32,
    pub damper: f32,
}

/// External spring-constraint primitive
pub trait SpringJointBackend {
    fn create_joint(&mut self, params: SpringJointParams) -> JointHandle;
    fn set_max_distance(&mut self, handle: JointHandle, max_distance: f32);
    /// Unknown handle → no-op
    fn destroy_joint(&mut self, handle: JointHandle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireConstraint {
    anchor: Vec3,
    origin_local_offset: Vec3,
    max_length: f32,
    min_length: f32,
    spring: f32,
    damper: f32,
    joint: Option<JointHandle>,
}

impl WireConstraint {
    /// Создаёт wire длиной ровно distance(origin, anchor) и регистрирует joint
    ///
    /// Joint получает min_distance = 0 (не отталкивает), а `min_length`
    /// самого wire - пол для reel, его выставляет rig через `set_min_length`.
    pub fn create<B: SpringJointBackend + ?Sized>(
        backend: &mut B,
        origin_world: Vec3,
        origin_local_offset: Vec3,
        anchor: Vec3,
        spring: f32,
        damper: f32,
    ) -> Self {
        let length = origin_world.distance(anchor);
        let joint = backend.create_joint(SpringJointParams {
            anchor,
            local_offset: origin_local_offset,
            min_distance: 0.0,
            max_distance: length,
            spring,
            damper,
        });

        Self {
            anchor,
            origin_local_offset,
            max_length: length,
            min_length: 0.0,
            spring,
            damper,
            joint: Some(joint),
        }
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn origin_local_offset(&self) -> Vec3 {
        self.origin_local_offset
    }

    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    pub fn min_length(&self) -> f32 {
        self.min_length
    }

    pub fn spring(&self) -> f32 {
        self.spring
    }

    pub fn damper(&self) -> f32 {
        self.damper
    }

    pub fn joint(&self) -> Option<JointHandle> {
        self.joint
    }

    pub fn is_destroyed(&self) -> bool {
        self.joint.is_none()
    }

    /// Текущее расстояние от точки крепления до якоря
    pub fn live_distance(&self, origin_world: Vec3) -> f32 {
        origin_world.distance(self.anchor)
    }

    /// Пол для max_length. Инвариант max_length >= min_length сохраняется.
    pub fn set_min_length<B: SpringJointBackend + ?Sized>(&mut self, backend: &mut B, min_length: f32) {
        self.min_length = min_length.max(0.0);
        if self.max_length < self.min_length {
            self.set_max_length(backend, self.min_length);
        }
    }

    /// Новая max длина, не ниже `min_length`. Синхронизируется с joint.
    pub fn set_max_length<B: SpringJointBackend + ?Sized>(&mut self, backend: &mut B, max_length: f32) {
        self.max_length = max_length.max(self.min_length);
        if let Some(joint) = self.joint {
            backend.set_max_distance(joint, self.max_length);
        }
    }

    /// Освобождает joint. Повторный вызов - no-op.
    pub fn destroy<B: SpringJointBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(joint) = self.joint.take() {
            backend.destroy_joint(joint);
        }
    }
}

/// Force-based spring joints одного тела
///
/// Живёт на том же entity что и `GrappleRig` - despawn тела удаляет
/// и rig, и все joints.
#[derive(Component, Debug, Default, Clone)]
pub struct TetherSet {
    next_id: u32,
    tethers: Vec<(JointHandle, SpringJointParams)>,
}

impl TetherSet {
    pub fn len(&self) -> usize {
        self.tethers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tethers.is_empty()
    }

    /// Уничтожает все joints разом (владельца больше нет)
    pub fn clear(&mut self) {
        self.tethers.clear();
    }

    pub fn get(&self, handle: JointHandle) -> Option<&SpringJointParams> {
        self.tethers.iter().find(|(h, _)| *h == handle).map(|(_, p)| p)
    }

    /// Суммарная сила всех joints на тело
    ///
    /// Rotation тела нужна чтобы перевести local_offset в world space.
    pub fn total_force(&self, body_position: Vec3, body_rotation: Quat, body_velocity: Vec3) -> Vec3 {
        self.tethers
            .iter()
            .map(|(_, params)| {
                let attach = body_position + body_rotation * params.local_offset;
                tether_force(params, attach, body_velocity)
            })
            .sum()
    }
}

impl SpringJointBackend for TetherSet {
    fn create_joint(&mut self, params: SpringJointParams) -> JointHandle {
        let handle = JointHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.tethers.push((handle, params));
        handle
    }

    fn set_max_distance(&mut self, handle: JointHandle, max_distance: f32) {
        if let Some((_, params)) = self.tethers.iter_mut().find(|(h, _)| *h == handle) {
            params.max_distance = max_distance;
        }
    }

    fn destroy_joint(&mut self, handle: JointHandle) {
        self.tethers.retain(|(h, _)| *h != handle);
    }
}

/// Сила spring joint на точку крепления
///
/// Внутри [min, max] сила нулевая (провисшая верёвка). Снаружи -
/// Hooke по растяжению + демпфер по скорости вдоль оси верёвки.
pub fn tether_force(params: &SpringJointParams, attach_world: Vec3, velocity: Vec3) -> Vec3 {
    let to_anchor = params.anchor - attach_world;
    let distance = to_anchor.length();
    if distance <= f32::EPSILON {
        return Vec3::ZERO;
    }

    let stretch = if distance > params.max_distance {
        distance - params.max_distance
    } else if distance < params.min_distance {
        distance - params.min_distance
    } else {
        return Vec3::ZERO;
    };

    let direction = to_anchor / distance;
    // > 0 когда тело приближается к якорю
    let closing_speed = velocity.dot(direction);

    direction * (params.spring * stretch - params.damper * closing_speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_sets_length_to_distance() {
        let mut tethers = TetherSet::default();
        let wire = WireConstraint::create(
            &mut tethers,
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
            500.0,
            50.0,
        );

        assert_eq!(wire.max_length(), 10.0);
        assert_eq!(wire.min_length(), 0.0);
        assert_eq!(tethers.len(), 1);

        let params = tethers.get(wire.joint().unwrap()).unwrap();
        assert_eq!(params.max_distance, 10.0);
        assert_eq!(params.min_distance, 0.0);
        assert_eq!(params.spring, 500.0);
        assert_eq!(params.damper, 50.0);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut tethers = TetherSet::default();
        let mut wire = WireConstraint::create(&mut tethers, Vec3::ZERO, Vec3::ZERO, Vec3::X * 4.0, 1.0, 1.0);

        wire.destroy(&mut tethers);
        assert!(wire.is_destroyed());
        assert!(tethers.is_empty());

        wire.destroy(&mut tethers);
        assert!(tethers.is_empty());
    }

    #[test]
    fn test_max_length_synced_to_joint() {
        let mut tethers = TetherSet::default();
        let mut wire = WireConstraint::create(&mut tethers, Vec3::ZERO, Vec3::ZERO, Vec3::Y * 8.0, 1.0, 1.0);

        wire.set_max_length(&mut tethers, 5.0);
        assert_eq!(tethers.get(wire.joint().unwrap()).unwrap().max_distance, 5.0);
    }

    #[test]
    fn test_min_length_lifts_max_length() {
        let mut tethers = TetherSet::default();
        let mut wire = WireConstraint::create(&mut tethers, Vec3::ZERO, Vec3::ZERO, Vec3::Y, 1.0, 1.0);

        wire.set_min_length(&mut tethers, 2.0);
        assert_eq!(wire.max_length(), 2.0);

        wire.set_max_length(&mut tethers, 0.0);
        assert_eq!(wire.max_length(), 2.0);
    }

    #[test]
    fn test_zero_length_wire_has_no_force() {
        let params = SpringJointParams {
            anchor: Vec3::ONE,
            local_offset: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: 0.0,
            spring: 100.0,
            damper: 10.0,
        };
        let force = tether_force(&params, Vec3::ONE, Vec3::X);
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn test_slack_wire_has_no_force() {
        let params = SpringJointParams {
            anchor: Vec3::new(0.0, 10.0, 0.0),
            local_offset: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: 12.0,
            spring: 100.0,
            damper: 10.0,
        };
        assert_eq!(tether_force(&params, Vec3::ZERO, Vec3::NEG_Y), Vec3::ZERO);
    }

    #[test]
    fn test_stretched_wire_pulls_toward_anchor() {
        let params = SpringJointParams {
            anchor: Vec3::new(0.0, 10.0, 0.0),
            local_offset: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: 8.0,
            spring: 100.0,
            damper: 10.0,
        };

        // Растяжение 2m, тело неподвижно: 100 * 2 = 200 вверх
        let force = tether_force(&params, Vec3::ZERO, Vec3::ZERO);
        assert!((force - Vec3::new(0.0, 200.0, 0.0)).length() < 1e-3, "force = {:?}", force);

        // Тело удаляется от якоря со скоростью 3: демпфер добавляет 30
        let force = tether_force(&params, Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0));
        assert!((force.y - 230.0).abs() < 1e-3, "force = {:?}", force);
    }

    #[test]
    fn test_total_force_uses_rotated_offset() {
        let mut tethers = TetherSet::default();
        tethers.create_joint(SpringJointParams {
            anchor: Vec3::new(0.0, 10.0, 0.0),
            local_offset: Vec3::new(1.0, 0.0, 0.0),
            min_distance: 0.0,
            max_distance: 5.0,
            spring: 10.0,
            damper: 0.0,
        });

        // Поворот на 180° вокруг Y переносит offset в (-1, 0, 0)
        let rotation = Quat::from_rotation_y(std::f32::consts::PI);
        let force = tethers.total_force(Vec3::ZERO, rotation, Vec3::ZERO);
        assert!(force.x > 0.0, "force should lean back toward x=0, got {:?}", force);
        assert!(force.y > 0.0);
    }
}
