//! LocomotionController - движение тела, связанное с grapple
//!
//! Режимы за тик:
//! - Grounded: velocity напрямую к camera-relative input, поворот к heading
//! - Airborne без wire: air control сила по input
//! - Airborne + wire + boost: gas. На входе снимаем направление к якорям
//!   и натягиваем wires, на выходе возвращаем живую длину.
//!
//! Контроллер не знает про ECS: вход `LocomotionFrame`, выход
//! `LocomotionOutput`, system применяет его к Rapier компонентам.

use bevy::prelude::*;

use crate::config::LocomotionConfig;
use crate::grapple::{BodyPose, GrappleRig, SpringJointBackend};
use crate::logger;

/// Physics query: стоит ли тело на чём-то
pub trait GroundProbe {
    /// Sphere sweep вниз от `origin` на `max_distance`
    ///
    /// Опора - только попадание с distance > 0 в поверхность, нормаль
    /// которой проходит `is_walkable_normal`. Стена рядом с телом не опора.
    fn probe_ground(&self, origin: Vec3, radius: f32, max_distance: f32) -> bool;
}

/// cos(~45°): круче уже стена
pub const MIN_GROUND_NORMAL_Y: f32 = 0.7;

pub fn is_walkable_normal(normal: Vec3) -> bool {
    normal.y >= MIN_GROUND_NORMAL_Y
}

/// Порог для air control осей
const AIR_AXIS_THRESHOLD: f32 = 0.5;
/// Порог "жмём вперёд" для полной скорости на земле
const FORWARD_AXIS_THRESHOLD: f32 = 0.5;
const MOVE_DEADZONE_SQ: f32 = 0.01;

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(BoostVisual)]
pub struct LocomotionController {
    pub grounded: bool,
    reel_held: bool,
    boost_held: bool,
    /// Прыжок запрошен (reel press), потребляется следующим `step`
    jump_requested: bool,
    using_gas: bool,
    /// Сумма векторов к якорям, снятая на входе в gas
    gas_direction: Vec3,
    /// Camera basis (flattened), пушится coordinator'ом каждый тик
    camera_forward: Vec3,
    camera_right: Vec3,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self {
            grounded: false,
            reel_held: false,
            boost_held: false,
            jump_requested: false,
            using_gas: false,
            gas_direction: Vec3::ZERO,
            camera_forward: Vec3::NEG_Z,
            camera_right: Vec3::X,
        }
    }
}

/// Gas активен этот тик (stand-in для VFX emission rate)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BoostVisual {
    pub active: bool,
}

/// Входы одного тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionFrame {
    pub dt: f32,
    pub move_axis: Vec2,
    pub velocity: Vec3,
    pub pose: BodyPose,
}

/// Что system должна записать в тело
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionOutput {
    /// `Some` - velocity задаётся напрямую (земля, прыжок)
    pub velocity: Option<Vec3>,
    /// Непрерывная сила этого тика (air control / gas)
    pub force: Vec3,
    pub rotation: Quat,
    pub gas_applied: bool,
}

impl LocomotionController {
    // ========== Frame inputs ==========

    /// Reel кнопка. Press на земле - прыжок.
    pub fn set_reel_held(&mut self, held: bool) {
        if held && !self.reel_held {
            self.jump_requested = true;
        }
        self.reel_held = held;
    }

    pub fn set_boost_held(&mut self, held: bool) {
        self.boost_held = held;
    }

    /// Нулевые / вертикальные векторы игнорируются
    pub fn set_camera_basis(&mut self, forward: Vec3, right: Vec3) {
        let forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
        let right = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();
        if forward != Vec3::ZERO {
            self.camera_forward = forward;
        }
        if right != Vec3::ZERO {
            self.camera_right = right;
        }
    }

    // ========== Queries ==========

    pub fn is_using_gas(&self) -> bool {
        self.using_gas
    }

    pub fn gas_direction(&self) -> Vec3 {
        self.gas_direction
    }

    pub fn camera_forward(&self) -> Vec3 {
        self.camera_forward
    }

    /// Направление движения в world space по оси (x - right, y - forward)
    pub fn move_direction(&self, axis: Vec2) -> Vec3 {
        (self.camera_forward * axis.y + self.camera_right * axis.x).clamp_length_max(1.0)
    }

    /// Air control: reel → вверх, оси только за порогом
    pub fn air_direction(&self, axis: Vec2) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if self.reel_held {
            direction += Vec3::Y;
        }
        if axis.y > AIR_AXIS_THRESHOLD {
            direction += self.camera_forward;
        } else if axis.y < -AIR_AXIS_THRESHOLD {
            direction -= self.camera_forward;
        }
        if axis.x > AIR_AXIS_THRESHOLD {
            direction += self.camera_right;
        } else if axis.x < -AIR_AXIS_THRESHOLD {
            direction -= self.camera_right;
        }
        direction.normalize_or_zero()
    }

    // ========== Tick ==========

    pub fn step<B: SpringJointBackend + ?Sized>(
        &mut self,
        frame: &LocomotionFrame,
        config: &LocomotionConfig,
        rig: &mut GrappleRig,
        backend: &mut B,
    ) -> LocomotionOutput {
        let jump = std::mem::take(&mut self.jump_requested);
        self.update_gas(frame, rig, backend);

        let mut output = LocomotionOutput {
            velocity: None,
            force: Vec3::ZERO,
            rotation: frame.pose.rotation,
            gas_applied: false,
        };

        if self.grounded {
            let moving = frame.move_axis.length_squared() > MOVE_DEADZONE_SQ;
            let speed = if frame.move_axis.y > FORWARD_AXIS_THRESHOLD {
                config.speed
            } else {
                config.speed * config.idle_speed_factor
            };

            let target = self.move_direction(frame.move_axis);
            let mut velocity = blend_ground_velocity(frame.velocity, target, speed, config.velocity_blend);
            if jump {
                velocity.y = config.jump_speed;
            }
            output.velocity = Some(velocity);

            let (heading, turn_rate) = if moving && target != Vec3::ZERO {
                (target, config.turn_rate_moving)
            } else {
                (self.camera_forward, config.turn_rate_idle)
            };
            output.rotation = turn_toward(frame.pose.rotation, heading, turn_rate * frame.dt);
        } else {
            output.rotation = turn_toward(frame.pose.rotation, self.camera_forward, config.turn_rate_moving * frame.dt);

            if self.using_gas {
                output.force = self.gas_direction * config.gas_force;
                output.gas_applied = self.gas_direction != Vec3::ZERO;
            } else if !rig.is_any_attached() {
                output.force = self.air_direction(frame.move_axis) * config.air_speed;
            }
        }

        output
    }

    /// Вход/выход gas только на переходе - иначе направление дёргается при swing
    fn update_gas<B: SpringJointBackend + ?Sized>(
        &mut self,
        frame: &LocomotionFrame,
        rig: &mut GrappleRig,
        backend: &mut B,
    ) {
        let wants_gas = self.boost_held && !self.grounded && rig.is_any_attached();

        if wants_gas && !self.using_gas {
            self.gas_direction = rig.combined_anchor_direction(frame.pose.position);
            rig.pull_taut(backend);
            self.using_gas = true;
            logger::log_info(&format!("Gas: enter, direction {:?}", self.gas_direction));
        } else if !wants_gas && self.using_gas {
            rig.restore_slack(&frame.pose, backend);
            self.using_gas = false;
            self.gas_direction = Vec3::ZERO;
            logger::log_info("Gas: exit");
        }
    }
}

/// `lerp(v/speed, target, blend)·speed` по горизонтали, vertical сохраняется
pub fn blend_ground_velocity(velocity: Vec3, target: Vec3, speed: f32, blend: f32) -> Vec3 {
    if speed <= 0.0 {
        return Vec3::new(0.0, velocity.y, 0.0);
    }
    let current = Vec3::new(velocity.x, 0.0, velocity.z) / speed;
    let target = Vec3::new(target.x, 0.0, target.z);
    let horizontal = current.lerp(target, blend.clamp(0.0, 1.0)) * speed;
    Vec3::new(horizontal.x, velocity.y, horizontal.z)
}

/// Yaw-only rotation, смотрящий вдоль `direction` (forward = -Z)
pub fn heading_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Slerp к heading на долю `t` (clamp в [0, 1])
pub fn turn_toward(current: Quat, direction: Vec3, t: f32) -> Quat {
    match heading_rotation(direction) {
        Some(target) => current.slerp(target, t.clamp(0.0, 1.0)),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameplayConfig;
    use crate::grapple::{Hand, StaticBox, StaticWorld, TetherSet};

    fn frame(axis: Vec2, velocity: Vec3, position: Vec3) -> LocomotionFrame {
        LocomotionFrame {
            dt: 1.0 / 60.0,
            move_axis: axis,
            velocity,
            pose: BodyPose::at(position),
        }
    }

    /// Rig зацепленный обеими руками за стену z = 10
    fn attached_rig(tethers: &mut TetherSet) -> GrappleRig {
        let world = StaticWorld::default().with_box(StaticBox::from_center(
            Vec3::new(0.0, 0.0, 10.5),
            Vec3::new(20.0, 20.0, 0.5),
        ));
        let mut rig = GrappleRig::from_config(&GameplayConfig::default()).with_origin_offsets(Vec3::ZERO, Vec3::ZERO);
        rig.set_aim_direction(Vec3::Z);
        rig.fire(Hand::Left, &BodyPose::at(Vec3::ZERO), &world, tethers);
        rig.fire(Hand::Right, &BodyPose::at(Vec3::ZERO), &world, tethers);
        rig
    }

    #[test]
    fn test_walkable_normal_rejects_walls() {
        assert!(is_walkable_normal(Vec3::Y));
        assert!(is_walkable_normal(Vec3::new(0.0, 1.0, 0.5).normalize()));
        assert!(!is_walkable_normal(Vec3::NEG_Z));
        assert!(!is_walkable_normal(Vec3::new(0.0, 1.0, 1.5).normalize()));
        assert!(!is_walkable_normal(Vec3::NEG_Y));
    }

    #[test]
    fn test_heading_rotation_faces_direction() {
        let rotation = heading_rotation(Vec3::X).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5, "forward = {:?}", forward);

        assert!(heading_rotation(Vec3::Y).is_none());
    }

    #[test]
    fn test_ground_velocity_blend() {
        // Стоим, жмём вперёд (-Z): 20% от полной скорости за тик
        let velocity = blend_ground_velocity(Vec3::new(0.0, -1.0, 0.0), Vec3::NEG_Z, 13.0, 0.2);
        assert!((velocity.z - (-2.6)).abs() < 1e-4, "velocity = {:?}", velocity);
        assert_eq!(velocity.y, -1.0);
        assert_eq!(velocity.x, 0.0);
    }

    #[test]
    fn test_grounded_forward_input_moves_along_camera() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = GrappleRig::from_config(&config);
        let mut controller = LocomotionController {
            grounded: true,
            ..default()
        };
        controller.set_camera_basis(Vec3::X, Vec3::Z);

        let output = controller.step(
            &frame(Vec2::Y, Vec3::ZERO, Vec3::ZERO),
            &config.locomotion,
            &mut rig,
            &mut tethers,
        );

        let velocity = output.velocity.unwrap();
        assert!(velocity.x > 0.0);
        assert!(velocity.z.abs() < 1e-5);
        assert_eq!(output.force, Vec3::ZERO);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = GrappleRig::from_config(&config);

        let mut grounded = LocomotionController {
            grounded: true,
            ..default()
        };
        grounded.set_reel_held(true);
        let output = grounded.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);
        assert_eq!(output.velocity.unwrap().y, config.locomotion.jump_speed);

        // Запрос потреблён: повторный тик без нового press не прыгает
        let output = grounded.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);
        assert_eq!(output.velocity.unwrap().y, 0.0);

        let mut airborne = LocomotionController::default();
        airborne.set_reel_held(true);
        let output = airborne.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);
        assert!(output.velocity.is_none());
    }

    #[test]
    fn test_air_control_direction() {
        let mut controller = LocomotionController::default();
        assert_eq!(controller.air_direction(Vec2::new(0.3, 0.4)), Vec3::ZERO);
        assert_eq!(controller.air_direction(Vec2::new(0.0, 1.0)), Vec3::NEG_Z);

        controller.set_reel_held(true);
        let up_forward = controller.air_direction(Vec2::new(0.0, 1.0));
        assert!((up_forward - Vec3::new(0.0, 1.0, -1.0).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_air_control_force_without_wire() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = GrappleRig::from_config(&config);
        let mut controller = LocomotionController::default();

        let output = controller.step(&frame(Vec2::new(-1.0, 0.0), Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);
        assert!((output.force - Vec3::NEG_X * config.locomotion.air_speed).length() < 1e-4);
    }

    #[test]
    fn test_gas_captures_direction_once() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = attached_rig(&mut tethers);
        let mut controller = LocomotionController::default();
        controller.set_boost_held(true);

        let output = controller.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);
        assert!(controller.is_using_gas());
        assert!(output.gas_applied);
        assert!((output.force - Vec3::new(0.0, 0.0, 20.0) * config.locomotion.gas_force).length() < 1e-3);
        for (_, wire) in rig.attached() {
            assert_eq!(wire.max_length(), wire.min_length());
        }

        // Тело сдвинулось - направление не пересчитывается пока gas активен
        let output = controller.step(
            &frame(Vec2::ZERO, Vec3::ZERO, Vec3::new(5.0, 0.0, 3.0)),
            &config.locomotion,
            &mut rig,
            &mut tethers,
        );
        assert!((output.force - Vec3::new(0.0, 0.0, 20.0) * config.locomotion.gas_force).length() < 1e-3);
    }

    #[test]
    fn test_gas_exit_restores_live_length() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = attached_rig(&mut tethers);
        let mut controller = LocomotionController::default();

        controller.set_boost_held(true);
        controller.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);

        controller.set_boost_held(false);
        let output = controller.step(
            &frame(Vec2::ZERO, Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0)),
            &config.locomotion,
            &mut rig,
            &mut tethers,
        );

        assert!(!controller.is_using_gas());
        assert!(!output.gas_applied);
        for (_, wire) in rig.attached() {
            assert!((wire.max_length() - 7.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_no_gas_on_ground() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = attached_rig(&mut tethers);
        let mut controller = LocomotionController {
            grounded: true,
            ..default()
        };
        controller.set_boost_held(true);

        controller.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);
        assert!(!controller.is_using_gas());
    }

    #[test]
    fn test_gas_exits_when_wires_released() {
        let config = GameplayConfig::default();
        let mut tethers = TetherSet::default();
        let mut rig = attached_rig(&mut tethers);
        let mut controller = LocomotionController::default();
        controller.set_boost_held(true);
        controller.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);

        rig.release_all(&mut tethers);
        let output = controller.step(&frame(Vec2::ZERO, Vec3::ZERO, Vec3::ZERO), &config.locomotion, &mut rig, &mut tethers);

        assert!(!controller.is_using_gas());
        assert_eq!(controller.gas_direction(), Vec3::ZERO);
        assert!(!output.gas_applied);
    }
}
