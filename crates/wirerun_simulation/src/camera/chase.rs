//! Third-person chase camera
//!
//! Orbit вокруг точки над телом (yaw/pitch от look input). Дистанция и
//! FOV растут с горизонтальной скоростью, pitch наклоняется по вертикальной.
//! Все величины сглаживаются critically-damped `smooth_damp`.
//! Стены: sphere cast от точки взгляда к желаемой позиции.

use bevy::prelude::*;

use crate::config::CameraConfig;
use crate::input::LookAxis;

/// Physics query: на каком расстоянии сфера упрётся во что-то
pub trait SphereCaster {
    fn sphere_cast(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32>;
}

/// Critically damped сглаживание к `target` (без overshoot)
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let output = target + (change + temp) * exp;

    // Проскочили цель - встаём ровно на неё
    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        return target;
    }

    output
}

/// Покомпонентный `smooth_damp`
pub fn smooth_damp_vec3(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, dt: f32) -> Vec3 {
    Vec3::new(
        smooth_damp(current.x, target.x, &mut velocity.x, smooth_time, dt),
        smooth_damp(current.y, target.y, &mut velocity.y, smooth_time, dt),
        smooth_damp(current.z, target.z, &mut velocity.z, smooth_time, dt),
    )
}

/// Значение + его скорость для `smooth_damp`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Damped<T> {
    value: T,
    velocity: T,
}

impl<T: Default> Damped<T> {
    fn at(value: T) -> Self {
        Self {
            value,
            velocity: T::default(),
        }
    }
}

#[derive(Component, Debug, Clone)]
#[require(LookAxis, Transform)]
pub struct ChaseCamera {
    /// Тело, за которым летим
    pub target: Option<Entity>,
    settings: CameraConfig,
    /// Градусы
    yaw: f32,
    pitch: f32,
    distance: Damped<f32>,
    fov: Damped<f32>,
    pitch_offset: Damped<f32>,
    look_at: Damped<Vec3>,
    rotation: Quat,
    position: Vec3,
    initialized: bool,
}

impl ChaseCamera {
    pub fn new(target: Option<Entity>, settings: CameraConfig) -> Self {
        Self {
            target,
            distance: Damped::at(settings.base_distance),
            fov: Damped::at(settings.base_fov),
            pitch_offset: Damped::default(),
            look_at: Damped::default(),
            yaw: 0.0,
            pitch: 0.0,
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
            initialized: false,
            settings,
        }
    }

    /// Поворот от look input (градусы = input · sensitivity), pitch clamp
    pub fn apply_look(&mut self, look: Vec2) {
        let s = &self.settings;
        self.yaw -= look.x * s.sensitivity;
        self.pitch = (self.pitch - look.y * s.sensitivity).clamp(s.min_vertical_angle, s.max_vertical_angle);
    }

    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(self.settings.min_vertical_angle, self.settings.max_vertical_angle);
    }

    /// Late tick: follow тела
    pub fn update<S: SphereCaster + ?Sized>(
        &mut self,
        dt: f32,
        target_position: Vec3,
        target_velocity: Vec3,
        occluder: &S,
    ) {
        let s = &self.settings;

        let horizontal_speed = Vec2::new(target_velocity.x, target_velocity.z).length();
        let speed_ratio = (horizontal_speed / s.speed_for_max_distance).clamp(0.0, 1.0);

        let desired_distance = lerp(s.base_distance, s.max_speed_distance, speed_ratio).min(s.max_distance);
        let desired_fov = lerp(s.base_fov, s.max_speed_fov, speed_ratio);
        let desired_pitch_offset =
            (-target_velocity.y * s.vertical_velocity_pitch_factor).clamp(-s.max_pitch_offset, s.max_pitch_offset);
        let look_target = target_position + Vec3::Y * s.height;

        if !self.initialized {
            self.look_at = Damped::at(look_target);
            self.initialized = true;
        } else {
            self.look_at.value = smooth_damp_vec3(
                self.look_at.value,
                look_target,
                &mut self.look_at.velocity,
                s.position_smooth_time,
                dt,
            );
        }

        self.distance.value = smooth_damp(
            self.distance.value,
            desired_distance,
            &mut self.distance.velocity,
            s.distance_smooth_time,
            dt,
        );
        self.fov.value = smooth_damp(self.fov.value, desired_fov, &mut self.fov.velocity, s.fov_smooth_time, dt);
        self.pitch_offset.value = smooth_damp(
            self.pitch_offset.value,
            desired_pitch_offset,
            &mut self.pitch_offset.velocity,
            s.pitch_offset_smooth_time,
            dt,
        );

        let pitch = self.pitch + self.pitch_offset.value;
        self.rotation = Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), -pitch.to_radians(), 0.0);

        let back = self.rotation * Vec3::Z;
        let mut distance = self.distance.value;
        if let Some(hit) = occluder.sphere_cast(self.look_at.value, s.collision_radius, back, distance) {
            distance = hit.clamp(s.min_distance, distance.max(s.min_distance));
        }

        self.position = self.look_at.value + back * distance;
    }

    // ========== Queries ==========

    /// Горизонтальный forward (y = 0), для movement input
    pub fn forward(&self) -> Vec3 {
        flatten_or(self.rotation * Vec3::NEG_Z, Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        flatten_or(self.rotation * Vec3::X, Vec3::X)
    }

    /// Полное направление взгляда (для крюков)
    pub fn aim_direction(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov.value
    }

    pub fn distance(&self) -> f32 {
        self.distance.value
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn flatten_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        fallback
    } else {
        flat
    }
}
