//! Reel политики - как меняется max_length wire каждый тик
//!
//! - Manual: фиксированная скорость, только укорачивает
//! - Auto: скорость = base + скорость тела к якорю. Когда тело улетает
//!   от якоря быстрее base, wire удлиняется (эластичный swing).
//!
//! Обе политики clamp'ят результат к полу через `max`, без undershoot.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::wire::{SpringJointBackend, WireConstraint};
use crate::config::{GrappleConfig, ReelConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum ReelMode {
    /// Reel только пока зажата кнопка
    Manual,
    /// Velocity-coupled reel когда кнопка не зажата
    #[default]
    Auto,
}

/// Проекция скорости тела на направление к якорю (> 0 - приближаемся)
///
/// Тело в точке якоря → 0, без NaN.
pub fn velocity_toward_anchor(body_velocity: Vec3, body_position: Vec3, anchor: Vec3) -> f32 {
    body_velocity.dot((anchor - body_position).normalize_or_zero())
}

/// `max(max_length - rate·dt, floor)`; отрицательный rate трактуется как 0
pub fn manual_reel(max_length: f32, rate: f32, dt: f32, floor: f32) -> f32 {
    (max_length - rate.max(0.0) * dt).max(floor)
}

/// `max(max_length - (base + toward)·dt, floor)`
pub fn auto_reel(max_length: f32, base_force: f32, velocity_toward: f32, dt: f32, floor: f32) -> f32 {
    (max_length - (base_force + velocity_toward) * dt).max(floor)
}

/// Snapshot тела на тик - один и тот же для обоих wires
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReelInput {
    pub dt: f32,
    pub body_velocity: Vec3,
    pub body_position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReelController {
    pub manual_rate: f32,
    pub auto_base_force: f32,
    /// Пол для max_length
    pub min_distance: f32,
    /// Верхняя граница роста в Auto (None = без ограничения)
    pub max_length_cap: Option<f32>,
}

impl ReelController {
    pub fn from_config(grapple: &GrappleConfig, reel: &ReelConfig) -> Self {
        Self {
            manual_rate: reel.manual_rate,
            auto_base_force: reel.auto_base_force,
            min_distance: grapple.min_distance,
            max_length_cap: grapple.max_length_cap,
        }
    }

    /// Новая max_length для wire по выбранной политике
    pub fn next_length(&self, mode: ReelMode, current: f32, anchor: Vec3, input: &ReelInput) -> f32 {
        let next = match mode {
            ReelMode::Manual => manual_reel(current, self.manual_rate, input.dt, self.min_distance),
            ReelMode::Auto => {
                let toward = velocity_toward_anchor(input.body_velocity, input.body_position, anchor);
                auto_reel(current, self.auto_base_force, toward, input.dt, self.min_distance)
            }
        };

        // Cap ограничивает только рост: wire длиннее cap (выстрел дальше cap)
        // не дёргается к нему, а укорачивается обычным reel
        match self.max_length_cap {
            Some(cap) if next > current => next.min(cap.max(current)),
            _ => next,
        }
    }

    pub fn apply<B: SpringJointBackend + ?Sized>(
        &self,
        mode: ReelMode,
        wire: &mut WireConstraint,
        input: &ReelInput,
        backend: &mut B,
    ) {
        let next = self.next_length(mode, wire.max_length(), wire.anchor(), input);
        wire.set_max_length(backend, next);
    }
}
