//! GrappleRig - две руки, по одному wire на руку
//!
//! State machine на руку: Detached → Attached → Detached.
//! Переходы только через `fire` (None→Some) и `release` (Some→None).
//!
//! Порядок за frame:
//! 1. `set_aim_direction` (coordinator, до любых fire)
//! 2. `fire` / `release` (input events)
//! 3. `tick` - reel всех wires по одному velocity snapshot
//! 4. `late_tick` - точки верёвок по post-reel геометрии

use bevy::prelude::*;

use super::hand::{Hand, HandSlots};
use super::reel::{ReelController, ReelInput, ReelMode};
use super::rope::{RopeCurveRenderer, RopeSample, RopeVisual};
use super::target::{find_target, RayCaster, TargetMask};
use super::wire::{SpringJointBackend, TetherSet, WireConstraint};
use crate::config::GameplayConfig;
use crate::logger;

/// Позиция + ориентация тела (world space) на момент вызова
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Local point тела → world space
    pub fn world_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

impl From<&Transform> for BodyPose {
    fn from(transform: &Transform) -> Self {
        Self::new(transform.translation, transform.rotation)
    }
}

/// Результат `fire` - для логов/тестов, вызывающий код может игнорировать
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    Attached { anchor: Vec3 },
    /// Рука уже держит wire - no-op
    AlreadyAttached,
    /// Raycast промахнулся - рука остаётся Detached
    NoTarget,
}

/// Параметры выстрела, общие для обеих рук
#[derive(Debug, Clone, PartialEq)]
pub struct FireSettings {
    pub max_range: f32,
    pub spring: f32,
    pub damper: f32,
    pub target_mask: TargetMask,
    /// Точки крепления в local space тела
    pub origin_offsets: HandSlots<Vec3>,
}

#[derive(Component, Debug, Clone)]
#[require(TetherSet, RopeVisual)]
pub struct GrappleRig {
    slots: HandSlots<Option<WireConstraint>>,
    aim_direction: Vec3,
    reel_mode: ReelMode,
    manual_reel_held: bool,
    fire: FireSettings,
    reel: ReelController,
    rope: RopeCurveRenderer,
}

impl Default for GrappleRig {
    fn default() -> Self {
        Self::from_config(&GameplayConfig::default())
    }
}

impl GrappleRig {
    pub fn from_config(config: &GameplayConfig) -> Self {
        let g = &config.grapple;
        Self {
            slots: HandSlots::default(),
            aim_direction: Vec3::NEG_Z,
            reel_mode: config.reel.default_mode,
            manual_reel_held: false,
            fire: FireSettings {
                max_range: g.max_range,
                spring: g.spring,
                damper: g.damper,
                target_mask: g.target_mask,
                origin_offsets: HandSlots::new(Vec3::from_array(g.left_origin), Vec3::from_array(g.right_origin)),
            },
            reel: ReelController::from_config(g, &config.reel),
            rope: RopeCurveRenderer::from_config(&config.rope),
        }
    }

    pub fn with_origin_offsets(mut self, left: Vec3, right: Vec3) -> Self {
        self.fire.origin_offsets = HandSlots::new(left, right);
        self
    }

    // ========== Frame inputs ==========

    /// Нормализуется. Нулевой вектор игнорируется (прицел остаётся прежним).
    pub fn set_aim_direction(&mut self, direction: Vec3) {
        let direction = direction.normalize_or_zero();
        if direction != Vec3::ZERO {
            self.aim_direction = direction;
        }
    }

    pub fn aim_direction(&self) -> Vec3 {
        self.aim_direction
    }

    /// Политика когда reel кнопка отпущена
    pub fn set_reel_mode(&mut self, mode: ReelMode) {
        self.reel_mode = mode;
    }

    pub fn reel_mode(&self) -> ReelMode {
        self.reel_mode
    }

    pub fn set_manual_reel(&mut self, held: bool) {
        self.manual_reel_held = held;
    }

    /// Какая политика применится в этом тике (Manual подавляет Auto)
    pub fn active_reel_policy(&self) -> Option<ReelMode> {
        if self.manual_reel_held {
            Some(ReelMode::Manual)
        } else if self.reel_mode == ReelMode::Auto {
            Some(ReelMode::Auto)
        } else {
            None
        }
    }

    // ========== Fire / Release ==========

    pub fn origin_world(&self, hand: Hand, pose: &BodyPose) -> Vec3 {
        pose.world_point(self.fire.origin_offsets[hand])
    }

    pub fn fire<C, B>(&mut self, hand: Hand, pose: &BodyPose, caster: &C, backend: &mut B) -> FireOutcome
    where
        C: RayCaster + ?Sized,
        B: SpringJointBackend + ?Sized,
    {
        if self.slots[hand].is_some() {
            return FireOutcome::AlreadyAttached;
        }

        let origin = self.origin_world(hand, pose);
        let Some(anchor) = find_target(caster, origin, self.aim_direction, self.fire.max_range, self.fire.target_mask)
        else {
            logger::log(&format!("Grapple {}: no target within {:.1}m", hand.as_str(), self.fire.max_range));
            return FireOutcome::NoTarget;
        };

        let mut wire = WireConstraint::create(
            backend,
            origin,
            self.fire.origin_offsets[hand],
            anchor,
            self.fire.spring,
            self.fire.damper,
        );
        wire.set_min_length(backend, self.reel.min_distance);

        logger::log_info(&format!(
            "Grapple {}: attached at {:?} (length {:.2}m)",
            hand.as_str(),
            anchor,
            wire.max_length()
        ));

        self.slots[hand] = Some(wire);
        FireOutcome::Attached { anchor }
    }

    /// true если wire был уничтожен; Detached рука - no-op
    pub fn release<B: SpringJointBackend + ?Sized>(&mut self, hand: Hand, backend: &mut B) -> bool {
        match self.slots[hand].take() {
            Some(mut wire) => {
                wire.destroy(backend);
                logger::log_info(&format!("Grapple {}: released", hand.as_str()));
                true
            }
            None => false,
        }
    }

    pub fn release_all<B: SpringJointBackend + ?Sized>(&mut self, backend: &mut B) {
        for hand in Hand::ALL {
            self.release(hand, backend);
        }
    }

    // ========== Per-frame ==========

    /// Simulation тик: reel каждого Attached wire
    pub fn tick<B: SpringJointBackend + ?Sized>(
        &mut self,
        dt: f32,
        body_velocity: Vec3,
        body_position: Vec3,
        backend: &mut B,
    ) {
        let Some(mode) = self.active_reel_policy() else {
            return;
        };

        let input = ReelInput {
            dt,
            body_velocity,
            body_position,
        };

        for (_, slot) in self.slots.iter_mut() {
            if let Some(wire) = slot {
                self.reel.apply(mode, wire, &input, backend);
            }
        }
    }

    /// Late тик: точки верёвок от текущего origin (тело двигается) до якоря
    pub fn late_tick(&self, pose: &BodyPose) -> HandSlots<Option<RopeSample>> {
        self.slots.map(|hand, slot| {
            let endpoints = slot.as_ref().map(|wire| (self.origin_world(hand, pose), wire.anchor()));
            self.rope.render(endpoints)
        })
    }

    // ========== Gas support ==========

    /// Сумма векторов от тела к каждому якорю
    pub fn combined_anchor_direction(&self, body_position: Vec3) -> Vec3 {
        self.attached()
            .map(|(_, wire)| wire.anchor() - body_position)
            .sum()
    }

    /// Натянуть все wires: max_length → минимально допустимая
    pub fn pull_taut<B: SpringJointBackend + ?Sized>(&mut self, backend: &mut B) {
        for (_, slot) in self.slots.iter_mut() {
            if let Some(wire) = slot {
                wire.set_max_length(backend, 0.0);
            }
        }
    }

    /// Вернуть каждому wire его живую длину (без рывка после gas)
    pub fn restore_slack<B: SpringJointBackend + ?Sized>(&mut self, pose: &BodyPose, backend: &mut B) {
        for (hand, slot) in self.slots.iter_mut() {
            if let Some(wire) = slot {
                let origin = pose.world_point(self.fire.origin_offsets[hand]);
                let live = wire.live_distance(origin);
                wire.set_max_length(backend, live);
            }
        }
    }

    // ========== Queries ==========

    pub fn is_attached(&self, hand: Hand) -> bool {
        self.slots[hand].is_some()
    }

    pub fn is_any_attached(&self) -> bool {
        self.slots.iter().any(|(_, slot)| slot.is_some())
    }

    pub fn anchor_point(&self, hand: Hand) -> Option<Vec3> {
        self.slots[hand].as_ref().map(WireConstraint::anchor)
    }

    pub fn wire(&self, hand: Hand) -> Option<&WireConstraint> {
        self.slots[hand].as_ref()
    }

    pub fn attached(&self) -> impl Iterator<Item = (Hand, &WireConstraint)> {
        self.slots.iter().filter_map(|(hand, slot)| slot.as_ref().map(|wire| (hand, wire)))
    }
}
