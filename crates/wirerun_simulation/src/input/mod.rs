//! Player input - edge-triggered события и непрерывные оси
//!
//! # Архитектура
//!
//! ```text
//! Client (keyboard/mouse, ButtonInput just_pressed/just_released)
//!     ↓
//! ControlEvent { Pressed | Released } - один раз на переход
//!     ↓
//! handle_control_events (FixedUpdate) → GrappleRig / LocomotionController
//! ```
//!
//! Никаких `_pressed` флагов для diff с прошлым кадром: клиент шлёт
//! событие только на переход.

use bevy::prelude::*;

use crate::grapple::Hand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEdge {
    Pressed,
    Released,
}

impl ButtonEdge {
    pub fn is_pressed(self) -> bool {
        self == ButtonEdge::Pressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Hold: Pressed стреляет, Released отпускает wire
    Fire(Hand),
    /// Hold: manual reel (и прыжок на земле)
    Reel,
    /// Hold: gas
    Boost,
}

/// Event: переход кнопки для конкретного тела
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    pub entity: Entity,
    pub action: ControlAction,
    pub edge: ButtonEdge,
}

impl ControlEvent {
    pub fn pressed(entity: Entity, action: ControlAction) -> Self {
        Self {
            entity,
            action,
            edge: ButtonEdge::Pressed,
        }
    }

    pub fn released(entity: Entity, action: ControlAction) -> Self {
        Self {
            entity,
            action,
            edge: ButtonEdge::Released,
        }
    }
}

/// Event: отпустить все wires (смена режима, cleanup)
#[derive(Event, Debug, Clone, Copy)]
pub struct ReleaseAllWires {
    pub entity: Entity,
}

/// 2D ось движения (WASD / stick)
///
/// - `x`: -1 (left) → +1 (right)
/// - `y`: -1 (back) → +1 (forward)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MoveAxis(pub Vec2);

/// 2D ось взгляда за кадр (mouse delta), потребляется chase camera
///
/// - `x`: > 0 - вправо
/// - `y`: > 0 - вверх
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LookAxis(pub Vec2);
