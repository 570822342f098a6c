//! Keyboard/mouse → simulation input
//!
//! Кнопки превращаются в edge-triggered `ControlEvent` (just_pressed /
//! just_released), оси пишутся в компоненты каждый кадр.
//!
//! Раскладка:
//! - ЛКМ / ПКМ - левый / правый крюк (hold)
//! - Space - reel (hold), на земле прыжок
//! - Shift - gas (hold)
//! - R - переключить Auto / Manual reel
//! - WASD - движение, мышь - камера, Esc - отпустить курсор

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use wirerun_simulation::{
    ChaseCamera, ControlAction, ControlEvent, GrappleRig, Hand, LookAxis, MoveAxis, ReelMode,
};

/// Mouse delta (px) → look input
const LOOK_SCALE: f32 = 0.1;

const MOUSE_BINDINGS: [(MouseButton, ControlAction); 2] = [
    (MouseButton::Left, ControlAction::Fire(Hand::Left)),
    (MouseButton::Right, ControlAction::Fire(Hand::Right)),
];

const KEY_BINDINGS: [(KeyCode, ControlAction); 2] = [
    (KeyCode::Space, ControlAction::Reel),
    (KeyCode::ShiftLeft, ControlAction::Boost),
];

/// Marker: тело, которым управляет этот клиент
#[derive(Component)]
pub struct LocalPlayer;

pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, grab_cursor).add_systems(
            Update,
            (
                send_control_events,
                toggle_reel_mode,
                update_move_axis,
                update_look_axis,
                release_cursor,
            ),
        );
    }
}

fn send_control_events(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    players: Query<Entity, With<LocalPlayer>>,
    mut events: EventWriter<ControlEvent>,
) {
    let Ok(player) = players.single() else {
        return;
    };

    for (button, action) in MOUSE_BINDINGS {
        if mouse.just_pressed(button) {
            events.write(ControlEvent::pressed(player, action));
        }
        if mouse.just_released(button) {
            events.write(ControlEvent::released(player, action));
        }
    }

    for (key, action) in KEY_BINDINGS {
        if keys.just_pressed(key) {
            events.write(ControlEvent::pressed(player, action));
        }
        if keys.just_released(key) {
            events.write(ControlEvent::released(player, action));
        }
    }
}

fn toggle_reel_mode(keys: Res<ButtonInput<KeyCode>>, mut rigs: Query<&mut GrappleRig, With<LocalPlayer>>) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }

    for mut rig in rigs.iter_mut() {
        let next = match rig.reel_mode() {
            ReelMode::Auto => ReelMode::Manual,
            ReelMode::Manual => ReelMode::Auto,
        };
        rig.set_reel_mode(next);
        wirerun_simulation::log_info(&format!("Reel mode: {:?}", next));
    }
}

fn update_move_axis(keys: Res<ButtonInput<KeyCode>>, mut axes: Query<&mut MoveAxis, With<LocalPlayer>>) {
    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }

    for mut move_axis in axes.iter_mut() {
        move_axis.set_if_neq(MoveAxis(axis));
    }
}

/// Mouse delta копится в LookAxis, камера потребляет его в PostUpdate
fn update_look_axis(
    mut mouse_motion: EventReader<MouseMotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut LookAxis, With<ChaseCamera>>,
) {
    let grabbed = windows
        .single()
        .map(|window| window.cursor_options.grab_mode != CursorGrabMode::None)
        .unwrap_or(false);
    if !grabbed {
        // Consume motion events even when cursor is free
        mouse_motion.clear();
        return;
    }

    // Мышь вверх = delta.y < 0, LookAxis.y > 0 - вверх
    let delta: Vec2 = mouse_motion.read().map(|motion| Vec2::new(motion.delta.x, -motion.delta.y)).sum();
    if delta == Vec2::ZERO {
        return;
    }

    for mut look in cameras.iter_mut() {
        look.0 += delta * LOOK_SCALE;
    }
}

fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = windows.single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

fn release_cursor(keys: Res<ButtonInput<KeyCode>>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }

    if let Ok(mut window) = windows.single_mut() {
        let locked = window.cursor_options.grab_mode != CursorGrabMode::None;
        window.cursor_options.grab_mode = if locked { CursorGrabMode::None } else { CursorGrabMode::Locked };
        window.cursor_options.visible = locked;
    }
}
