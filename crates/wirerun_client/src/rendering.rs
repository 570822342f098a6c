use bevy::prelude::*;
use wirerun_simulation::camera::update_chase_camera;
use wirerun_simulation::{BoostVisual, ChaseCamera, GrappleRig, Hand, LocomotionController, RopeVisual};

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (draw_ropes, draw_anchors, draw_boost))
            .add_systems(PostUpdate, sync_camera_fov.after(update_chase_camera));
    }
}

fn rope_color(hand: Hand) -> Color {
    match hand {
        Hand::Left => Color::srgb(0.9, 0.85, 0.7),
        Hand::Right => Color::srgb(0.7, 0.85, 0.9),
    }
}

/// Верёвки из RopeVisual (None - линия скрыта)
fn draw_ropes(ropes: Query<&RopeVisual>, mut gizmos: Gizmos) {
    for visual in ropes.iter() {
        for (hand, line) in visual.lines.iter() {
            if let Some(points) = line {
                gizmos.linestrip(points.iter().copied(), rope_color(hand));
            }
        }
    }
}

/// Маркер якоря на поверхности
fn draw_anchors(rigs: Query<&GrappleRig>, mut gizmos: Gizmos) {
    for rig in rigs.iter() {
        for (hand, wire) in rig.attached() {
            gizmos.sphere(Isometry3d::from_translation(wire.anchor()), 0.15, rope_color(hand));
        }
    }
}

/// Gas: стрелка по направлению тяги
fn draw_boost(bodies: Query<(&Transform, &BoostVisual, &LocomotionController)>, mut gizmos: Gizmos) {
    for (transform, boost, locomotion) in bodies.iter() {
        if !boost.active {
            continue;
        }
        let direction = locomotion.gas_direction().normalize_or_zero();
        let start = transform.translation;
        gizmos.arrow(start, start + direction * 2.0, Color::srgb(1.0, 0.6, 0.1));
    }
}

/// Dynamic FOV камеры (градусы) → perspective projection
fn sync_camera_fov(mut cameras: Query<(&ChaseCamera, &mut Projection)>) {
    for (camera, mut projection) in cameras.iter_mut() {
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.fov = camera.fov_degrees().to_radians();
        }
    }
}
