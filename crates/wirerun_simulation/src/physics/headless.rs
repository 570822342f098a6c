//! Headless интеграция тела (без Rapier)
//!
//! Используется в headless бинарнике и тестах. Те же компоненты,
//! что читает Rapier (`Velocity`, `ExternalForce`), поэтому gameplay
//! системы не знают, кто их интегрирует.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalForce, Velocity};

use crate::config::GameplayConfig;

/// Простое point-mass тело: gravity + forces + пол на `floor_height`
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HeadlessBody {
    /// kg
    pub mass: f32,
    /// m/s²
    pub gravity: Vec3,
    /// Центр тела не опускается ниже этой высоты
    pub floor_height: f32,
}

impl Default for HeadlessBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            floor_height: 0.9,
        }
    }
}

impl HeadlessBody {
    /// Один шаг semi-implicit Euler
    pub fn integrate(&self, dt: f32, position: &mut Vec3, velocity: &mut Vec3, force: Vec3) {
        let inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };

        *velocity += (self.gravity + force * inv_mass) * dt;
        *position += *velocity * dt;

        if position.y < self.floor_height {
            position.y = self.floor_height;
            velocity.y = velocity.y.max(0.0);
        }
    }
}

/// Velocity → Transform для тел без Rapier
pub fn integrate_headless_bodies(
    mut query: Query<(&HeadlessBody, &mut Transform, &mut Velocity, Option<&ExternalForce>)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform, mut velocity, force) in query.iter_mut() {
        let force = force.map(|f| f.force).unwrap_or(Vec3::ZERO);
        body.integrate(delta, &mut transform.translation, &mut velocity.linvel, force);
    }
}

/// Spawn helper для headless игрока (тот же набор gameplay компонентов, что и у Rapier варианта)
pub fn spawn_headless_player(commands: &mut Commands, position: Vec3, config: &GameplayConfig) -> Entity {
    let entity = crate::spawn_player_components(commands, position, config);
    commands.entity(entity).insert(HeadlessBody {
        floor_height: config.locomotion.body_half_height,
        ..default()
    });
    entity
}
