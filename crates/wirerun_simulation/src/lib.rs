//! WIRERUN Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: grapple wires, reel, locomotion, chase camera.
//!
//! Слои:
//! - чистые типы (`grapple::GrappleRig`, `locomotion::LocomotionController`,
//!   `camera::ChaseCamera`) - без ECS, тестируются напрямую
//! - ECS systems + plugins - порядок тика и связь с Rapier
//! - `physics` - Rapier / headless реализации physics queries

use std::path::PathBuf;

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

pub mod camera;
pub mod config;
pub mod grapple;
pub mod input;
pub mod locomotion;
pub mod logger;
pub mod physics;

pub use camera::{spawn_chase_camera, ChaseCamera, ChaseCameraPlugin};
pub use config::{ConfigError, GameplayConfig};
pub use grapple::{FireOutcome, GrapplePlugin, GrappleRig, Hand, ReelMode, RopeVisual, TetherSet};
pub use input::{ButtonEdge, ControlAction, ControlEvent, LookAxis, MoveAxis, ReleaseAllWires};
pub use locomotion::{BoostVisual, LocomotionController, LocomotionPlugin};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel};
pub use physics::{spawn_headless_player, HeadlessBody, StaticBox, StaticWorld};

/// Порядок simulation тика (FixedUpdate, до Rapier step)
///
/// Coordinator (aim, camera basis) → ground probe + сброс сил → input
/// events → reel → locomotion → tether forces → headless интеграция.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Coordinate,
    Sense,
    Control,
    Reel,
    Drive,
    Forces,
    Integrate,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Rapier plugin сюда не входит: клиент добавляет его сам, headless
/// работает через `StaticWorld` + `HeadlessBody`.
#[derive(Default)]
pub struct SimulationPlugin {
    /// JSON с `GameplayConfig`. Ошибка загрузки → defaults.
    pub config_path: Option<PathBuf>,
}

impl SimulationPlugin {
    pub fn with_config(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<GameplayConfig>() {
            let config = match &self.config_path {
                Some(path) => GameplayConfig::load_or_default(path),
                None => GameplayConfig::default(),
            };
            app.insert_resource(config);
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_event::<ControlEvent>()
            .add_event::<ReleaseAllWires>()
            .register_type::<MoveAxis>()
            .register_type::<LookAxis>()
            .register_type::<HeadlessBody>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Coordinate,
                    SimulationSet::Sense,
                    SimulationSet::Control,
                    SimulationSet::Reel,
                    SimulationSet::Drive,
                    SimulationSet::Forces,
                    SimulationSet::Integrate,
                )
                    .chain()
                    .before(PhysicsSet::SyncBackend),
            )
            .add_systems(
                FixedUpdate,
                (
                    // Сила собирается заново каждый тик: locomotion + tethers
                    physics::reset_external_forces.in_set(SimulationSet::Sense),
                    physics::integrate_headless_bodies.in_set(SimulationSet::Integrate),
                ),
            )
            .add_plugins((GrapplePlugin, LocomotionPlugin, ChaseCameraPlugin));

        logger::log_info("SimulationPlugin: grapple, locomotion, camera registered");
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Gameplay компоненты игрока (без физического тела)
pub fn spawn_player_components(commands: &mut Commands, position: Vec3, config: &GameplayConfig) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            // GrappleRig тянет за собой TetherSet + RopeVisual
            GrappleRig::from_config(config),
            LocomotionController::default(),
            MoveAxis::default(),
            Velocity::default(),
            ExternalForce::default(),
        ))
        .id()
}

/// Радиус капсулы игрока (m)
pub const PLAYER_CAPSULE_RADIUS: f32 = 0.4;

/// Игрок с Rapier телом: dynamic capsule, вращение только через locomotion
///
/// Высота капсулы = 2 × `locomotion.body_half_height`, чтобы ground probe
/// и collider сходились в ступнях.
pub fn spawn_player(commands: &mut Commands, position: Vec3, config: &GameplayConfig) -> Entity {
    let half_height = config.locomotion.body_half_height;
    let segment_half = (half_height - PLAYER_CAPSULE_RADIUS).max(0.0);

    let entity = spawn_player_components(commands, position, config);
    commands.entity(entity).insert((
        RigidBody::Dynamic,
        Collider::capsule_y(segment_half, PLAYER_CAPSULE_RADIUS),
        ColliderMassProperties::Mass(1.0),
        LockedAxes::ROTATION_LOCKED,
        Sleeping::disabled(),
    ));
    entity
}
