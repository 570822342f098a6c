//! Тестовая арена: пол, башни для зацепа, игрок, chase camera

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use wirerun_simulation::{spawn_chase_camera, spawn_player, GameplayConfig};

use crate::controls::LocalPlayer;

/// (центр, half extents) башен
const TOWERS: [(Vec3, Vec3); 5] = [
    (Vec3::new(0.0, 20.0, -40.0), Vec3::new(6.0, 20.0, 6.0)),
    (Vec3::new(-25.0, 15.0, -70.0), Vec3::new(5.0, 15.0, 5.0)),
    (Vec3::new(25.0, 25.0, -80.0), Vec3::new(7.0, 25.0, 7.0)),
    (Vec3::new(-10.0, 30.0, -120.0), Vec3::new(8.0, 30.0, 8.0)),
    (Vec3::new(30.0, 12.0, -30.0), Vec3::new(4.0, 12.0, 4.0)),
];

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<GameplayConfig>,
) {
    // Ground (400x400m), верхняя грань на y = 0
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(400.0, 0.2, 400.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
        Transform::from_xyz(0.0, -0.1, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(200.0, 0.1, 200.0),
    ));

    let tower_material = materials.add(Color::srgb(0.55, 0.55, 0.6));
    for (center, half) in TOWERS {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(half.x * 2.0, half.y * 2.0, half.z * 2.0))),
            MeshMaterial3d(tower_material.clone()),
            Transform::from_translation(center),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
        ));
    }

    // Directional light (sun)
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_4)),
    ));

    // Ambient light
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.3,
        affects_lightmapped_meshes: false,
    });

    // Player: simulation компоненты + capsule mesh
    let player = spawn_player(&mut commands, Vec3::new(0.0, 1.0, 0.0), &config);
    commands.entity(player).insert((
        LocalPlayer,
        Mesh3d(meshes.add(Capsule3d::new(0.4, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.4, 0.2))),
    ));

    // Chase camera: transform пишет simulation, здесь только render часть
    let camera = spawn_chase_camera(&mut commands, player, &config);
    commands.entity(camera).insert(Camera3d::default());
}
