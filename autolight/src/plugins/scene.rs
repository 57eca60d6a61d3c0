use bevy::prelude::*;
use rand::Rng;

use crate::plugins::auto_lighting::AutoLightingRequest;

const ROOM_COUNT: usize = 12;
const ROOMS_PER_ROW: usize = 4;
const ROOM_SPACING: f32 = 8.0;

/// Demo scene: a ground plane and a "Building" made of rooms. Press `L` to
/// light the building.
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_scene)
            .add_systems(Update, request_auto_lighting);
    }
}

/// Root entity the demo lights.
#[derive(Resource, Clone, Copy, Debug)]
pub struct BuildingRoot(pub Entity);

fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Add a grassy ground plane
    commands.spawn(MaterialMeshBundle {
        mesh: meshes.add(Cuboid {
            half_size: Vec3::new(100.0, 0.1, 100.0),
        }),
        material: materials.add(StandardMaterial {
            base_color: Color::rgb(0.0, 0.5, 0.0),
            ..default()
        }),
        transform: Transform::from_translation(Vec3::new(0.0, 0.0, 0.0)),
        ..default()
    });

    let wall = materials.add(Color::rgb(0.8, 0.78, 0.72));
    let furniture = materials.add(Color::rgb(0.45, 0.3, 0.2));
    let crate_mesh = meshes.add(Cuboid::new(0.8, 0.8, 0.8));
    let mut rng = rand::thread_rng();

    let building = commands
        .spawn((SpatialBundle::default(), Name::new("Building")))
        .with_children(|building| {
            for i in 0..ROOM_COUNT {
                let height = rng.gen_range(2.5..6.0);
                let x = (i % ROOMS_PER_ROW) as f32 * ROOM_SPACING - 12.0;
                let z = (i / ROOMS_PER_ROW) as f32 * ROOM_SPACING - 8.0;

                building
                    .spawn((
                        PbrBundle {
                            mesh: meshes.add(Cuboid::new(6.0, height, 6.0)),
                            material: wall.clone(),
                            transform: Transform::from_xyz(x, height / 2.0, z),
                            ..default()
                        },
                        Name::new(format!("Room {i}")),
                    ))
                    .with_children(|room| {
                        // Only direct children of the building get lights;
                        // furniture just adds to the object count.
                        for j in 0..rng.gen_range(0..3) {
                            room.spawn((
                                PbrBundle {
                                    mesh: crate_mesh.clone(),
                                    material: furniture.clone(),
                                    transform: Transform::from_xyz(
                                        rng.gen_range(-2.0..2.0),
                                        0.4 - height / 2.0,
                                        rng.gen_range(-2.0..2.0),
                                    ),
                                    ..default()
                                },
                                Name::new(format!("Crate {i}.{j}")),
                            ));
                        }
                    });
            }
        })
        .id();

    commands.insert_resource(BuildingRoot(building));
    info!("Press L to auto-light the building");
}

fn request_auto_lighting(
    keys: Res<ButtonInput<KeyCode>>,
    building: Option<Res<BuildingRoot>>,
    mut requests: EventWriter<AutoLightingRequest>,
) {
    if keys.just_pressed(KeyCode::KeyL) {
        requests.send(AutoLightingRequest {
            root: building.map(|building| building.0),
        });
    }
}
