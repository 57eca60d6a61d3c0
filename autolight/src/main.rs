use autolight::config::{load_settings, CONFIG_ENV_VAR};
use autolight::plugins::scene::SceneSetupPlugin;
use autolight::{AutoLightingFinished, AutoLightingPlugin};
use bevy::prelude::*;
use bevy_atmosphere::plugin::{AtmosphereCamera, AtmospherePlugin};
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, AtmospherePlugin, PanOrbitCameraPlugin))
        .add_plugins((AutoLightingPlugin, SceneSetupPlugin))
        .add_systems(PreStartup, load_lighting_settings)
        .add_systems(Startup, spawn_camera)
        .add_systems(Update, show_summary)
        .run();
}

/// Settings file path comes from the first argument, then the environment.
fn load_lighting_settings(mut commands: Commands) {
    let Some(path) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
    else {
        return;
    };

    match load_settings(&path) {
        Ok(settings) => {
            info!("Loaded lighting settings from {path}");
            commands.insert_resource(settings);
        }
        Err(err) => error!("{err}; using default lighting settings"),
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(0.0, 25.0, 45.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        AtmosphereCamera::default(),
        PanOrbitCamera::default(),
    ));
}

fn show_summary(mut finished: EventReader<AutoLightingFinished>, names: Query<&Name>) {
    for run in finished.read() {
        let root = names
            .get(run.root)
            .map(|name| name.as_str().to_string())
            .unwrap_or_else(|_| format!("{:?}", run.root));
        info!(
            "{root}: placed {} lights across {} objects",
            run.lights_placed, run.total_items
        );
    }
}
