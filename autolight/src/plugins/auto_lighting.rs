use std::f32::consts::FRAC_PI_4;

use bevy::ecs::query::Has;
use bevy::prelude::*;
use bevy::transform::TransformSystem;

use crate::planner::{
    self, HierarchyNode, LightSink, LightingSettings, PlacementInstruction, PlanError, ShadowMode,
};
use crate::progress::ProgressReport;

/// Generates lights under a scene hierarchy on [`AutoLightingRequest`].
pub struct AutoLightingPlugin;

impl Plugin for AutoLightingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LightingSettings>()
            .init_resource::<IntensityScale>()
            .add_event::<AutoLightingRequest>()
            .add_event::<AutoLightingProgress>()
            .add_event::<AutoLightingFinished>()
            .add_event::<AutoLightingFailed>()
            // World positions are read after this frame's transform propagation.
            .add_systems(
                PostUpdate,
                run_auto_lighting.after(TransformSystem::TransformPropagate),
            );
    }
}

/// Asks for a run over `root` with the current [`LightingSettings`].
#[derive(Event, Clone, Copy, Debug)]
pub struct AutoLightingRequest {
    pub root: Option<Entity>,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct AutoLightingProgress {
    pub root: Entity,
    pub report: ProgressReport,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoLightingFinished {
    pub root: Entity,
    pub container: Entity,
    /// Nodes in the root's subtree, the root included.
    pub total_items: usize,
    pub lights_placed: usize,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoLightingFailed {
    pub root: Option<Entity>,
    pub error: PlanError,
}

/// Parent of every light created by one run.
#[derive(Component, Debug)]
pub struct LightsContainer;

#[derive(Component, Debug)]
pub struct GeneratedLight;

/// Marks a root that carries light probes.
#[derive(Component, Debug, Default)]
pub struct LightProbeGroup;

/// Converts the planner's unit-less intensity into Bevy light units.
#[derive(Resource, Clone, Copy, Debug)]
pub struct IntensityScale {
    /// Lux per unit of intensity.
    pub directional_lux: f32,
    /// Lumens per unit of intensity.
    pub point_lumens: f32,
}

impl Default for IntensityScale {
    fn default() -> Self {
        // The default intensity of 0.16 maps to 10k lux and 100k lumens.
        Self {
            directional_lux: 62_500.0,
            point_lumens: 625_000.0,
        }
    }
}

/// World rotation of the generated directional light.
pub fn sun_rotation() -> Quat {
    Quat::from_euler(EulerRot::XYZ, -FRAC_PI_4, FRAC_PI_4, 0.0)
}

type HierarchyQuery<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static GlobalTransform>,
        Option<&'static Children>,
        Option<&'static Name>,
        Has<LightsContainer>,
    ),
>;

/// An entity seen through the hierarchy query. Containers from earlier runs
/// are hidden so a run never counts or lights its own output.
struct SceneNode<'q, 'w, 's> {
    entity: Entity,
    hierarchy: &'q HierarchyQuery<'w, 's>,
    children: Vec<Entity>,
}

impl<'q, 'w, 's> SceneNode<'q, 'w, 's> {
    fn new(entity: Entity, hierarchy: &'q HierarchyQuery<'w, 's>) -> Self {
        let children = match hierarchy.get(entity) {
            Ok((_, Some(children), _, _)) => children
                .iter()
                .copied()
                .filter(|&child| !matches!(hierarchy.get(child), Ok((_, _, _, true))))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            entity,
            hierarchy,
            children,
        }
    }
}

impl<'q, 'w, 's> HierarchyNode for SceneNode<'q, 'w, 's> {
    fn position(&self) -> Vec3 {
        self.hierarchy
            .get(self.entity)
            .ok()
            .and_then(|(transform, ..)| transform)
            .map(GlobalTransform::translation)
            .unwrap_or(Vec3::ZERO)
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        let entity = self.children.get(index).copied()?;
        Some(SceneNode::new(entity, self.hierarchy))
    }

    fn label(&self) -> Option<String> {
        let (_, _, name, _) = self.hierarchy.get(self.entity).ok()?;
        name.map(|name| name.as_str().to_string())
    }
}

/// Spawns each placement as a light entity under the run's container.
struct WorldLightSink<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    scale: IntensityScale,
    root: Entity,
    /// World transform of the root. The container sits at the root's origin,
    /// so lights are placed relative to this.
    root_transform: GlobalTransform,
    container: Option<Entity>,
    reports: Vec<ProgressReport>,
}

impl<'a, 'w, 's> WorldLightSink<'a, 'w, 's> {
    /// The run's container, spawned under the root on first use.
    fn container(&mut self) -> Entity {
        *self.container.get_or_insert_with(|| {
            self.commands
                .spawn((
                    SpatialBundle::default(),
                    Name::new("LightsContainer"),
                    LightsContainer,
                ))
                .set_parent(self.root)
                .id()
        })
    }

    fn spawn_light(&mut self, light: impl Bundle) {
        let container = self.container();
        self.commands.spawn(light).set_parent(container);
    }
}

impl<'a, 'w, 's> LightSink for WorldLightSink<'a, 'w, 's> {
    fn place(&mut self, instruction: PlacementInstruction, progress: ProgressReport) {
        match instruction {
            PlacementInstruction::DirectionalLight(light) => {
                let transform = GlobalTransform::from_rotation(sun_rotation())
                    .reparented_to(&self.root_transform);

                self.spawn_light((
                    DirectionalLightBundle {
                        directional_light: DirectionalLight {
                            illuminance: light.intensity * self.scale.directional_lux,
                            color: light.color,
                            shadows_enabled: light.shadows == ShadowMode::Soft,
                            ..default()
                        },
                        transform,
                        ..default()
                    },
                    Name::new("Directional Light"),
                    GeneratedLight,
                ));
            }
            PlacementInstruction::PointLight(light) => {
                let transform = GlobalTransform::from_translation(light.world_position)
                    .reparented_to(&self.root_transform);
                let name = match &light.label {
                    Some(label) => format!("Point Light {label}"),
                    None => format!("Point Light {}", light.child_index),
                };

                self.spawn_light((
                    PointLightBundle {
                        point_light: PointLight {
                            intensity: light.intensity * self.scale.point_lumens,
                            color: light.color,
                            range: light.range,
                            ..default()
                        },
                        transform,
                        ..default()
                    },
                    Name::new(name),
                    GeneratedLight,
                ));
            }
        }

        debug!(
            "Auto lighting: {}/{} ({:.0}%)",
            progress.processed,
            progress.total,
            progress.fraction * 100.0
        );
        self.reports.push(progress);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_auto_lighting(
    mut commands: Commands,
    mut requests: EventReader<AutoLightingRequest>,
    settings: Res<LightingSettings>,
    scale: Res<IntensityScale>,
    hierarchy: HierarchyQuery,
    probes: Query<(), With<LightProbeGroup>>,
    mut progress: EventWriter<AutoLightingProgress>,
    mut finished: EventWriter<AutoLightingFinished>,
    mut failed: EventWriter<AutoLightingFailed>,
) {
    for request in requests.read() {
        let settings = settings.sanitized();
        let node = request
            .root
            .filter(|&entity| hierarchy.contains(entity))
            .map(|entity| SceneNode::new(entity, &hierarchy));

        // A missing root never reaches the sink, so the placeholder is unused.
        let root = node.as_ref().map_or(Entity::PLACEHOLDER, |node| node.entity);
        let root_transform = hierarchy
            .get(root)
            .ok()
            .and_then(|(transform, ..)| transform.copied())
            .unwrap_or_default();

        let mut sink = WorldLightSink {
            commands: &mut commands,
            scale: *scale,
            root,
            root_transform,
            container: None,
            reports: Vec::new(),
        };

        let summary = match planner::execute(node, &settings, &mut sink) {
            Ok(summary) => summary,
            Err(error) => {
                error!("{error}");
                failed.send(AutoLightingFailed {
                    root: request.root,
                    error,
                });
                continue;
            }
        };

        let container = sink.container();
        for report in sink.reports {
            progress.send(AutoLightingProgress { root, report });
        }

        if !probes.contains(root) {
            commands.entity(root).insert(LightProbeGroup);
            debug!("Added light probe group to {root:?}");
        }

        info!(
            "Auto Lighting process completed for {} objects.",
            summary.total_nodes
        );
        finished.send(AutoLightingFinished {
            root,
            container,
            total_items: summary.total_nodes,
            lights_placed: summary.processed,
        });
    }
}
