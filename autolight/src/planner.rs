//! Light placement planning over a scene hierarchy.
//!
//! The planner only reads the hierarchy through [`HierarchyNode`] and hands
//! every placement to a [`LightSink`], so it has no knowledge of how lights
//! end up in a world.
//!
//! Counting covers the whole subtree below the root, while point lights are
//! only placed above the root's direct children.

use bevy::prelude::*;
use thiserror::Error;

use crate::progress::{Progress, ProgressReport};

/// Read-only view of one node in a parent/child scene tree.
pub trait HierarchyNode: Sized {
    /// World-space position of the node.
    fn position(&self) -> Vec3;

    fn child_count(&self) -> usize;

    /// The `index`-th direct child, in hierarchy order.
    fn child(&self, index: usize) -> Option<Self>;

    /// Display name, used to label generated lights.
    fn label(&self) -> Option<String> {
        None
    }
}

/// Settings for one auto-lighting run.
///
/// Values are taken as given: the planner does not clamp negative intensity
/// or radius. Hosts call [`LightingSettings::sanitized`] before planning.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct LightingSettings {
    pub intensity: f32,
    pub color: Color,
    pub max_lights: usize,
    pub point_light_radius: f32,
    /// Added to each child's height; may be negative.
    pub point_light_vertical_offset: f32,
    pub shadows_enabled: bool,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            intensity: 0.16,
            color: Color::WHITE,
            max_lights: 50,
            point_light_radius: 10.0,
            point_light_vertical_offset: 5.0,
            shadows_enabled: false,
        }
    }
}

impl LightingSettings {
    /// Copy with negative intensity and radius clamped to zero.
    pub fn sanitized(&self) -> Self {
        let mut settings = self.clone();
        if settings.intensity < 0.0 {
            warn!("light intensity {} is negative; using 0", settings.intensity);
            settings.intensity = 0.0;
        }
        if settings.point_light_radius < 0.0 {
            warn!(
                "point light radius {} is negative; using 0",
                settings.point_light_radius
            );
            settings.point_light_radius = 0.0;
        }
        settings
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowMode {
    None,
    Soft,
}

impl ShadowMode {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            ShadowMode::Soft
        } else {
            ShadowMode::None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLightPlacement {
    pub intensity: f32,
    pub color: Color,
    pub shadows: ShadowMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLightPlacement {
    pub intensity: f32,
    pub color: Color,
    pub range: f32,
    pub world_position: Vec3,
    /// Index of the root's child this light sits above.
    pub child_index: usize,
    pub label: Option<String>,
}

/// One light to create.
#[derive(Clone, Debug, PartialEq)]
pub enum PlacementInstruction {
    DirectionalLight(DirectionalLightPlacement),
    PointLight(PointLightPlacement),
}

/// Output of [`plan`]: the directional light followed by point lights in
/// child order.
#[derive(Clone, Debug, PartialEq)]
pub struct LightingPlan {
    pub directional: DirectionalLightPlacement,
    pub point_lights: Vec<PointLightPlacement>,
}

impl LightingPlan {
    pub fn instruction_count(&self) -> usize {
        1 + self.point_lights.len()
    }

    pub fn into_instructions(self) -> impl Iterator<Item = PlacementInstruction> {
        std::iter::once(PlacementInstruction::DirectionalLight(self.directional)).chain(
            self.point_lights
                .into_iter()
                .map(PlacementInstruction::PointLight),
        )
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    #[error("Building root not assigned. Please assign it before starting auto lighting.")]
    MissingRoot,
}

/// Receives placements as a run emits them.
pub trait LightSink {
    fn place(&mut self, instruction: PlacementInstruction, progress: ProgressReport);
}

impl<F> LightSink for F
where
    F: FnMut(PlacementInstruction, ProgressReport),
{
    fn place(&mut self, instruction: PlacementInstruction, progress: ProgressReport) {
        self(instruction, progress)
    }
}

/// Totals of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub total_nodes: usize,
    pub processed: usize,
    pub point_lights: usize,
}

/// Number of nodes in the subtree rooted at `root`, including `root`.
pub fn count_nodes<N: HierarchyNode>(root: &N) -> usize {
    let mut count = 1;
    let mut pending: Vec<N> = children_of(root).collect();

    while let Some(node) = pending.pop() {
        count += 1;
        pending.extend(children_of(&node));
    }

    count
}

fn children_of<N: HierarchyNode>(node: &N) -> impl Iterator<Item = N> + '_ {
    (0..node.child_count()).filter_map(move |index| node.child(index))
}

/// Builds the placements for `root`: one directional light, then a point
/// light above each of the first `max_lights` direct children.
pub fn plan<N: HierarchyNode>(root: &N, settings: &LightingSettings) -> LightingPlan {
    let directional = DirectionalLightPlacement {
        intensity: settings.intensity,
        color: settings.color,
        shadows: ShadowMode::from_enabled(settings.shadows_enabled),
    };

    let lights_to_add = root.child_count().min(settings.max_lights);
    let offset = Vec3::new(0.0, settings.point_light_vertical_offset, 0.0);

    let point_lights = (0..lights_to_add)
        .filter_map(|index| {
            let child = root.child(index)?;
            Some(PointLightPlacement {
                intensity: settings.intensity,
                color: settings.color,
                range: settings.point_light_radius,
                world_position: child.position() + offset,
                child_index: index,
                label: child.label(),
            })
        })
        .collect();

    LightingPlan {
        directional,
        point_lights,
    }
}

/// Runs a full pass over `root`, feeding each placement to `sink` together
/// with the progress after it.
///
/// Fails before counting or emitting anything when `root` is absent.
pub fn execute<N, S>(
    root: Option<N>,
    settings: &LightingSettings,
    sink: &mut S,
) -> Result<RunSummary, PlanError>
where
    N: HierarchyNode,
    S: LightSink,
{
    let root = root.ok_or(PlanError::MissingRoot)?;

    let total_nodes = count_nodes(&root);
    let mut progress = Progress::new(total_nodes);

    let lighting_plan = plan(&root, settings);
    let point_lights = lighting_plan.point_lights.len();

    for instruction in lighting_plan.into_instructions() {
        let report = progress.advance();
        sink.place(instruction, report);
    }

    Ok(RunSummary {
        total_nodes,
        processed: progress.processed(),
        point_lights,
    })
}
