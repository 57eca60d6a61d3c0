//! Automatic light placement for Bevy scene hierarchies.
//!
//! [`planner`] decides where lights go; [`AutoLightingPlugin`] turns those
//! decisions into light entities under a chosen root.

pub mod config;
pub mod planner;
pub mod plugins;
pub mod progress;

pub use planner::LightingSettings;
pub use plugins::auto_lighting::{
    AutoLightingFailed, AutoLightingFinished, AutoLightingPlugin, AutoLightingProgress,
    AutoLightingRequest,
};
