pub mod auto_lighting;
pub mod scene;
